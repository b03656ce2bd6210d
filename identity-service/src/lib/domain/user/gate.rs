use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;

use crate::domain::user::models::UserId;
use crate::domain::user::models::UserProfile;
use crate::user::errors::UserError;
use crate::user::ports::AuthGatePort;
use crate::user::ports::UserRepository;

/// Resolves bearer tokens to users for protected operations.
pub struct AuthGate<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
}

impl<UR> AuthGate<UR>
where
    UR: UserRepository,
{
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }
}

#[async_trait]
impl<UR> AuthGatePort for AuthGate<UR>
where
    UR: UserRepository,
{
    async fn identify(&self, token: Option<&str>) -> Result<UserProfile, UserError> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                tracing::debug!("No bearer token presented");
                UserError::Unauthorized
            })?;

        let subject = self.authenticator.verify_token(token).map_err(|_| {
            tracing::warn!("Bearer token rejected");
            UserError::Unauthorized
        })?;

        let user_id = UserId::from_string(&subject).map_err(|e| {
            tracing::warn!(error = %e, "Token subject is not a user ID");
            UserError::Unauthorized
        })?;

        match self.repository.find_by_id(&user_id).await? {
            Some(user) => Ok(UserProfile::from(&user)),
            None => {
                tracing::warn!(user_id = %user_id, "Token subject no longer exists");
                Err(UserError::Unauthorized)
            }
        }
    }

    fn authorize_active(&self, profile: UserProfile) -> Result<UserProfile, UserError> {
        if !profile.is_active {
            tracing::warn!(user_id = %profile.id, "Request rejected: inactive user");
            return Err(UserError::InactiveUser);
        }
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use auth::HashingParams;
    use auth::ManualClock;
    use auth::PasswordHasher;
    use auth::TokenCodec;
    use chrono::Duration;
    use chrono::Utc;

    use super::*;
    use crate::domain::user::models::EmailAddress;
    use crate::domain::user::models::PersonName;
    use crate::domain::user::models::User;
    use crate::domain::user::models::Username;
    use crate::domain::user::ports::MockUserRepository;

    const SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

    fn authenticator(clock: Arc<ManualClock>) -> Arc<Authenticator> {
        let hasher = PasswordHasher::with_params(HashingParams {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .expect("Failed to build hasher");
        let codec = TokenCodec::new(SECRET).with_clock(clock);
        Arc::new(Authenticator::new(hasher, codec))
    }

    fn user(is_active: bool) -> User {
        let now = Utc::now();
        User {
            id: UserId::new(),
            first_name: PersonName::new("John".to_string()).unwrap(),
            last_name: PersonName::new("Doe".to_string()).unwrap(),
            email: EmailAddress::new("john@example.com".to_string()).unwrap(),
            username: Username::new("johndoe".to_string()).unwrap(),
            password_hash: "$argon2id$v=19$m=1024,t=1,p=1$c2FsdA$aGFzaA".to_string(),
            is_active,
            is_verified: false,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn gate_with(repository: MockUserRepository) -> (AuthGate<MockUserRepository>, Arc<Authenticator>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let authenticator = authenticator(Arc::clone(&clock));
        let gate = AuthGate::new(Arc::new(repository), Arc::clone(&authenticator));
        (gate, authenticator, clock)
    }

    fn assert_unauthorized(result: Result<UserProfile, UserError>) {
        let err = result.unwrap_err();
        assert!(matches!(err, UserError::Unauthorized), "got {:?}", err);
        assert_eq!(err.to_string(), "Could not validate credentials");
    }

    #[tokio::test]
    async fn test_identify_valid_token() {
        let user = user(true);
        let user_id = user.id;
        let mut repository = MockUserRepository::new();
        repository
            .expect_find_by_id()
            .withf(move |id| *id == user_id)
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let (gate, authenticator, _) = gate_with(repository);
        let token = authenticator.issue_token(&user_id.to_string()).unwrap();

        let profile = gate.identify(Some(&token)).await.unwrap();
        assert_eq!(profile.id, user_id.0);
        assert_eq!(profile.username, "johndoe");
    }

    #[tokio::test]
    async fn test_identify_without_token() {
        let (gate, _, _) = gate_with(MockUserRepository::new());

        assert_unauthorized(gate.identify(None).await);
        assert_unauthorized(gate.identify(Some("")).await);
        assert_unauthorized(gate.identify(Some("   ")).await);
    }

    #[tokio::test]
    async fn test_identify_garbage_token() {
        let (gate, _, _) = gate_with(MockUserRepository::new());

        assert_unauthorized(gate.identify(Some("not.a.jwt")).await);
    }

    #[tokio::test]
    async fn test_identify_expired_token() {
        let mut repository = MockUserRepository::new();
        repository.expect_find_by_id().times(0);

        let (gate, authenticator, clock) = gate_with(repository);
        let token = authenticator.issue_token(&UserId::new().to_string()).unwrap();

        clock.advance(Duration::minutes(31));

        assert_unauthorized(gate.identify(Some(&token)).await);
    }

    #[tokio::test]
    async fn test_identify_non_uuid_subject() {
        let mut repository = MockUserRepository::new();
        repository.expect_find_by_id().times(0);

        let (gate, authenticator, _) = gate_with(repository);
        let token = authenticator.issue_token("johndoe").unwrap();

        assert_unauthorized(gate.identify(Some(&token)).await);
    }

    #[tokio::test]
    async fn test_identify_deleted_user() {
        let mut repository = MockUserRepository::new();
        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let (gate, authenticator, _) = gate_with(repository);
        let token = authenticator.issue_token(&UserId::new().to_string()).unwrap();

        assert_unauthorized(gate.identify(Some(&token)).await);
    }

    #[tokio::test]
    async fn test_current_active_user_rejects_inactive_account() {
        let user = user(false);
        let user_id = user.id;
        let mut repository = MockUserRepository::new();
        repository
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let (gate, authenticator, _) = gate_with(repository);
        let token = authenticator.issue_token(&user_id.to_string()).unwrap();

        let err = gate.current_active_user(Some(&token)).await.unwrap_err();
        assert!(matches!(err, UserError::InactiveUser));
        assert_eq!(err.to_string(), "Inactive user");
    }

    #[tokio::test]
    async fn test_current_active_user_passes_active_account() {
        let user = user(true);
        let user_id = user.id;
        let mut repository = MockUserRepository::new();
        repository
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let (gate, authenticator, _) = gate_with(repository);
        let token = authenticator.issue_token(&user_id.to_string()).unwrap();

        let profile = gate.current_active_user(Some(&token)).await.unwrap();
        assert!(profile.is_active);
    }
}
