use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use chrono::Utc;

use crate::domain::user::models::AccessToken;
use crate::domain::user::models::LoginCredentials;
use crate::domain::user::models::Password;
use crate::domain::user::models::RegistrationForm;
use crate::domain::user::models::User;
use crate::domain::user::models::UserProfile;
use crate::user::errors::UserError;
use crate::user::ports::AuthServicePort;
use crate::user::ports::UserRepository;

/// Domain service implementation for registration and login.
///
/// Holds no state of its own: uniqueness is enforced by the repository and the
/// authenticator is read-only.
pub struct AuthService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
}

impl<UR> AuthService<UR>
where
    UR: UserRepository,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `authenticator` - Password hasher and token codec built from configuration
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }

    async fn hash_password(&self, password: Password) -> Result<String, UserError> {
        let authenticator = Arc::clone(&self.authenticator);

        tokio::task::spawn_blocking(move || authenticator.hash_password(password.as_str()))
            .await
            .map_err(|e| UserError::Unknown(format!("Password hashing task failed: {}", e)))?
            .map_err(UserError::from)
    }

    async fn credentials_match(&self, password: String, stored_hash: Option<String>) -> Result<bool, UserError> {
        let authenticator = Arc::clone(&self.authenticator);

        tokio::task::spawn_blocking(move || {
            authenticator
                .check_credentials(&password, stored_hash.as_deref())
                .is_ok()
        })
        .await
        .map_err(|e| UserError::Unknown(format!("Password verification task failed: {}", e)))
    }
}

#[async_trait]
impl<UR> AuthServicePort for AuthService<UR>
where
    UR: UserRepository,
{
    async fn register(&self, form: RegistrationForm) -> Result<UserProfile, UserError> {
        let command = form.validate().map_err(|errors| {
            tracing::warn!(
                violations = errors.violations().len(),
                "Registration rejected: invalid input"
            );
            UserError::Validation(errors)
        })?;

        // Fast path only; the store's unique constraints decide races.
        if self
            .repository
            .exists_by_email_or_username(&command.email, &command.username)
            .await?
        {
            tracing::warn!(
                username = %command.username,
                "Registration rejected: username or email already exists"
            );
            return Err(UserError::AlreadyExists);
        }

        let password_hash = self.hash_password(command.password.clone()).await?;
        let user = User::register(command, password_hash, Utc::now());

        let created_user = self.repository.insert(user).await.map_err(|e| match e {
            UserError::ConstraintViolation(constraint) => {
                tracing::warn!(
                    constraint = %constraint,
                    "Registration rejected: concurrent registration won the unique constraint"
                );
                UserError::AlreadyExists
            }
            other => other,
        })?;

        tracing::info!(
            user_id = %created_user.id,
            username = %created_user.username,
            "User registered"
        );

        Ok(UserProfile::from(&created_user))
    }

    async fn authenticate(&self, credentials: LoginCredentials) -> Result<AccessToken, UserError> {
        let LoginCredentials { username, password } = credentials;

        let user = self.repository.find_by_login(&username).await?;
        let stored_hash = user.as_ref().map(|u| u.password_hash.clone());

        let user = match (user, self.credentials_match(password, stored_hash).await?) {
            (Some(user), true) => user,
            _ => {
                tracing::warn!(login = %username, "Login rejected: invalid credentials");
                return Err(UserError::InvalidCredentials);
            }
        };

        let user = self
            .repository
            .update_last_login(&user.id, Utc::now())
            .await?;

        let access_token = self.authenticator.issue_token(&user.id.to_string())?;

        tracing::info!(user_id = %user.id, username = %user.username, "User logged in");

        Ok(AccessToken::bearer(access_token, UserProfile::from(&user)))
    }
}
