use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::user::models::AccessToken;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::LoginCredentials;
use crate::domain::user::models::RegistrationForm;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserProfile;
use crate::domain::user::models::Username;
use crate::user::errors::UserError;

/// Port for registration and login.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register a new user.
    ///
    /// # Arguments
    /// * `form` - Raw registration input
    ///
    /// # Returns
    /// Profile of the created user
    ///
    /// # Errors
    /// * `Validation` - One or more fields break the input rules (all are reported)
    /// * `AlreadyExists` - Username or email is already taken
    /// * `DatabaseError` - Database operation failed
    async fn register(&self, form: RegistrationForm) -> Result<UserProfile, UserError>;

    /// Check credentials and issue an access token.
    ///
    /// # Arguments
    /// * `credentials` - Username or email, and plaintext password
    ///
    /// # Returns
    /// Bearer token together with the user's profile
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown account or wrong password (indistinguishable)
    /// * `DatabaseError` - Database operation failed
    async fn authenticate(&self, credentials: LoginCredentials) -> Result<AccessToken, UserError>;
}

/// Port resolving a presented bearer token to an identity.
#[async_trait]
pub trait AuthGatePort: Send + Sync + 'static {
    /// Resolve a raw bearer token to the user it names.
    ///
    /// # Arguments
    /// * `token` - Token string, `None` when the request carried no credentials
    ///
    /// # Errors
    /// * `Unauthorized` - Missing, invalid or expired token, or unknown subject
    async fn identify(&self, token: Option<&str>) -> Result<UserProfile, UserError>;

    /// Let an identified user through only while the account is active.
    ///
    /// # Errors
    /// * `InactiveUser` - Account has been deactivated
    fn authorize_active(&self, profile: UserProfile) -> Result<UserProfile, UserError>;

    /// Both gates in sequence.
    ///
    /// # Errors
    /// * `Unauthorized` - See [`AuthGatePort::identify`]
    /// * `InactiveUser` - See [`AuthGatePort::authorize_active`]
    async fn current_active_user(&self, token: Option<&str>) -> Result<UserProfile, UserError> {
        let profile = self.identify(token).await?;
        self.authorize_active(profile)
    }
}

/// Persistence operations for the user record.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage.
    ///
    /// # Errors
    /// * `ConstraintViolation` - Email or username already taken
    /// * `DatabaseError` - Database operation failed
    async fn insert(&self, user: User) -> Result<User, UserError>;

    /// Retrieve user by identifier.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Retrieve user whose username or email equals `identifier` exactly.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_login(&self, identifier: &str) -> Result<Option<User>, UserError>;

    /// Check whether the email or the username is already in use.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn exists_by_email_or_username(
        &self,
        email: &EmailAddress,
        username: &Username,
    ) -> Result<bool, UserError>;

    /// Record a successful login.
    ///
    /// # Returns
    /// User entity with `last_login` and `updated_at` set to `at`
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn update_last_login(&self, id: &UserId, at: DateTime<Utc>) -> Result<User, UserError>;

    /// Activate or deactivate an account.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn set_active(&self, id: &UserId, active: bool) -> Result<User, UserError>;
}
