use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::user::errors::EmailError;
use crate::user::errors::NameError;
use crate::user::errors::PasswordRuleError;
use crate::user::errors::UserIdError;
use crate::user::errors::UsernameError;
use crate::user::errors::ValidationErrors;

/// User storage record.
///
/// Holds the password hash and therefore never leaves the service as-is:
/// responses are built from [`UserProfile`]. Deliberately not `Serialize`.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub email: EmailAddress,
    pub username: Username,
    pub password_hash: String,
    pub is_active: bool,
    pub is_verified: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a fresh record for a validated registration.
    ///
    /// New accounts start active and unverified.
    pub fn register(command: RegisterUserCommand, password_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            id: UserId::new(),
            first_name: command.first_name,
            last_name: command.last_name,
            email: command.email,
            username: command.username,
            password_hash,
            is_active: true,
            is_verified: false,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Public-safe projection of a [`User`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.0,
            username: user.username.as_str().to_string(),
            email: user.email.as_str().to_string(),
            first_name: user.first_name.as_str().to_string(),
            last_name: user.last_name.as_str().to_string(),
            is_active: user.is_active,
            is_verified: user.is_verified,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Successful login result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
    pub user: UserProfile,
}

impl AccessToken {
    pub const TOKEN_TYPE: &'static str = "bearer";

    pub fn bearer(access_token: String, user: UserProfile) -> Self {
        Self {
            access_token,
            token_type: Self::TOKEN_TYPE.to_string(),
            user,
        }
    }
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Username value type
///
/// Ensures username is 3-50 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Username(String);

impl Username {
    const MIN_LENGTH: usize = 3;
    const MAX_LENGTH: usize = 50;

    /// Create a new valid username.
    ///
    /// # Errors
    /// * `TooShort` - Username shorter than 3 characters
    /// * `TooLong` - Username longer than 50 characters
    pub fn new(username: String) -> Result<Self, UsernameError> {
        let length = username.chars().count();
        if length < Self::MIN_LENGTH {
            Err(UsernameError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            })
        } else if length > Self::MAX_LENGTH {
            Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(username))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser. Stored exactly as
/// given; lookups are case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    const MAX_LENGTH: usize = 120;

    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    /// * `TooLong` - Email longer than 120 characters
    pub fn new(email: String) -> Result<Self, EmailError> {
        let length = email.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }

        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// First or last name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName(String);

impl PersonName {
    const MAX_LENGTH: usize = 50;

    /// # Errors
    /// * `Empty` - Name is empty or whitespace only
    /// * `TooLong` - Name longer than 50 characters
    pub fn new(name: String) -> Result<Self, NameError> {
        if name.trim().is_empty() {
            return Err(NameError::Empty);
        }

        let length = name.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(NameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Plaintext password that satisfies the password policy.
///
/// Only lives long enough to be hashed; `Debug` never prints it.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    const MIN_LENGTH: usize = 6;
    const MAX_LENGTH: usize = 128;

    /// Check the candidate against every policy rule.
    ///
    /// # Errors
    /// All broken rules, in a stable order
    pub fn new(password: String) -> Result<Self, Vec<PasswordRuleError>> {
        let mut broken = Vec::new();
        let length = password.chars().count();

        if length < Self::MIN_LENGTH {
            broken.push(PasswordRuleError::TooShort {
                min: Self::MIN_LENGTH,
            });
        }
        if length > Self::MAX_LENGTH {
            broken.push(PasswordRuleError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if !password.chars().any(char::is_uppercase) {
            broken.push(PasswordRuleError::MissingUppercase);
        }
        if !password.chars().any(char::is_lowercase) {
            broken.push(PasswordRuleError::MissingLowercase);
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            broken.push(PasswordRuleError::MissingDigit);
        }

        if broken.is_empty() {
            Ok(Self(password))
        } else {
            Err(broken)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(\"***\")")
    }
}

/// Raw registration input, as received from a client.
///
/// Absent fields deserialize as empty strings and are reported by
/// [`RegistrationForm::validate`] alongside every other violation.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegistrationForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for RegistrationForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationForm")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl RegistrationForm {
    /// Validate every field, collecting all violations.
    ///
    /// # Errors
    /// Every broken rule across all fields
    pub fn validate(self) -> Result<RegisterUserCommand, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let first_name = PersonName::new(self.first_name)
            .map_err(|e| errors.push("first_name", e))
            .ok();
        let last_name = PersonName::new(self.last_name)
            .map_err(|e| errors.push("last_name", e))
            .ok();
        let email = EmailAddress::new(self.email)
            .map_err(|e| errors.push("email", e))
            .ok();
        let username = Username::new(self.username)
            .map_err(|e| errors.push("username", e))
            .ok();
        let password = Password::new(self.password)
            .map_err(|broken| {
                for rule in broken {
                    errors.push("password", rule);
                }
            })
            .ok();

        match (first_name, last_name, email, username, password) {
            (Some(first_name), Some(last_name), Some(email), Some(username), Some(password)) => {
                Ok(RegisterUserCommand {
                    first_name,
                    last_name,
                    email,
                    username,
                    password,
                })
            }
            _ => Err(errors),
        }
    }
}

/// Command to create a new user with domain types
#[derive(Debug, Clone)]
pub struct RegisterUserCommand {
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub email: EmailAddress,
    pub username: Username,
    pub password: Password,
}

/// Login input: a username or an email, plus the plaintext password.
#[derive(Clone, Deserialize)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

impl LoginCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}
