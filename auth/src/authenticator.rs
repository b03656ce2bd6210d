use crate::jwt::TokenCodec;
use crate::jwt::TokenError;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and token issuance.
///
/// Built once at startup from configuration and shared read-only afterwards.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_codec: TokenCodec,
}

/// Authentication operation errors.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `password_hasher` - Configured password hasher
    /// * `token_codec` - Configured token codec
    pub fn new(password_hasher: PasswordHasher, token_codec: TokenCodec) -> Self {
        Self {
            password_hasher,
            token_codec,
        }
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Check a password against the stored hash of the account it claims.
    ///
    /// `stored_hash` is `None` when no account matched the login identifier;
    /// the check then burns a decoy verification so both failure paths cost
    /// the same and fail the same way.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown account or password mismatch
    pub fn check_credentials(
        &self,
        password: &str,
        stored_hash: Option<&str>,
    ) -> Result<(), AuthenticationError> {
        let is_valid = match stored_hash {
            Some(hash) => self.password_hasher.verify(password, hash),
            None => self.password_hasher.verify_decoy(password),
        };

        if is_valid {
            Ok(())
        } else {
            Err(AuthenticationError::InvalidCredentials)
        }
    }

    /// Issue an access token for `subject`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token generation failed
    pub fn issue_token(&self, subject: &str) -> Result<String, TokenError> {
        self.token_codec.issue(subject)
    }

    /// Validate an access token and return its subject.
    ///
    /// # Errors
    /// * `Invalid` - Token is malformed, forged, expired or uses another algorithm
    pub fn verify_token(&self, token: &str) -> Result<String, TokenError> {
        self.token_codec.verify(token)
    }
}
