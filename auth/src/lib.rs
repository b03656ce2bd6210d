//! Authentication utilities library
//!
//! Provides the credential primitives used by the identity service:
//! - Password hashing (Argon2id, configurable cost)
//! - Bearer token issuance and verification (HS256 JWT, `{sub, exp}`)
//! - Authentication coordination
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("Secure123").unwrap();
//! assert!(hasher.verify("Secure123", &hash));
//! assert!(!hasher.verify("Secure123", "not-a-hash"));
//! ```
//!
//! ## Tokens
//! ```
//! use auth::TokenCodec;
//!
//! let codec = TokenCodec::new(b"secret_key_at_least_32_bytes_long!");
//! let token = codec.issue("user123").unwrap();
//! assert_eq!(codec.verify(&token).unwrap(), "user123");
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::{Authenticator, PasswordHasher, TokenCodec};
//!
//! let auth = Authenticator::new(
//!     PasswordHasher::new(),
//!     TokenCodec::new(b"secret_key_at_least_32_bytes_long!"),
//! );
//!
//! // Register: hash password
//! let hash = auth.hash_password("Secure123").unwrap();
//!
//! // Login: verify and generate token
//! auth.check_credentials("Secure123", Some(&hash)).unwrap();
//! let token = auth.issue_token("user123").unwrap();
//!
//! // Validate token
//! assert_eq!(auth.verify_token(&token).unwrap(), "user123");
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use jwt::Claims;
pub use jwt::Clock;
pub use jwt::ManualClock;
pub use jwt::SystemClock;
pub use jwt::TokenCodec;
pub use jwt::TokenError;
pub use password::HashingParams;
pub use password::PasswordError;
pub use password::PasswordHasher;
