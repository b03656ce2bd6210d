use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Bearer token payload.
///
/// The claim names are part of the wire contract: any service holding the
/// same secret decodes `sub` and `exp` from tokens issued here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user identifier)
    pub sub: String,

    /// Expiration time (Unix timestamp, seconds)
    pub exp: i64,
}

impl Claims {
    /// Create claims for a subject expiring at the given instant.
    pub fn new(subject: impl ToString, expires_at: DateTime<Utc>) -> Self {
        Self {
            sub: subject.to_string(),
            exp: expires_at.timestamp(),
        }
    }

    /// Check if token is expired.
    ///
    /// A token is valid strictly before its expiry second.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        current_timestamp >= self.exp
    }
}
