use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::clock::Clock;
use super::clock::SystemClock;
use super::errors::TokenError;

/// Signs and verifies time-bounded bearer tokens.
///
/// Tokens are HS256 JWTs carrying `{sub, exp}`. The algorithm is fixed: a
/// token whose header names any other algorithm is rejected.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    /// Lifetime of tokens issued without an explicit TTL.
    pub const DEFAULT_TTL_MINUTES: i64 = 30;

    /// Create a new codec with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    ///
    /// # Returns
    /// TokenCodec using HS256, the default TTL and the system clock
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            ttl: Duration::minutes(Self::DEFAULT_TTL_MINUTES),
            clock: Arc::new(SystemClock),
        }
    }

    /// Override the TTL applied by [`TokenCodec::issue`].
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Override the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `subject` valid for the configured TTL.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token signing failed
    pub fn issue(&self, subject: &str) -> Result<String, TokenError> {
        self.issue_with_ttl(subject, self.ttl)
    }

    /// Issue a token for `subject` valid for `ttl` from now.
    ///
    /// # Errors
    /// * `EncodingFailed` - Expiry is not representable, or token signing failed
    pub fn issue_with_ttl(&self, subject: &str, ttl: Duration) -> Result<String, TokenError> {
        let expires_at = self
            .clock
            .now()
            .checked_add_signed(ttl)
            .ok_or_else(|| TokenError::EncodingFailed(format!("TTL out of range: {}", ttl)))?;
        let claims = Claims::new(subject, expires_at);
        let header = Header::new(self.algorithm);

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))
    }

    /// Verify a token and return its subject.
    ///
    /// # Returns
    /// The `sub` claim of a correctly signed, unexpired HS256 token
    ///
    /// # Errors
    /// * `Invalid` - For every kind of failure; callers cannot tell them apart
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        if token.trim().is_empty() {
            return Err(TokenError::Invalid);
        }

        let mut validation = Validation::new(self.algorithm);
        // Expiry is checked below against the injected clock.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "Token rejected");
                TokenError::Invalid
            })?
            .claims;

        if claims.is_expired(self.clock.now().timestamp()) {
            tracing::debug!(exp = claims.exp, "Token rejected: expired");
            return Err(TokenError::Invalid);
        }

        if claims.sub.trim().is_empty() {
            tracing::debug!("Token rejected: empty subject");
            return Err(TokenError::Invalid);
        }

        Ok(claims.sub)
    }
}
