use thiserror::Error;

/// Error type for token operations.
///
/// Verification deliberately collapses every failure (malformed input, bad
/// signature, wrong algorithm, expiry) into `Invalid`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Could not validate token")]
    Invalid,
}
