//! Error types for assertion building and request signing.

/// Errors raised while building a signed JWT assertion.
#[derive(Debug, thiserror::Error)]
pub enum AssertionError {
    /// The private key is not a PEM-encoded RSA key.
    #[error("invalid RSA private key: {0}")]
    InvalidKey(#[source] jsonwebtoken::errors::Error),

    /// The key was accepted but signing failed.
    #[error("failed to sign assertion: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    /// The issue time cannot be represented as unix seconds.
    #[error("issue time {0} is before the unix epoch")]
    InvalidIssueTime(i64),
}

/// A timestamp that is not in `YYYYMMDDThhmmssZ` form.
#[derive(Debug, thiserror::Error)]
#[error("invalid X-Amz-Date timestamp: {0:?}")]
pub struct AmzDateError(pub String);
