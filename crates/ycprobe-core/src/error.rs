//! Error types for the ycprobe core.

/// Core error type for credential records and configuration.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A credential field is empty after trimming.
    #[error("credential field `{0}` must not be empty")]
    EmptyField(&'static str),

    /// The credential record could not be parsed.
    #[error("invalid credential record: {0}")]
    InvalidRecord(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
