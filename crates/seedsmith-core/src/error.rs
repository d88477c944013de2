use thiserror::Error;

/// Core error type shared across seedsmith crates.
#[derive(Debug, Error)]
pub enum Error {
    /// Host metadata could not be loaded or decoded.
    #[error("metadata error: {0}")]
    Metadata(String),
    /// The descriptor set violates internal invariants.
    #[error("invalid model: {0}")]
    InvalidModel(String),
    /// A requested feature is not yet supported.
    #[error("unsupported: {0}")]
    Unsupported(String),
    /// Catch-all error for unexpected failures.
    #[error("other error: {0}")]
    Other(String),
}

/// Convenience alias for results returned by seedsmith crates.
pub type Result<T> = std::result::Result<T, Error>;
