//! Error types for Sealog

use thiserror::Error;

/// Result type alias for Sealog operations
pub type Result<T> = std::result::Result<T, SealogError>;

/// Main error type for Sealog
#[derive(Error, Debug)]
pub enum SealogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("id must be a valid UUID, got '{0}'")]
    InvalidIdentifier(String),

    #[error("Unable to parse timestamp '{0}'")]
    InvalidTimestamp(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
