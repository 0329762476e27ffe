//! Error types shared across the batch workspace

use thiserror::Error;

/// Result type alias for common operations
pub type Result<T> = std::result::Result<T, BatchError>;

/// Main error type for shared batch code
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid job state: {0}")]
    InvalidState(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
