//! Error types for the batch CLI
//!
//! Messages are user-facing and say what to check next.

use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    /// The server answered with a non-success status. The body has already
    /// been printed.
    #[error("Server returned {status}")]
    Api { status: u16 },

    /// Required file is missing
    #[error("File not found: '{0}'. Verify the file path exists and you have read permissions.")]
    FileNotFound(String),

    /// File system operation failed
    #[error("File operation failed: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("Request failed: {0}. Ensure the batch server is running and check --api / BATCH_API_URL.")]
    Http(#[from] reqwest::Error),

    /// Schema file is not valid JSON
    #[error("Failed to parse JSON: {0}. Check the schema file syntax.")]
    JsonParse(#[from] serde_json::Error),
}

impl CliError {
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound(path.into())
    }
}
