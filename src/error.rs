//! Error types for DevDigest.

use thiserror::Error;

/// Common error type for DevDigest.
#[derive(Error, Debug)]
pub enum DigestError {
    /// Database error.
    ///
    /// Errors from sqlx are converted into this variant.
    #[error("database error: {0}")]
    Database(String),

    /// Database connection error.
    #[error("database connection error: {0}")]
    DatabaseConnection(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Feed fetch or parse error.
    #[error("feed error: {0}")]
    Feed(String),

    /// Video platform API error.
    #[error("video API error: {0}")]
    Video(String),

    /// Outbound HTTP client error.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for DigestError {
    fn from(e: sqlx::Error) -> Self {
        DigestError::Database(e.to_string())
    }
}

impl From<reqwest::Error> for DigestError {
    fn from(e: reqwest::Error) -> Self {
        DigestError::Http(e.to_string())
    }
}

/// Result type alias for DevDigest operations.
pub type Result<T> = std::result::Result<T, DigestError>;
