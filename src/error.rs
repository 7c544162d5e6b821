use std::io;
use thiserror::Error;

/// Error type for delimiter checking operations.
#[derive(Error, Debug)]
pub enum CheckError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// CSV writing error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid file name pattern.
    #[error("Invalid file pattern: {0}")]
    Regex(#[from] regex::Error),

    /// The source produced zero lines.
    #[error("Empty file or no lines to check")]
    EmptyInput,

    /// No candidate delimiter splits the sample consistently.
    #[error("Could not detect a consistent delimiter")]
    NoDelimiterFound,

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for checking operations.
pub type Result<T> = std::result::Result<T, CheckError>;
