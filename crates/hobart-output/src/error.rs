//! Error types for writing and joining.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for output operations.
pub type Result<T> = std::result::Result<T, OutputError>;

/// Errors that stop a write or join.
///
/// Unmatched keys are not errors; they are tallied in
/// [`JoinSummary`](crate::JoinSummary).
#[derive(Debug, Error)]
pub enum OutputError {
    /// CSV read or write error, including malformed records
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Zip container error
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A required column is absent from a header row
    #[error("Missing column {column:?} in {input}")]
    MissingColumn {
        /// Column name
        column: &'static str,
        /// Which input lacked it
        input: &'static str,
    },

    /// A snapshot archive holds no CSV file
    #[error("No .csv entry in {0}")]
    NoCsvEntry(PathBuf),

    /// Invalid join settings
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
