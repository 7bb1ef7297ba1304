//! Errors for whole-run operations.

use hobart_data::DataError;
use hobart_metrics::VocabularyError;
use hobart_output::OutputError;
use thiserror::Error;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Fatal errors of an extraction or join run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Archive or extractor setup failure
    #[error(transparent)]
    Data(#[from] DataError),

    /// Vocabulary or normalizer setup failure
    #[error(transparent)]
    Vocabulary(#[from] VocabularyError),

    /// Writing or joining failed
    #[error(transparent)]
    Output(#[from] OutputError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed configuration file
    #[error("Invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration value out of range
    #[error("Invalid configuration: {0}")]
    Config(String),
}
