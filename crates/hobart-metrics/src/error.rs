//! Error types for vocabulary loading and normalizer setup.

use thiserror::Error;

/// Result type for metric operations.
pub type Result<T> = std::result::Result<T, VocabularyError>;

/// Errors raised while loading a vocabulary or configuring a normalizer.
///
/// Labels that match nothing are not errors; the normalizer counts them in
/// [`RunCounters`](hobart_data::RunCounters) and moves on.
#[derive(Debug, Error)]
pub enum VocabularyError {
    /// IO error reading a vocabulary file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed vocabulary JSON
    #[error("Invalid vocabulary JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Two concepts share a tag
    #[error("Duplicate metric tag {0:?}")]
    DuplicateTag(String),

    /// A concept has a blank tag
    #[error("Metric tag must not be empty")]
    EmptyTag,

    /// One label is claimed by two tags
    #[error("Label {label:?} maps to both {first:?} and {second:?}")]
    ConflictingLabel {
        /// Label as written in the vocabulary
        label: String,
        /// Tag that claimed the label first
        first: String,
        /// Tag that claimed it again
        second: String,
    },

    /// Threshold outside `(0, 1]`
    #[error("Match threshold must be in (0, 1], got {0}")]
    InvalidThreshold(f64),
}
