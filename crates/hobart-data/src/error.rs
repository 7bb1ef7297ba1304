//! Error types for archive and filing operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while reading archives and filings.
///
/// Problems confined to one archive entry or one filing are absorbed by the
/// caller and tallied in [`RunCounters`](crate::RunCounters); the variants
/// here are what reaches the caller.
#[derive(Debug, Error)]
pub enum DataError {
    /// The archive could not be opened at all
    #[error("Cannot open archive {path}: {source}")]
    ArchiveOpen {
        /// Path of the archive
        path: PathBuf,
        /// Underlying zip error
        #[source]
        source: zip::result::ZipError,
    },

    /// Zip container error
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An inline XBRL document is not well-formed
    #[error("Inline XBRL parse error in {entry}: {reason}")]
    InlineXbrl {
        /// Archive entry name of the filing
        entry: String,
        /// Parser message
        reason: String,
    },

    /// An HTML selector failed to compile
    #[error("Invalid selector {0:?}")]
    Selector(String),

    /// The archive directory holds no bundles
    #[error("No .zip archives found in {0}")]
    NoArchives(PathBuf),
}
