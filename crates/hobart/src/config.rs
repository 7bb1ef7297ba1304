//! Run configuration
//!
//! One JSON document covers both stages. Every field is optional; omitted
//! fields take their defaults:
//!
//! ```json
//! {
//!   "chunk_size": 1000000,
//!   "fuzzy_threshold": 0.85,
//!   "vocabulary": "vocabulary.json",
//!   "track_distinct_unmatched": false
//! }
//! ```

use crate::error::{PipelineError, Result};
use hobart_metrics::{DEFAULT_THRESHOLD, Normalizer, Vocabulary};
use hobart_output::{DEFAULT_CHUNK_SIZE, JoinConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Settings shared by extraction and join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Metrics records per join chunk
    pub chunk_size: usize,
    /// Minimum label match confidence, in `(0, 1]`
    pub fuzzy_threshold: f64,
    /// Vocabulary file; the built-in vocabulary when absent
    pub vocabulary: Option<PathBuf>,
    /// Count distinct unmatched company numbers during the join
    pub track_distinct_unmatched: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            fuzzy_threshold: DEFAULT_THRESHOLD,
            vocabulary: None,
            track_distinct_unmatched: false,
        }
    }
}

impl RunConfig {
    /// Reads and validates a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: Self = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        config.validate()?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(PipelineError::Config(
                "chunk_size must be at least 1".to_string(),
            ));
        }
        if !(self.fuzzy_threshold > 0.0 && self.fuzzy_threshold <= 1.0) {
            return Err(PipelineError::Config(format!(
                "fuzzy_threshold must be in (0, 1], got {}",
                self.fuzzy_threshold
            )));
        }
        Ok(())
    }

    /// The configured vocabulary, or the built-in one.
    pub fn load_vocabulary(&self) -> Result<Vocabulary> {
        match &self.vocabulary {
            Some(path) => Ok(Vocabulary::from_path(path)?),
            None => Ok(Vocabulary::builtin()),
        }
    }

    /// A normalizer over the configured vocabulary and threshold.
    pub fn normalizer(&self) -> Result<Normalizer> {
        let vocabulary = self.load_vocabulary()?;
        Ok(Normalizer::new(&vocabulary)?.with_threshold(self.fuzzy_threshold)?)
    }

    /// Join settings.
    pub const fn join_config(&self) -> JoinConfig {
        JoinConfig {
            chunk_size: self.chunk_size,
            track_distinct_unmatched: self.track_distinct_unmatched,
        }
    }
}
