#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hobart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod enrichment;
pub mod error;
pub mod export;
pub mod join;
pub mod staged;
pub mod summary;

pub use enrichment::{ENRICHMENT_COLUMNS, EnrichmentMap, EnrichmentRecord};
pub use error::{OutputError, Result};
pub use export::MetricsWriter;
pub use join::{DEFAULT_CHUNK_SIZE, JoinConfig, JoinEngine, KEY_COLUMN};
pub use staged::StagedFile;
pub use summary::JoinSummary;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
