#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hobart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod archive;
pub mod counters;
pub mod error;
pub mod extract;
pub mod filing;

pub use archive::{FilingArchive, Filings, archives_in};
pub use counters::RunCounters;
pub use error::{DataError, Result};
pub use extract::{FactExtractor, KnownLabels, parse_amount};
pub use filing::{FactSource, FactValue, Filing, Period, RawFact};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
