#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hobart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod label;
pub mod matcher;
pub mod normalize;
pub mod row;
pub mod vocabulary;

pub use error::{Result, VocabularyError};
pub use label::normalize_label;
pub use matcher::{
    Candidate, ExactMatcher, FuzzyMatcher, LabelIndex, LabelMatcher, SubstringMatcher,
    default_matchers,
};
pub use normalize::{DEFAULT_THRESHOLD, Normalizer, Resolution};
pub use row::NormalizedRow;
pub use vocabulary::{BUILTIN_VERSION, Concept, Vocabulary};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
