//! Join summary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Totals reported at the end of a join.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinSummary {
    /// Metrics rows read (and written)
    pub rows_total: u64,
    /// Rows whose company number was found in the snapshot
    pub rows_matched: u64,
    /// Rows written with empty enrichment fields
    pub rows_unmatched: u64,
    /// Chunks processed
    pub chunks: u64,
    /// Distinct unmatched company numbers, when tracking was enabled
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub distinct_unmatched: Option<usize>,
}

impl JoinSummary {
    /// Fraction of rows matched, or `None` for an empty input.
    pub fn match_rate(&self) -> Option<f64> {
        (self.rows_total > 0).then(|| self.rows_matched as f64 / self.rows_total as f64)
    }

    /// Compact JSON form, as printed by the command line.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl fmt::Display for JoinSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rows in {} chunks: {} matched, {} unmatched",
            self.rows_total, self.chunks, self.rows_matched, self.rows_unmatched
        )?;
        if let Some(distinct) = self.distinct_unmatched {
            write!(f, " ({} distinct company numbers)", distinct)?;
        }
        Ok(())
    }
}
