//! Run-wide counters.
//!
//! Every stage of a run takes `&mut RunCounters` and records the per-entry,
//! per-fact and per-row conditions it absorbed instead of failing. The
//! accumulator is handed back to the caller at the end of the run.

use serde::{Deserialize, Serialize};

/// Tally of everything a run processed, skipped or dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounters {
    /// Archive entries that could not be opened or decompressed
    pub entries_skipped: u64,
    /// Directory and non-document entries passed over
    pub non_documents: u64,
    /// Filing documents yielded by archives
    pub filings_seen: u64,
    /// Filings whose markup could not be parsed
    pub filings_failed: u64,
    /// Filings that produced no facts at all
    pub filings_empty: u64,
    /// Facts read from inline XBRL tags
    pub facts_structured: u64,
    /// Facts read by the table scan fallback
    pub facts_table: u64,
    /// Inline XBRL facts dropped because their context is undefined
    pub facts_no_context: u64,
    /// Candidate table cells that did not parse to a number
    pub values_unparseable: u64,
    /// Structured facts whose text did not parse, emitted with a null value
    pub values_null: u64,
    /// Facts whose label matched no vocabulary concept
    pub metrics_unmapped: u64,
    /// Normalized rows written to the metrics dataset
    pub rows_written: u64,
    /// Rows passed through the join
    pub rows_joined: u64,
    /// Joined rows whose company number had no enrichment record
    pub keys_unmatched: u64,
}

impl RunCounters {
    /// Creates an empty tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds every count of `other` into `self`.
    pub const fn merge(&mut self, other: &Self) {
        self.entries_skipped += other.entries_skipped;
        self.non_documents += other.non_documents;
        self.filings_seen += other.filings_seen;
        self.filings_failed += other.filings_failed;
        self.filings_empty += other.filings_empty;
        self.facts_structured += other.facts_structured;
        self.facts_table += other.facts_table;
        self.facts_no_context += other.facts_no_context;
        self.values_unparseable += other.values_unparseable;
        self.values_null += other.values_null;
        self.metrics_unmapped += other.metrics_unmapped;
        self.rows_written += other.rows_written;
        self.rows_joined += other.rows_joined;
        self.keys_unmatched += other.keys_unmatched;
    }

    /// Total facts extracted by either method.
    pub const fn facts_total(&self) -> u64 {
        self.facts_structured + self.facts_table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_adds_fields() {
        let mut a = RunCounters {
            filings_seen: 2,
            metrics_unmapped: 1,
            ..RunCounters::default()
        };
        let b = RunCounters {
            filings_seen: 3,
            keys_unmatched: 4,
            ..RunCounters::default()
        };

        a.merge(&b);

        assert_eq!(a.filings_seen, 5);
        assert_eq!(a.metrics_unmapped, 1);
        assert_eq!(a.keys_unmatched, 4);
    }

    #[test]
    fn test_facts_total() {
        let counters = RunCounters {
            facts_structured: 7,
            facts_table: 2,
            ..RunCounters::default()
        };
        assert_eq!(counters.facts_total(), 9);
    }
}
