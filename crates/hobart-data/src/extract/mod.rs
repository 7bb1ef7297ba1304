//! Fact extraction from filing documents.
//!
//! Two encodings are recognised:
//! - inline XBRL, where each figure is an `ix:nonFraction` tag resolved
//!   against the document's contexts and units;
//! - plain HTML tables, scanned row by row for known labels.
//!
//! Tagged facts are authoritative. The table scan runs only when a document
//! has no tagged facts at all.
//!
//! # Example
//!
//! ```
//! use hobart_data::{FactExtractor, Filing, KnownLabels, RunCounters};
//!
//! struct Turnover;
//!
//! impl KnownLabels for Turnover {
//!     fn is_known(&self, label: &str) -> bool {
//!         label.eq_ignore_ascii_case("turnover")
//!     }
//! }
//!
//! let filing = Filing::new(
//!     "bundle.zip",
//!     "Prod223_3525_01234567_20230331.html",
//!     "<table><tr><td>Turnover</td><td>(1,234)</td></tr></table>".to_string(),
//! );
//!
//! let mut counters = RunCounters::default();
//! let facts = FactExtractor::new()?.extract(&filing, &Turnover, &mut counters)?;
//! assert_eq!(facts[0].value.as_number(), Some(-1234.0));
//! # Ok::<(), hobart_data::DataError>(())
//! ```

mod ixbrl;
mod table;
mod value;

pub use value::parse_amount;

use crate::counters::RunCounters;
use crate::error::{DataError, Result};
use crate::filing::{FactSource, FactValue, Filing, Period, RawFact};
use chrono::Datelike;
use ixbrl::InlineDocument;
use std::collections::HashSet;
use table::TableScanner;
use tracing::debug;

/// Decides whether a table row heading names a metric worth extracting.
///
/// Implemented by the metric normalizer, so the table scan only picks up
/// rows the normalizer will be able to map.
pub trait KnownLabels {
    /// Returns true if `label` matches a known concept.
    fn is_known(&self, label: &str) -> bool;
}

/// Extracts raw facts from filing documents.
#[derive(Debug)]
pub struct FactExtractor {
    tables: TableScanner,
}

impl FactExtractor {
    /// Creates an extractor.
    pub fn new() -> Result<Self> {
        Ok(Self {
            tables: TableScanner::new()?,
        })
    }

    /// Extracts the facts of one filing.
    ///
    /// Returns an empty vector for documents with no recognisable figures.
    /// Returns an error only when a document that declares inline XBRL is
    /// not well-formed; callers skip such filings.
    pub fn extract(
        &self,
        filing: &Filing,
        labels: &dyn KnownLabels,
        counters: &mut RunCounters,
    ) -> Result<Vec<RawFact>> {
        let document = match InlineDocument::parse(&filing.content) {
            Ok(document) => document,
            Err(reason) if declares_inline_xbrl(&filing.content) => {
                return Err(DataError::InlineXbrl {
                    entry: filing.entry_name.clone(),
                    reason,
                });
            }
            Err(reason) => {
                debug!("{} is not XML ({}), scanning tables", filing.entry_name, reason);
                InlineDocument::default()
            }
        };

        let structured = structured_facts(filing, &document, counters);
        if !structured.is_empty() {
            counters.facts_structured += structured.len() as u64;
            return Ok(structured);
        }

        let period_end = filing.period_end.or_else(|| document.latest_period_end());
        let company_number = if filing.company_number.is_empty() {
            document.entity.clone().unwrap_or_default()
        } else {
            filing.company_number.clone()
        };

        let hits = self
            .tables
            .scan(&filing.content, period_end.map(|d| d.year()), labels);
        let mut facts = Vec::with_capacity(hits.len());
        for hit in hits {
            let Some(amount) = hit.value else {
                counters.values_unparseable += 1;
                continue;
            };
            facts.push(RawFact {
                company_number: company_number.clone(),
                label: hit.label,
                concept: None,
                value: FactValue::Number(amount),
                unit: None,
                period: period_end.map(Period::Instant),
                context_ref: None,
                source: FactSource::Table,
            });
        }

        if facts.is_empty() {
            debug!("No facts found in {}", filing.entry_name);
            counters.filings_empty += 1;
        } else {
            counters.facts_table += facts.len() as u64;
        }
        Ok(facts)
    }
}

/// Resolves tagged facts against contexts and units, dropping facts whose
/// context is undefined and exact repeats of an earlier fact.
fn structured_facts(
    filing: &Filing,
    document: &InlineDocument,
    counters: &mut RunCounters,
) -> Vec<RawFact> {
    let mut seen = HashSet::new();
    let mut facts = Vec::new();

    for fact in &document.facts {
        let Some(context) = document.contexts.get(&fact.context_ref) else {
            debug!(
                "Dropping {} in {}: undefined context {:?}",
                fact.name, filing.entry_name, fact.context_ref
            );
            counters.facts_no_context += 1;
            continue;
        };

        let value = fact.value();
        let key = (fact.name.clone(), fact.context_ref.clone(), value_key(&value));
        if !seen.insert(key) {
            continue;
        }
        if matches!(value, FactValue::Text(_)) {
            counters.values_null += 1;
        }

        let company_number = context
            .entity
            .clone()
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| filing.company_number.clone());

        facts.push(RawFact {
            company_number,
            label: fact.local_name().to_string(),
            concept: Some(fact.name.clone()),
            value,
            unit: fact.unit_ref.as_deref().map(|u| document.unit(u)),
            period: context.period,
            context_ref: Some(fact.context_ref.clone()),
            source: FactSource::Structured,
        });
    }

    facts
}

fn value_key(value: &FactValue) -> String {
    match value {
        FactValue::Number(n) => n.to_string(),
        FactValue::Text(t) => format!("text:{t}"),
    }
}

fn declares_inline_xbrl(content: &str) -> bool {
    content.contains("nonFraction") || content.contains("http://www.xbrl.org/2013/inlineXBRL")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    struct AllLabels;

    impl KnownLabels for AllLabels {
        fn is_known(&self, _label: &str) -> bool {
            true
        }
    }

    fn filing(content: &str) -> Filing {
        Filing::new(
            "bundle.zip",
            "Prod223_3525_01234567_20230331.html",
            content.to_string(),
        )
    }

    #[test]
    fn test_empty_filing_is_not_an_error() {
        let mut counters = RunCounters::default();
        let extractor = FactExtractor::new().unwrap();
        let facts = extractor
            .extract(&filing("<html><body><p>Dormant</p></body></html>"), &AllLabels, &mut counters)
            .unwrap();

        assert!(facts.is_empty());
        assert_eq!(counters.filings_empty, 1);
    }

    #[test]
    fn test_table_fact_inherits_filing_period() {
        let mut counters = RunCounters::default();
        let extractor = FactExtractor::new().unwrap();
        let facts = extractor
            .extract(
                &filing("<table><tr><td>Turnover</td><td>1,000</td></tr></table>"),
                &AllLabels,
                &mut counters,
            )
            .unwrap();

        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].company_number, "01234567");
        assert_eq!(facts[0].source, FactSource::Table);
        assert_eq!(
            facts[0].period,
            Some(Period::Instant(NaiveDate::from_ymd_opt(2023, 3, 31).unwrap()))
        );
        assert_eq!(counters.facts_table, 1);
    }

    #[test]
    fn test_unparseable_cells_counted() {
        let mut counters = RunCounters::default();
        let extractor = FactExtractor::new().unwrap();
        let facts = extractor
            .extract(
                &filing("<table><tr><td>Turnover</td><td>n/a</td></tr></table>"),
                &AllLabels,
                &mut counters,
            )
            .unwrap();

        assert!(facts.is_empty());
        assert_eq!(counters.values_unparseable, 1);
        assert_eq!(counters.filings_empty, 1);
    }

    #[test]
    fn test_broken_inline_document_is_an_error() {
        let mut counters = RunCounters::default();
        let extractor = FactExtractor::new().unwrap();
        let broken = "<html xmlns:ix=\"http://www.xbrl.org/2013/inlineXBRL\"><!-- unterminated";
        let result = extractor.extract(&filing(broken), &AllLabels, &mut counters);

        assert!(matches!(result, Err(DataError::InlineXbrl { .. })));
    }

    #[test]
    fn test_value_key_distinguishes_text() {
        assert_ne!(
            value_key(&FactValue::Number(0.0)),
            value_key(&FactValue::Text("0".to_string()))
        );
    }
}
