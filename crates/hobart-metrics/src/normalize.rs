//! Metric normalizer
//!
//! Maps [`RawFact`]s onto vocabulary tags. A fact whose label resolves to no
//! tag at or above the threshold is dropped and counted, never emitted under
//! a guessed tag.

use crate::error::{Result, VocabularyError};
use crate::label::normalize_label;
use crate::matcher::{LabelIndex, LabelMatcher, default_matchers};
use crate::row::NormalizedRow;
use crate::vocabulary::Vocabulary;
use hobart_data::{KnownLabels, RawFact, RunCounters};
use tracing::debug;

/// Default minimum confidence for a match.
pub const DEFAULT_THRESHOLD: f64 = 0.85;

/// The outcome of resolving one label.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Resolved tag
    pub tag: String,
    /// Confidence of the winning candidate
    pub confidence: f64,
    /// Name of the matcher that produced it
    pub matcher: &'static str,
}

/// Resolves labels against a vocabulary with a prioritised matcher chain.
#[derive(Debug)]
pub struct Normalizer {
    version: String,
    index: LabelIndex,
    matchers: Vec<Box<dyn LabelMatcher>>,
    threshold: f64,
}

impl Normalizer {
    /// Creates a normalizer with the default matchers and threshold.
    pub fn new(vocabulary: &Vocabulary) -> Result<Self> {
        vocabulary.validate()?;
        Ok(Self {
            version: vocabulary.version.clone(),
            index: LabelIndex::new(vocabulary),
            matchers: default_matchers(),
            threshold: DEFAULT_THRESHOLD,
        })
    }

    /// Sets the minimum confidence, which must be in `(0, 1]`.
    pub fn with_threshold(mut self, threshold: f64) -> Result<Self> {
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(VocabularyError::InvalidThreshold(threshold));
        }
        self.threshold = threshold;
        Ok(self)
    }

    /// Replaces the matcher chain. Earlier matchers win ties.
    pub fn with_matchers(mut self, matchers: Vec<Box<dyn LabelMatcher>>) -> Self {
        self.matchers = matchers;
        self
    }

    /// Current threshold.
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Version of the vocabulary in use.
    pub fn vocabulary_version(&self) -> &str {
        &self.version
    }

    /// Resolves a label to a tag, if any matcher clears the threshold.
    pub fn resolve(&self, label: &str) -> Option<Resolution> {
        let key = normalize_label(label);
        if key.is_empty() {
            return None;
        }

        let mut best: Option<Resolution> = None;
        for matcher in &self.matchers {
            let Some(candidate) = matcher.best(&key, &self.index) else {
                continue;
            };
            if candidate.confidence < self.threshold {
                continue;
            }
            if best.as_ref().is_none_or(|b| candidate.confidence > b.confidence) {
                best = Some(Resolution {
                    tag: candidate.tag.to_string(),
                    confidence: candidate.confidence,
                    matcher: matcher.name(),
                });
            }
        }
        best
    }

    /// Maps one fact to a row, or counts it as unmapped.
    pub fn normalize(
        &self,
        fact: &RawFact,
        counters: &mut RunCounters,
    ) -> Option<NormalizedRow> {
        let Some(resolution) = self.resolve(&fact.label) else {
            debug!("Unmapped label {:?} ({})", fact.label, fact.company_number);
            counters.metrics_unmapped += 1;
            return None;
        };

        Some(NormalizedRow {
            company_number: fact.company_number.clone(),
            period_start: fact.period.and_then(|p| p.start()),
            period_end: fact.period.map(|p| p.end()),
            metric_tag: resolution.tag,
            value: fact.value.as_number(),
            unit: fact.unit.clone(),
            metric_label: fact.label.clone(),
        })
    }

    /// Maps every fact, keeping input order.
    pub fn normalize_all(
        &self,
        facts: &[RawFact],
        counters: &mut RunCounters,
    ) -> Vec<NormalizedRow> {
        facts
            .iter()
            .filter_map(|fact| self.normalize(fact, counters))
            .collect()
    }
}

impl KnownLabels for Normalizer {
    fn is_known(&self, label: &str) -> bool {
        self.resolve(label).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use hobart_data::{FactSource, FactValue, Period};
    use rstest::rstest;

    fn normalizer() -> Normalizer {
        Normalizer::new(&Vocabulary::builtin()).unwrap()
    }

    fn fact(label: &str, value: FactValue) -> RawFact {
        RawFact {
            company_number: "01234567".to_string(),
            label: label.to_string(),
            concept: None,
            value,
            unit: Some("GBP".to_string()),
            period: Some(Period::Duration {
                start: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
            }),
            context_ref: Some("c1".to_string()),
            source: FactSource::Structured,
        }
    }

    #[rstest]
    #[case("Turnover", "revenue", "exact")]
    #[case("Sales", "revenue", "exact")]
    #[case("TurnoverRevenue", "revenue", "exact")]
    #[case("NetAssetsLiabilities", "net_assets", "exact")]
    #[case("Total equity", "total_equity", "exact")]
    #[case("Total current assets", "current_assets", "substring")]
    #[case("Total creditors", "creditors", "substring")]
    #[case("Taxation", "tax", "exact")]
    #[case("Turnovr", "revenue", "fuzzy")]
    fn test_resolve(#[case] label: &str, #[case] tag: &str, #[case] matcher: &str) {
        let resolution = normalizer().resolve(label).unwrap();
        assert_eq!(resolution.tag, tag);
        assert_eq!(resolution.matcher, matcher);
    }

    #[rstest]
    #[case("Zebra crossings")]
    #[case("Directors' remuneration")]
    #[case("")]
    #[case("2023")]
    #[case("Deferred tax")]
    #[case("Equity dividends")]
    #[case("Called up share capital not paid")]
    #[case("Stock options")]
    #[case("Employees costs")]
    #[case("Sales tax")]
    #[case("Profit share")]
    fn test_resolve_none(#[case] label: &str) {
        assert!(normalizer().resolve(label).is_none());
    }

    #[test]
    fn test_exact_wins_tie_with_substring() {
        // Exact gives 1.0; full-coverage substring also gives 1.0.
        let resolution = normalizer().resolve("Net assets").unwrap();
        assert_eq!(resolution.matcher, "exact");
    }

    #[test]
    fn test_normalize_maps_fields() {
        let mut counters = RunCounters::default();
        let row = normalizer()
            .normalize(&fact("ProfitLoss", FactValue::Number(-12.5)), &mut counters)
            .unwrap();

        assert_eq!(row.metric_tag, "profit");
        assert_eq!(row.value, Some(-12.5));
        assert_eq!(row.period_start, NaiveDate::from_ymd_opt(2023, 1, 1));
        assert_eq!(row.period_end, NaiveDate::from_ymd_opt(2023, 12, 31));
        assert_eq!(row.unit.as_deref(), Some("GBP"));
        assert_eq!(row.metric_label, "ProfitLoss");
        assert_eq!(counters.metrics_unmapped, 0);
    }

    #[test]
    fn test_unmapped_dropped_and_counted() {
        let mut counters = RunCounters::default();
        let facts = vec![
            fact("Turnover", FactValue::Number(1.0)),
            fact("Zebra crossings", FactValue::Number(2.0)),
            fact("Sales", FactValue::Text(String::new())),
        ];
        let rows = normalizer().normalize_all(&facts, &mut counters);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].metric_tag, "revenue");
        assert_eq!(rows[1].metric_tag, "revenue");
        assert_eq!(rows[1].value, None);
        assert_eq!(counters.metrics_unmapped, 1);
    }

    #[test]
    fn test_threshold_bounds() {
        assert!(normalizer().with_threshold(0.0).is_err());
        assert!(normalizer().with_threshold(1.5).is_err());
        assert!(normalizer().with_threshold(f64::NAN).is_err());

        let strict = normalizer().with_threshold(1.0).unwrap();
        assert!(strict.resolve("Turnovr").is_none());
        assert!(strict.resolve("Turnover").is_some());
    }

    #[test]
    fn test_known_labels() {
        let normalizer = normalizer();
        assert!(normalizer.is_known("Net assets"));
        assert!(!normalizer.is_known("Notes"));
        assert!(!normalizer.is_known("Deferred tax"));
    }
}
