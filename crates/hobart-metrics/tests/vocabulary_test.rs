//! Integration tests for vocabulary files and normalization

use hobart_data::{FactSource, FactValue, RawFact, RunCounters};
use hobart_metrics::{Normalizer, Vocabulary, VocabularyError};

fn table_fact(label: &str, value: f64) -> RawFact {
    RawFact {
        company_number: "SC123456".to_string(),
        label: label.to_string(),
        concept: None,
        value: FactValue::Number(value),
        unit: None,
        period: None,
        context_ref: None,
        source: FactSource::Table,
    }
}

#[test]
fn test_extended_vocabulary_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vocabulary.json");

    // Extend the built-in table without touching code.
    let mut vocabulary = Vocabulary::builtin();
    vocabulary.version = "custom-1".to_string();
    vocabulary
        .concepts
        .iter_mut()
        .find(|c| c.tag == "revenue")
        .unwrap()
        .labels
        .push("Fee income".to_string());
    std::fs::write(&path, vocabulary.to_json().unwrap()).unwrap();

    let loaded = Vocabulary::from_path(&path).unwrap();
    let normalizer = Normalizer::new(&loaded).unwrap();
    assert_eq!(normalizer.vocabulary_version(), "custom-1");

    let mut counters = RunCounters::default();
    let row = normalizer
        .normalize(&table_fact("Fee income", 42.0), &mut counters)
        .unwrap();
    assert_eq!(row.metric_tag, "revenue");
    assert_eq!(row.period_start, None);
    assert_eq!(row.period_end, None);
}

#[test]
fn test_vocabulary_file_errors() {
    let dir = tempfile::tempdir().unwrap();

    let missing = Vocabulary::from_path(dir.path().join("missing.json"));
    assert!(matches!(missing, Err(VocabularyError::Io(_))));

    let garbled = dir.path().join("garbled.json");
    std::fs::write(&garbled, "{ not json").unwrap();
    assert!(matches!(Vocabulary::from_path(&garbled), Err(VocabularyError::Json(_))));
}

#[test]
fn test_same_metric_from_both_sources_shares_tag() {
    let normalizer = Normalizer::new(&Vocabulary::builtin()).unwrap();
    let mut counters = RunCounters::default();

    let structured = RawFact {
        label: "TurnoverRevenue".to_string(),
        source: FactSource::Structured,
        ..table_fact("", 10.0)
    };
    let rows = normalizer.normalize_all(
        &[structured, table_fact("Turnover", 10.0), table_fact("Sales", 10.0)],
        &mut counters,
    );

    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.metric_tag == "revenue"));
    assert_eq!(counters.metrics_unmapped, 0);
}
