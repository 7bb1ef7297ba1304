//! Integration tests for writing metrics and joining them to a snapshot

use chrono::NaiveDate;
use hobart_data::RunCounters;
use hobart_metrics::NormalizedRow;
use hobart_output::{EnrichmentMap, JoinConfig, JoinEngine, MetricsWriter, OutputError};
use rstest::rstest;
use std::path::Path;

const SNAPSHOT: &str = "\
CompanyName, CompanyNumber,RegAddress.PostCode,CompanyCategory,CompanyStatus
ALPHA LTD,00000001,AB1 2CD,Private Limited Company,Active
GAMMA LTD,00000003,EF3 4GH,Private Limited Company,Dissolved
";

fn write_metrics(path: &Path, companies: &[&str]) -> u64 {
    let mut writer = MetricsWriter::create(path).unwrap();
    for (i, company) in companies.iter().enumerate() {
        writer
            .write_row(&NormalizedRow {
                company_number: (*company).to_string(),
                period_start: NaiveDate::from_ymd_opt(2023, 1, 1),
                period_end: NaiveDate::from_ymd_opt(2023, 12, 31),
                metric_tag: "revenue".to_string(),
                value: Some(i as f64 * 1000.0),
                unit: Some("GBP".to_string()),
                metric_label: "Turnover, net".to_string(),
            })
            .unwrap();
    }
    writer.commit().unwrap()
}

fn companies() -> Vec<&'static str> {
    vec![
        "00000001", "00000002", "00000003", "00000001", "00000004", "00000002", "00000003",
    ]
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(3)]
#[case(7)]
#[case(100)]
fn test_chunk_size_does_not_change_output(#[case] chunk_size: usize) {
    let dir = tempfile::tempdir().unwrap();
    let metrics = dir.path().join("metrics.csv");
    assert_eq!(write_metrics(&metrics, &companies()), 7);

    let snapshot = dir.path().join("snapshot.csv");
    std::fs::write(&snapshot, SNAPSHOT).unwrap();
    let map = EnrichmentMap::from_path(&snapshot).unwrap();

    let reference = dir.path().join("reference.csv");
    let chunked = dir.path().join("chunked.csv");
    let mut counters = RunCounters::default();

    JoinEngine::new(&map, JoinConfig::default())
        .unwrap()
        .run_paths(&metrics, &reference, &mut counters)
        .unwrap();
    let summary = JoinEngine::new(&map, JoinConfig::default().with_chunk_size(chunk_size))
        .unwrap()
        .run_paths(&metrics, &chunked, &mut counters)
        .unwrap();

    assert_eq!(
        std::fs::read(&reference).unwrap(),
        std::fs::read(&chunked).unwrap()
    );
    assert_eq!(summary.rows_total, 7);
    assert_eq!(summary.rows_matched, 4);
    assert_eq!(summary.rows_unmatched, 3);
    assert_eq!(summary.chunks, 7_u64.div_ceil(chunk_size as u64));
}

#[test]
fn test_merged_rows_keep_input_order_and_quoting() {
    let dir = tempfile::tempdir().unwrap();
    let metrics = dir.path().join("metrics.csv");
    write_metrics(&metrics, &companies());

    let map = EnrichmentMap::from_reader(SNAPSHOT.as_bytes()).unwrap();
    let output = dir.path().join("merged.csv");
    let mut counters = RunCounters::default();
    let summary = JoinEngine::new(
        &map,
        JoinConfig::default()
            .with_chunk_size(3)
            .with_distinct_unmatched(true),
    )
    .unwrap()
    .run_paths(&metrics, &output, &mut counters)
    .unwrap();

    let mut reader = csv::Reader::from_path(&output).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.len(), 11);
    assert_eq!(&headers[10], "status");

    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    let order: Vec<&str> = rows.iter().map(|r| &r[0]).collect();
    assert_eq!(order, companies());
    assert!(rows.iter().all(|r| &r[6] == "Turnover, net"));

    assert_eq!(&rows[0][7], "ALPHA LTD");
    assert_eq!(&rows[1][7], "");
    assert_eq!(&rows[6][10], "Dissolved");

    assert_eq!(summary.distinct_unmatched, Some(2));
    assert_eq!(counters.keys_unmatched, 3);
}

#[test]
fn test_rerun_replaces_output() {
    let dir = tempfile::tempdir().unwrap();
    let metrics = dir.path().join("metrics.csv");
    write_metrics(&metrics, &["00000001", "00000009"]);

    let map = EnrichmentMap::from_reader(SNAPSHOT.as_bytes()).unwrap();
    let engine = JoinEngine::new(&map, JoinConfig::default()).unwrap();
    let output = dir.path().join("merged.csv");
    let mut counters = RunCounters::default();

    let first_summary = engine.run_paths(&metrics, &output, &mut counters).unwrap();
    let first = std::fs::read(&output).unwrap();
    let second_summary = engine.run_paths(&metrics, &output, &mut counters).unwrap();
    let second = std::fs::read(&output).unwrap();

    assert_eq!(first, second);
    assert_eq!(first_summary, second_summary);
    assert_eq!(first_summary.rows_matched, 1);
    assert_eq!(String::from_utf8(second).unwrap().lines().count(), 3);
}

#[test]
fn test_failed_join_leaves_previous_output() {
    let dir = tempfile::tempdir().unwrap();
    let metrics = dir.path().join("metrics.csv");
    std::fs::write(
        &metrics,
        "company_number,value\n00000001,1\n00000002,2\n00000003\n",
    )
    .unwrap();
    let output = dir.path().join("merged.csv");
    std::fs::write(&output, "previous run\n").unwrap();

    let map = EnrichmentMap::from_reader(SNAPSHOT.as_bytes()).unwrap();
    let engine = JoinEngine::new(&map, JoinConfig::default().with_chunk_size(1)).unwrap();
    let mut counters = RunCounters::default();
    let result = engine.run_paths(&metrics, &output, &mut counters);

    assert!(matches!(result, Err(OutputError::Csv(_))));
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "previous run\n");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
}

#[test]
fn test_missing_metrics_file() {
    let dir = tempfile::tempdir().unwrap();
    let map = EnrichmentMap::new();
    let engine = JoinEngine::new(&map, JoinConfig::default()).unwrap();
    let mut counters = RunCounters::default();

    let output = dir.path().join("out.csv");
    let result = engine.run_paths(dir.path().join("absent.csv"), &output, &mut counters);
    assert!(matches!(result, Err(OutputError::Io(_))));
    assert!(!output.exists());
}
