//! Chunked left join of the metrics dataset against the company snapshot.
//!
//! The metrics file is read in sequential, non-overlapping chunks of
//! `chunk_size` records. Each chunk is joined, written and flushed before
//! the next is read, so peak memory is one chunk plus the snapshot. Input
//! columns pass through unchanged and in order; the enrichment columns are
//! appended.

use crate::enrichment::{ENRICHMENT_COLUMNS, EnrichmentMap};
use crate::error::{OutputError, Result};
use crate::staged::StagedFile;
use crate::summary::JoinSummary;
use hobart_data::RunCounters;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, info};

/// Key column of the metrics dataset.
pub const KEY_COLUMN: &str = "company_number";

/// Default records per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 1_000_000;

/// Join settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinConfig {
    /// Records per chunk; must be positive
    pub chunk_size: usize,
    /// Also count distinct unmatched company numbers (memory grows with them)
    pub track_distinct_unmatched: bool,
}

impl Default for JoinConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            track_distinct_unmatched: false,
        }
    }
}

impl JoinConfig {
    /// Sets the chunk size.
    pub const fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Enables or disables distinct unmatched tracking.
    pub const fn with_distinct_unmatched(mut self, track: bool) -> Self {
        self.track_distinct_unmatched = track;
        self
    }

    /// Rejects a zero chunk size.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(OutputError::InvalidConfig(
                "chunk_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Streams metrics through a left join against an [`EnrichmentMap`].
#[derive(Debug)]
pub struct JoinEngine<'a> {
    enrichment: &'a EnrichmentMap,
    config: JoinConfig,
}

impl<'a> JoinEngine<'a> {
    /// Creates an engine; fails on an invalid config.
    pub fn new(enrichment: &'a EnrichmentMap, config: JoinConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { enrichment, config })
    }

    /// The engine's settings.
    pub const fn config(&self) -> &JoinConfig {
        &self.config
    }

    /// Joins the metrics CSV read from `reader` and writes the merged CSV to
    /// `writer`.
    ///
    /// A missing `company_number` header or a malformed record stops the
    /// run. Rows already flushed to `writer` stay there; [`run_paths`]
    /// discards them.
    ///
    /// [`run_paths`]: JoinEngine::run_paths
    pub fn run<R: Read, W: Write>(
        &self,
        reader: R,
        writer: W,
        counters: &mut RunCounters,
    ) -> Result<JoinSummary> {
        let mut input = csv::ReaderBuilder::new().from_reader(reader);
        let headers = input.headers()?.clone();
        let key_idx = headers
            .iter()
            .position(|h| h.trim() == KEY_COLUMN)
            .ok_or(OutputError::MissingColumn {
                column: KEY_COLUMN,
                input: "metrics dataset",
            })?;

        let mut output = csv::WriterBuilder::new().from_writer(writer);
        let mut header = headers.clone();
        header.extend(ENRICHMENT_COLUMNS);
        output.write_record(&header)?;

        let chunk_size = self.config.chunk_size;
        let mut summary = JoinSummary::default();
        let mut distinct: Option<HashSet<String>> =
            self.config.track_distinct_unmatched.then(HashSet::new);
        let mut chunk = Vec::with_capacity(chunk_size.min(8192));
        let mut merged = csv::StringRecord::new();

        loop {
            chunk.clear();
            read_chunk(&mut input, &mut chunk, chunk_size)?;
            if chunk.is_empty() {
                break;
            }
            summary.chunks += 1;

            let mut matched = 0u64;
            for record in &chunk {
                let key = record.get(key_idx).unwrap_or_default().trim();
                merged.clear();
                merged.extend(record.iter());
                match self.enrichment.get(key) {
                    Some(found) => {
                        merged.extend(found.fields());
                        matched += 1;
                    }
                    None => {
                        merged.extend([""; 4]);
                        if let Some(keys) = distinct.as_mut()
                            && !keys.contains(key)
                        {
                            keys.insert(key.to_string());
                        }
                    }
                }
                output.write_record(&merged)?;
            }
            output.flush()?;

            let rows = chunk.len() as u64;
            summary.rows_total += rows;
            summary.rows_matched += matched;
            summary.rows_unmatched += rows - matched;
            debug!(
                "Chunk {}: {} rows, {} matched",
                summary.chunks, rows, matched
            );

            if chunk.len() < chunk_size {
                break;
            }
        }

        output.flush()?;
        summary.distinct_unmatched = distinct.map(|keys| keys.len());
        counters.rows_joined += summary.rows_total;
        counters.keys_unmatched += summary.rows_unmatched;
        info!("Join finished: {}", summary);
        Ok(summary)
    }

    /// Joins the metrics file at `metrics` into a new file at `output`,
    /// replacing any previous contents. On error `output` is left untouched.
    pub fn run_paths(
        &self,
        metrics: impl AsRef<Path>,
        output: impl AsRef<Path>,
        counters: &mut RunCounters,
    ) -> Result<JoinSummary> {
        let reader = File::open(metrics.as_ref())?;
        let mut staged = StagedFile::create(output.as_ref())?;
        debug!(
            "Joining {} into {}",
            metrics.as_ref().display(),
            output.as_ref().display()
        );
        let summary = self.run(reader, &mut staged, counters)?;
        staged.commit()?;
        Ok(summary)
    }
}

/// Reads up to `limit` records into `chunk`.
fn read_chunk<R: Read>(
    input: &mut csv::Reader<R>,
    chunk: &mut Vec<csv::StringRecord>,
    limit: usize,
) -> Result<()> {
    while chunk.len() < limit {
        let mut record = csv::StringRecord::new();
        if !input.read_record(&mut record)? {
            break;
        }
        chunk.push(record);
    }
    Ok(())
}
