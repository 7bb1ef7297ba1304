//! Extraction pipeline
//!
//! Drives archives through extraction and normalization into one metrics
//! CSV. Archives are processed one after another and filings in entry-name
//! order, so the output is deterministic for a given set of inputs.

use crate::config::RunConfig;
use crate::error::Result;
use hobart_data::{FactExtractor, Filing, FilingArchive, RunCounters, archives_in};
use hobart_metrics::{NormalizedRow, Normalizer};
use hobart_output::MetricsWriter;
use std::io::{Read, Seek, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Archive -> filing -> facts -> rows -> metrics CSV.
#[derive(Debug)]
pub struct ExtractionPipeline {
    extractor: FactExtractor,
    normalizer: Normalizer,
}

impl ExtractionPipeline {
    /// Creates a pipeline around a normalizer.
    pub fn new(normalizer: Normalizer) -> Result<Self> {
        Ok(Self {
            extractor: FactExtractor::new()?,
            normalizer,
        })
    }

    /// Creates a pipeline from run settings.
    pub fn from_config(config: &RunConfig) -> Result<Self> {
        config.validate()?;
        Self::new(config.normalizer()?)
    }

    /// The normalizer in use.
    pub const fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Extracts and normalizes one filing.
    ///
    /// A filing the extractor rejects is logged, counted as failed and
    /// yields no rows.
    pub fn process_filing(
        &self,
        filing: &Filing,
        counters: &mut RunCounters,
    ) -> Vec<NormalizedRow> {
        match self.extractor.extract(filing, &self.normalizer, counters) {
            Ok(facts) => self.normalizer.normalize_all(&facts, counters),
            Err(e) => {
                warn!("Skipping {}: {}", filing.entry_name, e);
                counters.filings_failed += 1;
                Vec::new()
            }
        }
    }

    /// Writes the rows of every filing in `archive`, returning the count.
    pub fn process_archive<R: Read + Seek, W: Write>(
        &self,
        archive: &mut FilingArchive<R>,
        writer: &mut MetricsWriter<W>,
        counters: &mut RunCounters,
    ) -> Result<u64> {
        let before = writer.rows_written();
        let name = archive.name().to_string();

        let mut filings = archive.filings();
        for filing in filings.by_ref() {
            let rows = self.process_filing(&filing, counters);
            writer.write_rows(&rows)?;
        }
        filings.record_into(counters);
        writer.flush()?;

        let written = writer.rows_written() - before;
        counters.rows_written += written;
        info!("{}: {} rows from {} filings", name, written, filings.seen());
        Ok(written)
    }

    /// Processes the archives at `paths` in order into a new metrics file at
    /// `output`. An archive that cannot be opened stops the run, and the
    /// file is only put in place once every archive has been processed.
    pub fn run(
        &self,
        paths: &[PathBuf],
        output: impl AsRef<Path>,
        counters: &mut RunCounters,
    ) -> Result<u64> {
        let mut writer = MetricsWriter::create(output.as_ref())?;
        for path in paths {
            let mut archive = FilingArchive::open(path)?;
            self.process_archive(&mut archive, &mut writer, counters)?;
        }
        let rows = writer.commit()?;
        info!(
            "Wrote {} rows to {} ({} facts, {} unmapped, {} filings failed)",
            rows,
            output.as_ref().display(),
            counters.facts_total(),
            counters.metrics_unmapped,
            counters.filings_failed
        );
        Ok(rows)
    }

    /// Processes every `.zip` archive in `dir`, in name order.
    pub fn run_dir(
        &self,
        dir: impl AsRef<Path>,
        output: impl AsRef<Path>,
        counters: &mut RunCounters,
    ) -> Result<u64> {
        let paths = archives_in(dir)?;
        self.run(&paths, output, counters)
    }
}
