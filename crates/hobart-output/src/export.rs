//! Metrics dataset writer.
//!
//! Appends [`NormalizedRow`]s to a CSV file with a fixed header. Rows are
//! streamed; nothing is held back beyond the CSV writer's buffer. A file
//! opened with [`MetricsWriter::create`] replaces its path only on
//! [`MetricsWriter::commit`].

use crate::error::Result;
use crate::staged::StagedFile;
use hobart_metrics::NormalizedRow;
use std::io::Write;
use std::path::Path;

/// Streaming writer for the metrics dataset.
#[derive(Debug)]
pub struct MetricsWriter<W: Write = StagedFile> {
    writer: csv::Writer<W>,
    rows: u64,
}

impl MetricsWriter<StagedFile> {
    /// Starts a metrics file that will replace `path`, and writes the header.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(StagedFile::create(path)?)
    }

    /// Moves the finished file into place and returns the number of rows.
    pub fn commit(self) -> Result<u64> {
        let rows = self.rows;
        self.into_inner()?.commit()?;
        Ok(rows)
    }
}

impl<W: Write> MetricsWriter<W> {
    /// Wraps `writer` and writes the header.
    pub fn new(writer: W) -> Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        writer.write_record(NormalizedRow::COLUMNS)?;
        Ok(Self { writer, rows: 0 })
    }

    /// Appends one row.
    pub fn write_row(&mut self, row: &NormalizedRow) -> Result<()> {
        self.writer.serialize(row)?;
        self.rows += 1;
        Ok(())
    }

    /// Appends every row in order.
    pub fn write_rows<'a>(
        &mut self,
        rows: impl IntoIterator<Item = &'a NormalizedRow>,
    ) -> Result<()> {
        for row in rows {
            self.write_row(row)?;
        }
        Ok(())
    }

    /// Rows written so far, excluding the header.
    pub const fn rows_written(&self) -> u64 {
        self.rows
    }

    /// Flushes buffered output to the underlying writer.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flushes and returns the number of rows written.
    pub fn finish(mut self) -> Result<u64> {
        self.writer.flush()?;
        Ok(self.rows)
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.writer.into_inner().map_err(|e| e.into_error().into())
    }
}
