//! Bulk accounts archive reading.
//!
//! A monthly accounts bundle is a zip file holding one HTML or XHTML
//! document per filing. [`FilingArchive::filings`] walks the documents in
//! entry-name order, lazily decompressing one entry at a time. Entries that
//! fail to open or decompress are skipped and counted; they never abort the
//! pass over the rest of the archive.

use crate::counters::RunCounters;
use crate::error::{DataError, Result};
use crate::filing::Filing;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use zip::ZipArchive;

/// Upper bound on the buffer pre-allocated for one entry.
const MAX_PREALLOC_BYTES: u64 = 16 * 1024 * 1024;

/// Extensions of entries treated as filing documents.
const DOCUMENT_EXTENSIONS: [&str; 3] = [".html", ".htm", ".xhtml"];

/// A zip bundle of filing documents.
#[derive(Debug)]
pub struct FilingArchive<R = File> {
    name: String,
    archive: ZipArchive<R>,
}

impl FilingArchive<File> {
    /// Opens the archive at `path`.
    ///
    /// An archive that cannot be opened at all is fatal for the run, unlike
    /// individual corrupt entries.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let archive = ZipArchive::new(file).map_err(|source| DataError::ArchiveOpen {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        debug!("Opened archive {} with {} entries", name, archive.len());
        Ok(Self { name, archive })
    }
}

impl<R: Read + Seek> FilingArchive<R> {
    /// Wraps an already-open zip stream.
    pub fn from_reader(name: impl Into<String>, reader: R) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            archive: ZipArchive::new(reader)?,
        })
    }

    /// File name of the archive.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of entries, documents or not.
    pub fn len(&self) -> usize {
        self.archive.len()
    }

    /// Returns true if the archive has no entries.
    pub fn is_empty(&self) -> bool {
        self.archive.len() == 0
    }

    /// Iterates the filing documents in entry-name order.
    ///
    /// Each call starts a fresh pass over the archive and yields the same
    /// sequence.
    pub fn filings(&mut self) -> Filings<'_, R> {
        let mut entries: Vec<String> = self.archive.file_names().map(str::to_string).collect();
        entries.sort();

        Filings {
            source: &self.name,
            archive: &mut self.archive,
            entries: entries.into_iter(),
            seen: 0,
            skipped: 0,
            non_documents: 0,
        }
    }
}

/// Lazy iterator over the filings of one archive.
///
/// Tallies what it passes over; call [`Filings::record_into`] once the pass
/// is done to fold the tallies into the run's counters.
#[derive(Debug)]
pub struct Filings<'a, R> {
    source: &'a str,
    archive: &'a mut ZipArchive<R>,
    entries: std::vec::IntoIter<String>,
    seen: u64,
    skipped: u64,
    non_documents: u64,
}

impl<R: Read + Seek> Filings<'_, R> {
    /// Corrupt entries skipped so far.
    pub const fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Directory and non-document entries passed over so far.
    pub const fn non_documents(&self) -> u64 {
        self.non_documents
    }

    /// Filings yielded so far.
    pub const fn seen(&self) -> u64 {
        self.seen
    }

    /// Adds this pass's tallies to `counters`.
    pub const fn record_into(&self, counters: &mut RunCounters) {
        counters.filings_seen += self.seen;
        counters.entries_skipped += self.skipped;
        counters.non_documents += self.non_documents;
    }
}

impl<R: Read + Seek> Iterator for Filings<'_, R> {
    type Item = Filing;

    fn next(&mut self) -> Option<Filing> {
        loop {
            let name = self.entries.next()?;
            if !is_document_name(&name) {
                self.non_documents += 1;
                continue;
            }

            let mut entry = match self.archive.by_name(&name) {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry {} in {}: {}", name, self.source, e);
                    self.skipped += 1;
                    continue;
                }
            };
            if entry.is_dir() {
                self.non_documents += 1;
                continue;
            }

            let mut bytes = Vec::with_capacity(entry.size().min(MAX_PREALLOC_BYTES) as usize);
            if let Err(e) = entry.read_to_end(&mut bytes) {
                warn!("Skipping corrupt entry {} in {}: {}", name, self.source, e);
                self.skipped += 1;
                continue;
            }
            self.seen += 1;
            let content = String::from_utf8_lossy(&bytes).into_owned();
            return Some(Filing::new(self.source, name, content));
        }
    }
}

fn is_document_name(name: &str) -> bool {
    if name.ends_with('/') {
        return false;
    }
    let lower = name.to_ascii_lowercase();
    DOCUMENT_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Lists the `.zip` bundles directly inside `dir`, sorted by file name.
pub fn archives_in(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut archives = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_zip = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
        if is_zip && path.is_file() {
            archives.push(path);
        }
    }

    if archives.is_empty() {
        return Err(DataError::NoArchives(dir.to_path_buf()));
    }
    archives.sort();
    Ok(archives)
}
