//! Output files that only appear once complete.
//!
//! Bytes go to a temporary file in the destination's directory. Committing
//! renames it over the destination; dropping it uncommitted deletes it. A
//! run that stops on an error therefore leaves no partial dataset behind,
//! and any earlier output at the path stays as it was.

use crate::error::Result;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// A destination file being written.
#[derive(Debug)]
pub struct StagedFile {
    file: NamedTempFile,
    target: PathBuf,
}

impl StagedFile {
    /// Starts a new file that will replace `path` on commit.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let target = path.as_ref().to_path_buf();
        let dir = target
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let file = NamedTempFile::new_in(dir)?;
        Ok(Self { file, target })
    }

    /// The path the file will be committed to.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Flushes and moves the file into place.
    pub fn commit(mut self) -> Result<()> {
        self.file.flush()?;
        self.file.persist(&self.target).map_err(|e| e.error)?;
        debug!("Committed {}", self.target.display());
        Ok(())
    }
}

impl Write for StagedFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}
