//! Numbered output files written atomically.
//!
//! [`BatchWriter`] buffers records and writes them as one pretty-printed
//! JSON array per batch. [`write_atomically`] is the shared primitive: the
//! content goes to a temporary file in the destination directory, which is
//! then renamed onto the final name, so a crash never leaves a truncated
//! output file behind.

use std::{
    io::{BufWriter, Result as IoResult, Write},
    path::{Path, PathBuf},
};

use serde::Serialize;
use tempfile::NamedTempFile;

use crate::error::Svg2BasError;

/// How batch files are named.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchNaming {
    /// `{index}.json`, used for frame batches.
    Indexed,
    /// `output_{index}.json`, used for flat-file batches.
    Prefixed,
}

impl BatchNaming {
    pub fn file_name(self, index: u64) -> String {
        match self {
            BatchNaming::Indexed => format!("{index}.json"),
            BatchNaming::Prefixed => format!("output_{index}.json"),
        }
    }
}

/// Mode of finished output files, before the process umask.
#[cfg(unix)]
const OUTPUT_MODE: u32 = 0o644;

// Temporary files default to owner-only; outputs are meant to be shared.
#[cfg(unix)]
fn temporary_in(dir: &Path) -> IoResult<NamedTempFile> {
    use std::{fs::Permissions, os::unix::fs::PermissionsExt};

    tempfile::Builder::new()
        .permissions(Permissions::from_mode(OUTPUT_MODE))
        .tempfile_in(dir)
}

#[cfg(not(unix))]
fn temporary_in(dir: &Path) -> IoResult<NamedTempFile> {
    NamedTempFile::new_in(dir)
}

/// Write a file through a temporary sibling and rename it into place.
///
/// `write` receives a buffered writer over the temporary file. On Unix the
/// finished file gets mode `0o644`, less the umask.
///
/// # Errors
///
/// Returns the error from `write`, an [`Svg2BasError::IoError`] if the
/// temporary file cannot be created or flushed, or
/// [`Svg2BasError::Persist`] if the rename fails. The destination is left
/// untouched in every error case.
pub fn write_atomically<F>(path: &Path, write: F) -> Result<(), Svg2BasError>
where
    F: FnOnce(&mut dyn Write) -> Result<(), Svg2BasError>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let temporary = temporary_in(dir)?;
    {
        let mut writer = BufWriter::new(temporary.as_file());
        write(&mut writer)?;
        writer.flush()?;
    }
    temporary.as_file().sync_all()?;
    temporary
        .persist(path)
        .map_err(|error| Svg2BasError::Persist {
            path: path.to_path_buf(),
            reason: error.error.to_string(),
        })?;
    Ok(())
}

/// Accumulates records and flushes them into numbered JSON files.
///
/// The batch counter starts at the configured start index and advances by
/// one per written file. A failed flush keeps the pending records and the
/// counter unchanged.
#[derive(Debug)]
pub struct BatchWriter<T> {
    output_dir: PathBuf,
    naming: BatchNaming,
    threshold: usize,
    next_index: u64,
    pending: Vec<T>,
    written: Vec<PathBuf>,
}

impl<T: Serialize> BatchWriter<T> {
    /// Create a writer. `threshold` is clamped to a minimum of 1.
    pub fn new(
        output_dir: impl Into<PathBuf>,
        naming: BatchNaming,
        threshold: usize,
        start_index: u64,
    ) -> Self {
        let threshold = threshold.max(1);
        Self {
            output_dir: output_dir.into(),
            naming,
            threshold,
            next_index: start_index,
            pending: Vec::with_capacity(threshold),
            written: Vec::new(),
        }
    }

    pub fn accumulate(&mut self, record: T) {
        self.pending.push(record);
    }

    /// `true` once the pending batch has reached the threshold.
    pub fn should_flush(&self) -> bool {
        self.pending.len() >= self.threshold
    }

    /// Write the pending records as the next numbered file.
    ///
    /// Does nothing and returns `Ok(None)` if nothing is pending.
    ///
    /// # Errors
    ///
    /// Serialization and filesystem errors are returned as-is; the pending
    /// records stay available through [`pending`](BatchWriter::pending).
    pub fn flush(&mut self) -> Result<Option<PathBuf>, Svg2BasError> {
        if self.pending.is_empty() {
            return Ok(None);
        }

        let path = self
            .output_dir
            .join(self.naming.file_name(self.next_index));
        let pending = &self.pending;
        write_atomically(&path, |writer| {
            serde_json::to_writer_pretty(writer, pending)?;
            Ok(())
        })?;

        log::info!("Saved batch {} ({} record(s))", path.display(), self.pending.len());
        self.pending.clear();
        self.next_index += 1;
        self.written.push(path.clone());
        Ok(Some(path))
    }

    /// Flush if the threshold has been reached.
    pub fn flush_if_full(&mut self) -> Result<Option<PathBuf>, Svg2BasError> {
        if self.should_flush() {
            self.flush()
        } else {
            Ok(None)
        }
    }

    /// Flush the final partial batch and return every file written.
    pub fn finish(mut self) -> Result<Vec<PathBuf>, Svg2BasError> {
        self.flush()?;
        Ok(self.written)
    }

    /// Records accumulated since the last successful flush.
    pub fn pending(&self) -> &[T] {
        &self.pending
    }

    /// Index the next flushed file will carry.
    pub fn next_index(&self) -> u64 {
        self.next_index
    }
}
