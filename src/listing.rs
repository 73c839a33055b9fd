//! Directory-listing abstraction.
//!
//! The collector only sees the filesystem through [`DirectoryListing`], so
//! frame planning can run against an in-memory snapshot in tests.
//! [`FsListing`] is the real implementation.

use std::{
    fs,
    io::Result as IoResult,
    path::Path,
};

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// File or directory name, not the full path.
    pub name: String,
    /// `true` if the entry is a directory.
    pub is_dir: bool,
}

impl ListingEntry {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
        }
    }

    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
        }
    }
}

/// Read access to a directory tree.
///
/// Implementations may return entries in any order; callers sort.
pub trait DirectoryListing {
    /// List the immediate children of `dir`.
    fn entries(&self, dir: &Path) -> IoResult<Vec<ListingEntry>>;

    /// Read a file as UTF-8 text.
    fn read_to_string(&self, path: &Path) -> IoResult<String>;
}

/// [`DirectoryListing`] backed by the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsListing;

impl DirectoryListing for FsListing {
    fn entries(&self, dir: &Path) -> IoResult<Vec<ListingEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            // Follows symlinks, like a plain `stat`.
            let is_dir = fs::metadata(entry.path())
                .map(|metadata| metadata.is_dir())
                .unwrap_or(false);
            entries.push(ListingEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir,
            });
        }
        Ok(entries)
    }

    fn read_to_string(&self, path: &Path) -> IoResult<String> {
        fs::read_to_string(path)
    }
}
