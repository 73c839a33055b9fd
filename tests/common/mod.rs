//! Fixture helpers shared by the integration tests.

#![allow(dead_code)]

use std::{
    collections::BTreeMap,
    fs,
    io::{Error as IoError, ErrorKind, Result as IoResult},
    path::{Path, PathBuf},
};

use svg2bas::{DirectoryListing, ListingEntry};

/// An SVG document holding one `<path>` per entry of `paths`.
pub fn svg(paths: &[&str]) -> String {
    let body: String = paths
        .iter()
        .map(|d| format!("  <path d=\"{d}\"/>\n"))
        .collect();
    format!(
        "<?xml version=\"1.0\" standalone=\"no\"?>\n\
         <svg xmlns=\"http://www.w3.org/2000/svg\" width=\"100\" height=\"100\">\n\
         {body}</svg>\n"
    )
}

/// Write `text` to `root/relative`, creating parent folders.
pub fn write(root: &Path, relative: &str, text: &str) -> PathBuf {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, text).unwrap();
    path
}

/// Create `count` frame folders `0_1 .. {count-1}_{count}`, each with one
/// red SVG whose path encodes the frame number.
pub fn frame_tree(root: &Path, count: u64) {
    for frame in 0..count {
        write(
            root,
            &format!("{frame}_{}/ff0000.svg", frame + 1),
            &svg(&[&format!("M{frame} {frame}")]),
        );
    }
}

/// Parse a JSON batch file into a generic value.
pub fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

/// Sorted names of the files in `dir`.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// In-memory directory snapshot for planning tests.
///
/// Paths are stored with `/` separators relative to an arbitrary root.
#[derive(Debug, Default)]
pub struct MemoryListing {
    files: BTreeMap<PathBuf, String>,
}

impl MemoryListing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, text: &str) -> Self {
        self.files.insert(PathBuf::from(path), text.to_string());
        self
    }
}

impl DirectoryListing for MemoryListing {
    fn entries(&self, dir: &Path) -> IoResult<Vec<ListingEntry>> {
        let mut entries: Vec<ListingEntry> = Vec::new();
        for path in self.files.keys() {
            let Ok(rest) = path.strip_prefix(dir) else {
                continue;
            };
            let mut components = rest.components();
            let Some(first) = components.next() else {
                continue;
            };
            let name = first.as_os_str().to_string_lossy().into_owned();
            let is_dir = components.next().is_some();
            if !entries.iter().any(|entry| entry.name == name) {
                entries.push(ListingEntry { name, is_dir });
            }
        }
        if entries.is_empty() {
            return Err(IoError::new(ErrorKind::NotFound, "no such directory"));
        }
        // Reverse order, so callers cannot rely on listing order.
        entries.reverse();
        Ok(entries)
    }

    fn read_to_string(&self, path: &Path) -> IoResult<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| IoError::new(ErrorKind::NotFound, "no such file"))
    }
}
