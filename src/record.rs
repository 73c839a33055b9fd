//! Records passed between the pipeline stages.
//!
//! [`FrameUnit`] is produced by the collector and consumed once by the
//! extractor. [`FrameData`] and [`FileRecord`] are what the batch writer
//! serializes, and [`BatchEntry`] is what the encoder reads back.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One frame's worth of source SVG files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameUnit {
    /// Frame index written to the JSON batch (first integer of the folder
    /// name, or 0 in single-frame mode).
    pub frame_index: u64,
    /// Sort key (second integer of the folder name, or 0).
    pub sequence: u64,
    /// Folder name the unit was discovered under.
    pub name: String,
    /// SVG files of the frame, in lexical filename order.
    pub source_paths: Vec<PathBuf>,
}

/// All paths of one color-coded SVG file, joined into a single string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorPath {
    /// Color code taken from the filename (extension stripped).
    pub color: String,
    /// Space-joined `d` attributes, or `null` if the file could not be read.
    pub pathdata: Option<String>,
}

/// The attributes of one `<path>` element.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PathAttributes {
    /// The `d` attribute. `None` when absent or blank.
    pub d: Option<String>,
    /// The `fill` attribute, if present.
    pub fill: Option<String>,
}

/// One frame written into a JSON batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameData {
    #[serde(rename = "frameIndex")]
    pub frame_index: u64,
    pub data: Vec<ColorPath>,
}

/// One SVG file written into a flat-file JSON batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// File name (without extension) the paths came from.
    pub file: String,
    pub paths: Vec<PathAttributes>,
}

/// Either batch shape, as read back by the encoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchEntry {
    Frame(FrameData),
    File(FileRecord),
}

/// A path ready for encoding: geometry plus the color it should be drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EncodablePath<'a> {
    pub(crate) d: &'a str,
    pub(crate) color: Option<&'a str>,
}

impl BatchEntry {
    /// The paths of this frame in order, and how many entries had no
    /// geometry to encode.
    pub(crate) fn encodable_paths(&self) -> (Vec<EncodablePath<'_>>, usize) {
        let mut paths = Vec::new();
        let mut skipped = 0;
        match self {
            BatchEntry::Frame(frame) => {
                for record in &frame.data {
                    match record.pathdata.as_deref().filter(|d| !d.trim().is_empty()) {
                        Some(d) => paths.push(EncodablePath {
                            d,
                            color: Some(&record.color),
                        }),
                        None => skipped += 1,
                    }
                }
            }
            BatchEntry::File(file) => {
                for attributes in &file.paths {
                    match attributes.d.as_deref() {
                        Some(d) => paths.push(EncodablePath {
                            d,
                            color: attributes.fill.as_deref(),
                        }),
                        None => skipped += 1,
                    }
                }
            }
        }
        (paths, skipped)
    }
}
