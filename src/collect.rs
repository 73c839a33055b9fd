//! Stage one: SVG frames to JSON batches.
//!
//! [`collect`] runs the collector, the extractor and the batch writer over
//! the real filesystem; [`collect_with`] does the same over any
//! [`DirectoryListing`].

use std::path::PathBuf;

use crate::{
    batch::{BatchNaming, BatchWriter},
    collector::{FrameLayout, plan_files, plan_frames},
    config::{CollectLayout, CollectOptions},
    error::Svg2BasError,
    listing::{DirectoryListing, FsListing},
    progress::{OperationType, ProgressTracker},
    record::{FileRecord, FrameData},
    svg::{ExtractedPaths, ExtractionMode, extract_file, identifier_for},
};

/// Outcome of a collection run.
#[derive(Debug, Clone, Default)]
pub struct CollectSummary {
    /// Set for frame-folder runs.
    pub layout: Option<FrameLayout>,
    /// Frames (or flat files) written.
    pub units: u64,
    /// SVG files read.
    pub files_read: u64,
    /// Files whose geometry was dropped because they could not be read or
    /// parsed.
    pub degraded: Vec<PathBuf>,
    /// Batch files in the order they were written.
    pub batches_written: Vec<PathBuf>,
    pub output_dir: PathBuf,
}

/// Convert the SVG tree under `options.input_dir()` into JSON batches.
///
/// # Errors
///
/// See [`collect_with`].
pub fn collect(options: &CollectOptions) -> Result<CollectSummary, Svg2BasError> {
    options.validate()?;
    std::fs::create_dir_all(options.output_dir())?;
    collect_with(&FsListing, options)
}

/// Like [`collect`], reading the input through `listing`.
///
/// The output directory must already exist; options are not re-validated.
///
/// # Errors
///
/// Returns [`Svg2BasError::NoInput`] or
/// [`Svg2BasError::StartIndexOutOfRange`] if there is nothing to do, and
/// I/O or serialization errors from writing batches. Unreadable or
/// malformed SVG files are not errors; they are listed in
/// [`CollectSummary::degraded`].
pub fn collect_with<L>(
    listing: &L,
    options: &CollectOptions,
) -> Result<CollectSummary, Svg2BasError>
where
    L: DirectoryListing + ?Sized,
{
    match options.layout() {
        CollectLayout::Frames => collect_frames(listing, options),
        CollectLayout::Files => collect_files(listing, options),
    }
}

fn collect_frames<L>(listing: &L, options: &CollectOptions) -> Result<CollectSummary, Svg2BasError>
where
    L: DirectoryListing + ?Sized,
{
    let plan = plan_frames(listing, options)?;
    log::info!(
        "Collecting {} frame(s) from {}",
        plan.frames.len(),
        options.input_dir().display()
    );

    let mut summary = CollectSummary {
        layout: Some(plan.layout),
        output_dir: options.output_dir().to_path_buf(),
        ..CollectSummary::default()
    };
    let mut tracker = ProgressTracker::new(
        options.progress.clone(),
        OperationType::Collection,
        Some(plan.frames.len() as u64),
    );
    let mut writer = BatchWriter::new(
        options.output_dir(),
        BatchNaming::Indexed,
        options.batch_size(),
        options.start_index(),
    );

    for unit in &plan.frames {
        let mut frame = FrameData {
            frame_index: unit.frame_index,
            data: Vec::with_capacity(unit.source_paths.len()),
        };

        for path in &unit.source_paths {
            let extraction = extract_file(listing, path, ExtractionMode::ColorKeyed);
            summary.files_read += 1;
            if extraction.is_degraded() {
                tracker.mark_degraded();
                summary.degraded.push(path.clone());
            }
            if let ExtractedPaths::Color(record) = extraction.paths {
                frame.data.push(record);
            }
        }

        writer.accumulate(frame);
        summary.units += 1;
        tracker.advance(&unit.name);
        writer.flush_if_full()?;
    }

    summary.batches_written = writer.finish()?;
    tracker.finish();
    Ok(summary)
}

fn collect_files<L>(listing: &L, options: &CollectOptions) -> Result<CollectSummary, Svg2BasError>
where
    L: DirectoryListing + ?Sized,
{
    let files = plan_files(listing, options)?;
    log::info!(
        "Collecting {} file(s) from {}",
        files.len(),
        options.input_dir().display()
    );

    let mut summary = CollectSummary {
        output_dir: options.output_dir().to_path_buf(),
        ..CollectSummary::default()
    };
    let mut tracker = ProgressTracker::new(
        options.progress.clone(),
        OperationType::Collection,
        Some(files.len() as u64),
    );
    let mut writer = BatchWriter::new(
        options.output_dir(),
        BatchNaming::Prefixed,
        options.batch_size(),
        options.start_index(),
    );

    for path in &files {
        let extraction = extract_file(listing, path, ExtractionMode::Attributes);
        summary.files_read += 1;
        if extraction.is_degraded() {
            tracker.mark_degraded();
            summary.degraded.push(path.clone());
        }
        let paths = match extraction.paths {
            ExtractedPaths::Attributes(paths) => paths,
            ExtractedPaths::Color(_) => Vec::new(),
        };

        let file = identifier_for(path);
        tracker.advance(&file);
        writer.accumulate(FileRecord { file, paths });
        summary.units += 1;
        writer.flush_if_full()?;
    }

    summary.batches_written = writer.finish()?;
    tracker.finish();
    Ok(summary)
}
