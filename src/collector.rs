//! Frame discovery and ordering.
//!
//! [`plan_frames`] turns a directory listing into an ordered list of
//! [`FrameUnit`]s. It only touches the tree through [`DirectoryListing`], so
//! the same listing always yields the same plan.
//!
//! Two layouts are recognized:
//!
//! - **multi-frame**: folders named `<time>_<seq>`, ordered numerically by
//!   `seq` (so `1_2` comes before `1_10`);
//! - **single-frame**: no such folders, but an `image_frame/` folder whose
//!   SVGs form the only frame, with index 0.

use std::{
    cmp::Ordering,
    path::{Path, PathBuf},
};

use crate::{
    config::CollectOptions,
    error::Svg2BasError,
    listing::DirectoryListing,
    record::FrameUnit,
};

/// Which layout the input tree was recognized as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameLayout {
    SingleFrame,
    MultiFrame,
}

/// The ordered frames a collection run will process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramePlan {
    pub layout: FrameLayout,
    /// Frame folders found before the resume skip was applied.
    pub discovered: usize,
    /// Frames left to process, in output order.
    pub frames: Vec<FrameUnit>,
}

/// Parse a `<time>_<seq>` folder name.
pub fn parse_frame_folder(name: &str) -> Option<(u64, u64)> {
    let (time, sequence) = name.split_once('_')?;
    let is_number = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    if !is_number(time) || !is_number(sequence) {
        return None;
    }
    Some((time.parse().ok()?, sequence.parse().ok()?))
}

/// Whether `name` is a frame SVG: `.svg` extension and a color code of
/// exactly `color_code_width` characters.
pub fn is_frame_svg(name: &str, color_code_width: usize) -> bool {
    name.ends_with(".svg") && name.len() == color_code_width + ".svg".len()
}

/// List the frame SVGs of one folder in lexical order.
pub fn frame_svgs<L>(
    listing: &L,
    folder: &Path,
    color_code_width: usize,
) -> Result<Vec<PathBuf>, Svg2BasError>
where
    L: DirectoryListing + ?Sized,
{
    let mut names: Vec<String> = listing
        .entries(folder)?
        .into_iter()
        .filter(|entry| !entry.is_dir && is_frame_svg(&entry.name, color_code_width))
        .map(|entry| entry.name)
        .collect();
    names.sort();
    Ok(names.into_iter().map(|name| folder.join(name)).collect())
}

/// Discover and order the frames under `options.input_dir()`.
///
/// # Errors
///
/// - [`Svg2BasError::NoInput`] if the root holds neither frame folders nor
///   the single-frame folder.
/// - [`Svg2BasError::StartIndexOutOfRange`] if the resume skip passes every
///   frame folder.
/// - [`Svg2BasError::IoError`] if a directory cannot be listed.
pub fn plan_frames<L>(listing: &L, options: &CollectOptions) -> Result<FramePlan, Svg2BasError>
where
    L: DirectoryListing + ?Sized,
{
    let root = options.input_dir();
    let entries = listing.entries(root)?;

    let mut folders: Vec<(u64, u64, String)> = entries
        .iter()
        .filter(|entry| entry.is_dir)
        .filter_map(|entry| {
            parse_frame_folder(&entry.name).map(|(time, seq)| (time, seq, entry.name.clone()))
        })
        .collect();

    if folders.is_empty() {
        let has_single = entries
            .iter()
            .any(|entry| entry.is_dir && entry.name == options.single_frame_dir);
        if !has_single {
            return Err(Svg2BasError::NoInput {
                path: root.to_path_buf(),
                reason: format!(
                    "no <time>_<seq> frame folders and no {} folder",
                    options.single_frame_dir
                ),
            });
        }

        // The lone frame always lands in batch 1.
        if options.skip_count() >= 1 {
            return Err(Svg2BasError::StartIndexOutOfRange {
                start_index: options.start_index(),
                available: 1,
            });
        }

        let folder = root.join(&options.single_frame_dir);
        log::debug!("Single-frame layout: {}", folder.display());
        let source_paths = frame_svgs(listing, &folder, options.color_code_width)?;
        return Ok(FramePlan {
            layout: FrameLayout::SingleFrame,
            discovered: 1,
            frames: vec![FrameUnit {
                frame_index: 0,
                sequence: 0,
                name: options.single_frame_dir.clone(),
                source_paths,
            }],
        });
    }

    folders.sort_by(compare_folders);
    let discovered = folders.len();
    let skip = options.skip_count();
    if skip >= discovered {
        return Err(Svg2BasError::StartIndexOutOfRange {
            start_index: options.start_index(),
            available: discovered,
        });
    }

    log::debug!(
        "Multi-frame layout: {} folder(s), skipping {}",
        discovered,
        skip
    );

    let frames = folders
        .into_iter()
        .skip(skip)
        .map(|(time, sequence, name)| {
            let folder = root.join(&name);
            let source_paths = frame_svgs(listing, &folder, options.color_code_width)?;
            Ok(FrameUnit {
                frame_index: time,
                sequence,
                name,
                source_paths,
            })
        })
        .collect::<Result<Vec<_>, Svg2BasError>>()?;

    Ok(FramePlan {
        layout: FrameLayout::MultiFrame,
        discovered,
        frames,
    })
}

/// List every SVG directly under `options.input_dir()` in lexical order,
/// after the resume skip.
///
/// # Errors
///
/// Same as [`plan_frames`].
pub fn plan_files<L>(listing: &L, options: &CollectOptions) -> Result<Vec<PathBuf>, Svg2BasError>
where
    L: DirectoryListing + ?Sized,
{
    let root = options.input_dir();
    let mut names: Vec<String> = listing
        .entries(root)?
        .into_iter()
        .filter(|entry| !entry.is_dir && entry.name.ends_with(".svg"))
        .map(|entry| entry.name)
        .collect();

    if names.is_empty() {
        return Err(Svg2BasError::NoInput {
            path: root.to_path_buf(),
            reason: "no .svg files".to_string(),
        });
    }
    names.sort();

    let available = names.len();
    let skip = options.skip_count();
    if skip >= available {
        return Err(Svg2BasError::StartIndexOutOfRange {
            start_index: options.start_index(),
            available,
        });
    }

    Ok(names
        .into_iter()
        .skip(skip)
        .map(|name| root.join(name))
        .collect())
}

// Sequence first; time and name only break ties so the order stays total.
fn compare_folders(a: &(u64, u64, String), b: &(u64, u64, String)) -> Ordering {
    a.1.cmp(&b.1)
        .then_with(|| a.0.cmp(&b.0))
        .then_with(|| a.2.cmp(&b.2))
}
