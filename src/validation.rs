//! Input tree validation.
//!
//! [`validate_input`] walks an input tree the way a collection run would,
//! without writing anything, and returns a [`ValidationReport`] describing
//! its structure and any files a run would skip or degrade.
//!
//! # Example
//!
//! ```no_run
//! use svg2bas::{CollectOptions, FsListing};
//!
//! let options = CollectOptions::new().with_input_dir("./video_frames");
//! let report = svg2bas::validate_input(&FsListing, &options);
//! if report.is_valid() {
//!     println!("Input is valid");
//! } else {
//!     for error in &report.errors {
//!         println!("Error: {error}");
//!     }
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::{
    collector::{is_frame_svg, parse_frame_folder, plan_files, plan_frames},
    config::{CollectLayout, CollectOptions},
    listing::DirectoryListing,
    svg::parse_paths,
};

/// Summary of input validation.
///
/// Contains lists of informational notices, warnings, and errors.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Informational notices (not problems).
    pub info: Vec<String>,
    /// Files or folders a run would skip or degrade.
    pub warnings: Vec<String>,
    /// Problems that stop a run.
    pub errors: Vec<String>,
}

impl ValidationReport {
    /// Returns `true` if no errors were found.
    ///
    /// Warnings do not affect this result; only errors make the report
    /// invalid.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Total number of issues (info + warnings + errors).
    pub fn issue_count(&self) -> usize {
        self.info.len() + self.warnings.len() + self.errors.len()
    }
}

impl Display for ValidationReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for item in &self.info {
            writeln!(f, "[INFO] {item}")?;
        }
        for item in &self.warnings {
            writeln!(f, "[WARN] {item}")?;
        }
        for item in &self.errors {
            writeln!(f, "[ERROR] {item}")?;
        }
        if self.issue_count() == 0 {
            writeln!(f, "No issues found.")?;
        }
        Ok(())
    }
}

/// Inspect the input tree of `options` without writing anything.
///
/// Every SVG a run would read is parsed; malformed ones are reported as
/// warnings since a run would keep going without their geometry.
pub fn validate_input<L>(listing: &L, options: &CollectOptions) -> ValidationReport
where
    L: DirectoryListing + ?Sized,
{
    let mut report = ValidationReport::default();

    let sources = match options.layout() {
        CollectLayout::Frames => match plan_frames(listing, options) {
            Ok(plan) => {
                report.info.push(format!(
                    "{:?} layout: {} frame folder(s), {} to process",
                    plan.layout,
                    plan.discovered,
                    plan.frames.len()
                ));
                check_frame_folders(listing, options, &mut report);
                for unit in &plan.frames {
                    if unit.source_paths.is_empty() {
                        report
                            .warnings
                            .push(format!("Frame folder {} has no color SVGs", unit.name));
                    }
                }
                plan.frames
                    .into_iter()
                    .flat_map(|unit| unit.source_paths)
                    .collect()
            }
            Err(error) => {
                report.errors.push(error.to_string());
                return report;
            }
        },
        CollectLayout::Files => match plan_files(listing, options) {
            Ok(files) => {
                report
                    .info
                    .push(format!("{} SVG file(s) to process", files.len()));
                files
            }
            Err(error) => {
                report.errors.push(error.to_string());
                return report;
            }
        },
    };

    for path in &sources {
        let result = listing
            .read_to_string(path)
            .map_err(|error| error.to_string())
            .and_then(|text| parse_paths(&text).map_err(|error| error.to_string()));
        match result {
            Ok(paths) if paths.iter().all(|path| path.d.is_none()) => report
                .warnings
                .push(format!("{} has no path data", path.display())),
            Ok(_) => {}
            Err(reason) => report
                .warnings
                .push(format!("{} is unreadable: {reason}", path.display())),
        }
    }

    report
}

// Stray files inside frame folders and folders that share a sequence number.
fn check_frame_folders<L>(listing: &L, options: &CollectOptions, report: &mut ValidationReport)
where
    L: DirectoryListing + ?Sized,
{
    let root = options.input_dir();
    let Ok(entries) = listing.entries(root) else {
        return;
    };

    let mut by_sequence: BTreeMap<u64, Vec<String>> = BTreeMap::new();
    for entry in entries.iter().filter(|entry| entry.is_dir) {
        let Some((_, sequence)) = parse_frame_folder(&entry.name) else {
            if entry.name != options.single_frame_dir {
                report
                    .info
                    .push(format!("Ignoring folder {}", entry.name));
            }
            continue;
        };
        by_sequence
            .entry(sequence)
            .or_default()
            .push(entry.name.clone());

        let Ok(files) = listing.entries(&root.join(&entry.name)) else {
            continue;
        };
        for file in files.iter().filter(|file| !file.is_dir) {
            if file.name.ends_with(".svg") && !is_frame_svg(&file.name, options.color_code_width) {
                report.warnings.push(format!(
                    "Ignoring {}/{}: color code is not {} characters",
                    entry.name, file.name, options.color_code_width
                ));
            }
        }
    }

    for (sequence, mut names) in by_sequence {
        if names.len() > 1 {
            names.sort();
            report.warnings.push(format!(
                "Sequence number {sequence} is shared by {}",
                names.join(", ")
            ));
        }
    }
}
