//! Error types for the `svg2bas` crate.
//!
//! This module defines [`Svg2BasError`], the unified error type returned by
//! all fallible operations in the crate. Per-file problems (a malformed SVG,
//! an unreadable input) are recovered inside a run and only surface through
//! run summaries; everything returned as an `Err` ends the run.

use std::{io::Error as IoError, path::PathBuf};

use serde_json::Error as JsonError;
use thiserror::Error;

/// The unified error type for all `svg2bas` operations.
///
/// Variants carry enough context to diagnose the problem without needing
/// additional logging at the call site.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Svg2BasError {
    /// The supplied options are invalid. Raised before any I/O happens.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The input directory contains nothing that can be processed.
    #[error("No input found in {path}: {reason}")]
    NoInput {
        /// Directory that was scanned.
        path: PathBuf,
        /// What was missing.
        reason: String,
    },

    /// The requested start index skips past every available input unit.
    #[error("Start index {start_index} is out of range ({available} input units available)")]
    StartIndexOutOfRange {
        /// The 1-based start index that was requested.
        start_index: u64,
        /// Number of units found before skipping.
        available: usize,
    },

    /// An SVG document could not be read or parsed.
    ///
    /// Collection runs recover from this locally; the variant exists so the
    /// failure can be reported with its path.
    #[error("Failed to parse {path}: {reason}")]
    Parse {
        /// The offending file.
        path: PathBuf,
        /// Underlying reason.
        reason: String,
    },

    /// An intermediate JSON batch could not be decoded.
    #[error("Failed to decode batch {path}: {reason}")]
    Decode {
        /// The offending batch file.
        path: PathBuf,
        /// Underlying reason.
        reason: String,
    },

    /// A finished output file could not be moved into place.
    #[error("Failed to persist {path}: {reason}")]
    Persist {
        /// Final destination of the output file.
        path: PathBuf,
        /// Underlying reason.
        reason: String,
    },

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// Serialization of an output batch failed.
    #[error("JSON error: {0}")]
    JsonError(#[from] JsonError),
}

impl Svg2BasError {
    /// Returns `true` for the "nothing to do" outcomes, as opposed to
    /// failures of a run that had work to do.
    pub fn is_no_input(&self) -> bool {
        matches!(
            self,
            Svg2BasError::NoInput { .. } | Svg2BasError::StartIndexOutOfRange { .. }
        )
    }
}
