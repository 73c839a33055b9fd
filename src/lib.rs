//! # svg2bas
//!
//! Turn per-frame SVG folders into BAS danmaku text.
//!
//! The conversion runs in two stages that can be resumed independently:
//!
//! 1. [`collect`] walks a tree of frame folders (`<time>_<seq>/`, one SVG per
//!    color) and writes the path data of every frame into numbered JSON
//!    batches.
//! 2. [`encode`] reads those batches back in order, flips the path data to
//!    the renderer's y axis, and writes BAS text in numbered parts.
//!
//! ## Quick Start
//!
//! ```no_run
//! use svg2bas::{CollectOptions, EncodeOptions};
//!
//! let collected = svg2bas::collect(
//!     &CollectOptions::new()
//!         .with_input_dir("./video_frames")
//!         .with_output_dir("./svgjson"),
//! )?;
//! println!("{} batch file(s)", collected.batches_written.len());
//!
//! let encoded = svg2bas::encode(
//!     &EncodeOptions::new()
//!         .with_input_dir("./svgjson")
//!         .with_output_dir("./bas_output")
//!         .with_canvas(4000, 3620)
//!         .with_fps(5.0),
//! )?;
//! println!("{} part(s)", encoded.parts_written.len());
//! # Ok::<(), svg2bas::Svg2BasError>(())
//! ```
//!
//! ### Resuming
//!
//! Collection output is numbered from a start index. Starting at `n` skips
//! the frames batches `1..n` would have held, so a resumed run rewrites
//! exactly the files an uninterrupted run would have written from `n` on.
//!
//! ```no_run
//! use svg2bas::CollectOptions;
//!
//! let summary = svg2bas::collect(&CollectOptions::new().with_start_index(4))?;
//! # Ok::<(), svg2bas::Svg2BasError>(())
//! ```
//!
//! ## Failure handling
//!
//! A malformed or unreadable SVG never stops a run: its geometry is written
//! as `null` and the file is listed in [`CollectSummary::degraded`]. Write
//! failures, undecodable batches and invalid options end the run with an
//! [`Svg2BasError`]. Every output file is written to a temporary file first
//! and renamed into place, so files from an interrupted run are either
//! complete or absent.

pub mod bas;
pub mod batch;
pub mod collect;
pub mod collector;
pub mod config;
pub mod error;
pub mod flip;
pub mod listing;
pub mod progress;
pub mod record;
pub mod svg;
pub mod validation;

pub use bas::{BasEncoder, EncodeState, EncodeSummary, encode};
pub use batch::{BatchNaming, BatchWriter};
pub use collect::{CollectSummary, collect, collect_with};
pub use collector::{FrameLayout, FramePlan, plan_files, plan_frames};
pub use config::{BasEncoding, ChunkLimit, CollectLayout, CollectOptions, EncodeOptions, PartNaming};
pub use error::Svg2BasError;
pub use flip::flip_y;
pub use listing::{DirectoryListing, FsListing, ListingEntry};
pub use progress::{OperationType, ProgressCallback, ProgressInfo};
pub use record::{BatchEntry, ColorPath, FileRecord, FrameData, FrameUnit, PathAttributes};
pub use svg::{ExtractionMode, extract_file};
pub use validation::{ValidationReport, validate_input};
