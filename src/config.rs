//! Run configuration.
//!
//! [`CollectOptions`] and [`EncodeOptions`] are builders that carry every
//! recognized setting for the two pipeline stages, plus a progress callback,
//! without polluting every function signature. All fields have defaults and
//! every field can be overridden independently.
//!
//! # Example
//!
//! ```no_run
//! use svg2bas::{BasEncoding, ChunkLimit, EncodeOptions};
//!
//! let options = EncodeOptions::new()
//!     .with_input_dir("./svgjson")
//!     .with_canvas(1920, 1080)
//!     .with_fps(30.0)
//!     .with_chunk_limit(ChunkLimit::Entries(2000))
//!     .with_encoding(BasEncoding::Block);
//! options.validate()?;
//! # Ok::<(), svg2bas::Svg2BasError>(())
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::Svg2BasError;
use crate::progress::{NoOpProgress, ProgressCallback};

/// Frames per JSON batch in frame-folder mode.
pub const DEFAULT_FRAME_BATCH_SIZE: usize = 30;
/// Files per JSON batch in flat-file mode.
pub const DEFAULT_FILE_BATCH_SIZE: usize = 100;

/// How the collector reads the input tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollectLayout {
    /// `<root>/<time>_<seq>/*.svg` folders (or a lone `image_frame/`),
    /// one color-keyed record per SVG file. This is the default.
    #[default]
    Frames,
    /// Every `*.svg` directly under `<root>`, one attribute-mode record per
    /// file.
    Files,
}

/// Which BAS text form the encoder emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BasEncoding {
    /// One `time,layer,size,color,mode,path` line per path. This is the default.
    #[default]
    Flat,
    /// `def path` object blocks with timed visibility directives.
    Block,
}

impl BasEncoding {
    /// Extension of the part files written for this encoding.
    pub fn extension(self) -> &'static str {
        match self {
            BasEncoding::Flat => "txt",
            BasEncoding::Block => "bas",
        }
    }
}

/// When the encoder starts a new output part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkLimit {
    /// Flush once this many entries (lines or blocks) are buffered.
    Entries(usize),
    /// Flush once the buffered text reaches this many characters.
    Chars(usize),
}

impl ChunkLimit {
    fn size(self) -> usize {
        match self {
            ChunkLimit::Entries(n) | ChunkLimit::Chars(n) => n,
        }
    }
}

impl Default for ChunkLimit {
    fn default() -> Self {
        ChunkLimit::Chars(500_000)
    }
}

/// How output parts are named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PartNaming {
    /// `output_part{n}.{txt|bas}`. This is the default.
    #[default]
    Numbered,
    /// `{display time of the first entry}_{n}.txt`.
    Timestamped,
}

/// Configuration for [`collect`](crate::collect).
#[derive(Clone)]
pub struct CollectOptions {
    pub(crate) input_dir: PathBuf,
    pub(crate) output_dir: PathBuf,
    /// 1-based index of the first batch file to write.
    pub(crate) start_index: u64,
    /// `None` uses the layout's default.
    pub(crate) batch_size: Option<usize>,
    pub(crate) layout: CollectLayout,
    /// Width of the color code in frame SVG names (`ff0000.svg` → 6).
    pub(crate) color_code_width: usize,
    /// Folder used when the input holds a single still frame.
    pub(crate) single_frame_dir: String,
    pub(crate) progress: Arc<dyn ProgressCallback>,
}

impl Debug for CollectOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CollectOptions")
            .field("input_dir", &self.input_dir)
            .field("output_dir", &self.output_dir)
            .field("start_index", &self.start_index)
            .field("batch_size", &self.batch_size())
            .field("layout", &self.layout)
            .field("color_code_width", &self.color_code_width)
            .field("single_frame_dir", &self.single_frame_dir)
            .finish_non_exhaustive()
    }
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectOptions {
    /// Defaults: `./video_frames` → `./svgjson`, start index 1, frame
    /// layout with 30 frames per batch, 6-character color codes.
    pub fn new() -> Self {
        Self {
            input_dir: PathBuf::from("./video_frames"),
            output_dir: PathBuf::from("./svgjson"),
            start_index: 1,
            batch_size: None,
            layout: CollectLayout::Frames,
            color_code_width: 6,
            single_frame_dir: "image_frame".to_string(),
            progress: Arc::new(NoOpProgress),
        }
    }

    #[must_use]
    pub fn with_input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.input_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set the 1-based index of the first batch to write.
    ///
    /// Index `n` skips the inputs that batches `1..n` would have held, so a
    /// resumed run writes the same files an uninterrupted run would.
    #[must_use]
    pub fn with_start_index(mut self, index: u64) -> Self {
        self.start_index = index;
        self
    }

    /// Set how many frames (or files) go into one batch.
    #[must_use]
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = Some(size);
        self
    }

    #[must_use]
    pub fn with_layout(mut self, layout: CollectLayout) -> Self {
        self.layout = layout;
        self
    }

    #[must_use]
    pub fn with_color_code_width(mut self, width: usize) -> Self {
        self.color_code_width = width;
        self
    }

    #[must_use]
    pub fn with_single_frame_dir(mut self, name: impl Into<String>) -> Self {
        self.single_frame_dir = name.into();
        self
    }

    /// Attach a progress callback, invoked after every processed unit.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn start_index(&self) -> u64 {
        self.start_index
    }

    pub fn layout(&self) -> CollectLayout {
        self.layout
    }

    /// The effective batch size, falling back to the layout's default.
    pub fn batch_size(&self) -> usize {
        self.batch_size.unwrap_or(match self.layout {
            CollectLayout::Frames => DEFAULT_FRAME_BATCH_SIZE,
            CollectLayout::Files => DEFAULT_FILE_BATCH_SIZE,
        })
    }

    /// Number of input units a resumed run skips.
    pub(crate) fn skip_count(&self) -> usize {
        (self.start_index.saturating_sub(1) as usize).saturating_mul(self.batch_size())
    }

    /// Check the options before any output is written.
    ///
    /// # Errors
    ///
    /// Returns [`Svg2BasError::Configuration`] if a numeric setting is out of
    /// range or the input directory does not exist.
    pub fn validate(&self) -> Result<(), Svg2BasError> {
        if self.start_index == 0 {
            return Err(Svg2BasError::Configuration(
                "start index is 1-based and must be at least 1".to_string(),
            ));
        }
        if self.batch_size() == 0 {
            return Err(Svg2BasError::Configuration(
                "batch size must be greater than zero".to_string(),
            ));
        }
        if self.color_code_width == 0 {
            return Err(Svg2BasError::Configuration(
                "color code width must be greater than zero".to_string(),
            ));
        }
        validate_dirs(&self.input_dir, &self.output_dir)
    }
}

/// Configuration for [`encode`](crate::encode).
#[derive(Clone)]
pub struct EncodeOptions {
    pub(crate) input_dir: PathBuf,
    pub(crate) output_dir: PathBuf,
    pub(crate) canvas_width: u32,
    pub(crate) canvas_height: u32,
    pub(crate) fps: f64,
    pub(crate) chunk_limit: ChunkLimit,
    /// Added to every display time, in milliseconds.
    pub(crate) start_offset_ms: i64,
    pub(crate) encoding: BasEncoding,
    pub(crate) naming: PartNaming,
    pub(crate) progress: Arc<dyn ProgressCallback>,
}

impl Debug for EncodeOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("EncodeOptions")
            .field("input_dir", &self.input_dir)
            .field("output_dir", &self.output_dir)
            .field("canvas_width", &self.canvas_width)
            .field("canvas_height", &self.canvas_height)
            .field("fps", &self.fps)
            .field("chunk_limit", &self.chunk_limit)
            .field("start_offset_ms", &self.start_offset_ms)
            .field("encoding", &self.encoding)
            .field("naming", &self.naming)
            .finish_non_exhaustive()
    }
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl EncodeOptions {
    /// Defaults: `./svgjson` → `./bas_output`, 4000×3620 canvas, 5 fps,
    /// 500 000-character parts, 3000 ms start offset, flat encoding.
    pub fn new() -> Self {
        Self {
            input_dir: PathBuf::from("./svgjson"),
            output_dir: PathBuf::from("./bas_output"),
            canvas_width: 4000,
            canvas_height: 3620,
            fps: 5.0,
            chunk_limit: ChunkLimit::default(),
            start_offset_ms: 3000,
            encoding: BasEncoding::Flat,
            naming: PartNaming::Numbered,
            progress: Arc::new(NoOpProgress),
        }
    }

    #[must_use]
    pub fn with_input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.input_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set the canvas size. The height is the flip axis for path data.
    #[must_use]
    pub fn with_canvas(mut self, width: u32, height: u32) -> Self {
        self.canvas_width = width;
        self.canvas_height = height;
        self
    }

    #[must_use]
    pub fn with_fps(mut self, fps: f64) -> Self {
        self.fps = fps;
        self
    }

    #[must_use]
    pub fn with_chunk_limit(mut self, limit: ChunkLimit) -> Self {
        self.chunk_limit = limit;
        self
    }

    #[must_use]
    pub fn with_start_offset_ms(mut self, offset: i64) -> Self {
        self.start_offset_ms = offset;
        self
    }

    #[must_use]
    pub fn with_encoding(mut self, encoding: BasEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    #[must_use]
    pub fn with_naming(mut self, naming: PartNaming) -> Self {
        self.naming = naming;
        self
    }

    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn canvas_height(&self) -> u32 {
        self.canvas_height
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn encoding(&self) -> BasEncoding {
        self.encoding
    }

    /// Check the options before any output is written.
    ///
    /// # Errors
    ///
    /// Returns [`Svg2BasError::Configuration`] if a numeric setting is out of
    /// range or the input directory does not exist.
    pub fn validate(&self) -> Result<(), Svg2BasError> {
        if !self.fps.is_finite() || self.fps <= 0.0 {
            return Err(Svg2BasError::Configuration(format!(
                "frame rate must be a positive number, got {}",
                self.fps
            )));
        }
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(Svg2BasError::Configuration(format!(
                "canvas must be non-empty, got {}x{}",
                self.canvas_width, self.canvas_height
            )));
        }
        if self.chunk_limit.size() == 0 {
            return Err(Svg2BasError::Configuration(
                "maximum chunk size must be greater than zero".to_string(),
            ));
        }
        validate_dirs(&self.input_dir, &self.output_dir)
    }
}

fn validate_dirs(input_dir: &Path, output_dir: &Path) -> Result<(), Svg2BasError> {
    if output_dir.as_os_str().is_empty() {
        return Err(Svg2BasError::Configuration(
            "output directory must not be empty".to_string(),
        ));
    }
    if !input_dir.is_dir() {
        return Err(Svg2BasError::Configuration(format!(
            "input directory {} does not exist",
            input_dir.display()
        )));
    }
    if output_dir.is_file() {
        return Err(Svg2BasError::Configuration(format!(
            "output path {} is a file",
            output_dir.display()
        )));
    }
    Ok(())
}
