//! Stage two: JSON batches to BAS text.
//!
//! [`encode`] reads the batch files of a directory in numeric order and
//! feeds their frames to a [`BasEncoder`]. The encoder numbers frames with a
//! running counter that continues across batch files, turns each path into
//! a flat danmaku line or a `def path` block, and writes the result in
//! numbered parts.
//!
//! # Example
//!
//! ```no_run
//! use svg2bas::{BasEncoding, EncodeOptions, Svg2BasError};
//!
//! let options = EncodeOptions::new()
//!     .with_input_dir("./svgjson")
//!     .with_output_dir("./bas_output")
//!     .with_encoding(BasEncoding::Block);
//! let summary = svg2bas::encode(&options)?;
//! println!("{} frame(s), {} part(s)", summary.frames, summary.parts_written.len());
//! # Ok::<(), Svg2BasError>(())
//! ```

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use crate::{
    batch::write_atomically,
    config::{BasEncoding, ChunkLimit, EncodeOptions, PartNaming},
    error::Svg2BasError,
    flip::flip_y,
    progress::{OperationType, ProgressTracker},
    record::{BatchEntry, EncodablePath},
};

/// White, the color of every flat-mode line.
pub const FLAT_COLOR: u32 = 0xFF_FFFF;

/// Millisecond timestamp at which frame `frame_number` is shown.
///
/// `start_offset_ms + round(frame_number / fps * 1000)`.
pub fn display_time(frame_number: u64, fps: f64, start_offset_ms: i64) -> i64 {
    start_offset_ms + (frame_number as f64 / fps * 1000.0).round() as i64
}

/// How long one frame stays visible, in milliseconds (at least 1).
pub fn frame_duration(fps: f64) -> i64 {
    ((1000.0 / fps).round() as i64).max(1)
}

/// Parse a color code (`ff0000`, `#ff0000`, `#f00`, or `ff0000aa`) into
/// `0xRRGGBB`. Anything else is white.
pub fn parse_color(code: Option<&str>) -> u32 {
    let Some(code) = code else {
        return FLAT_COLOR;
    };
    let hex = code.trim().trim_start_matches('#');
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return FLAT_COLOR;
    }
    let rgb = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect::<String>(),
        6 => hex.to_string(),
        8 => hex[..6].to_string(),
        _ => return FLAT_COLOR,
    };
    u32::from_str_radix(&rgb, 16).unwrap_or(FLAT_COLOR)
}

/// One flat danmaku line.
pub fn flat_line(time: i64, flipped_path: &str) -> String {
    format!("{time},0,25,{FLAT_COLOR},baseline,{flipped_path}")
}

/// Geometry of one block-mode object.
#[derive(Debug, Clone, Copy)]
pub struct BlockObject<'a> {
    pub name: &'a str,
    pub flipped_path: &'a str,
    pub color: u32,
    pub canvas_width: u32,
    pub canvas_height: u32,
}

/// Escape `\` and `"` for a double-quoted BAS string.
fn quoted(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '"' || c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// A `def path` block followed by its visibility directives: hidden until
/// `time`, visible for `duration` milliseconds, hidden again.
pub fn block(object: &BlockObject<'_>, time: i64, duration: i64) -> String {
    let BlockObject {
        name,
        flipped_path,
        color,
        canvas_width,
        canvas_height,
    } = *object;
    let d = quoted(flipped_path);
    format!(
        "def path {name} {{\n    \
         d = \"{d}\"\n    \
         viewBox = \"0 0 {canvas_width} {canvas_height}\"\n    \
         fillColor = 0x{color:06x}\n    \
         alpha = 0\n\
         }}\n\
         set {name} {{ alpha = 0 }} {time}ms\n\
         then set {name} {{ alpha = 1 }} 0ms\n\
         then set {name} {{}} {duration}ms\n\
         then set {name} {{ alpha = 0 }} 0ms"
    )
}

/// Counters threaded through an encoding run.
///
/// Both only ever increase. Passing a saved state to
/// [`BasEncoder::with_state`] continues numbering where a previous run
/// stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeState {
    /// Number of the next frame, counted across every batch file.
    pub frame_counter: u64,
    /// Number of the next output part, starting at 1.
    pub next_part: u64,
}

impl Default for EncodeState {
    fn default() -> Self {
        Self {
            frame_counter: 0,
            next_part: 1,
        }
    }
}

/// Outcome of an encoding run.
#[derive(Debug, Clone, Default)]
pub struct EncodeSummary {
    pub batches_read: u64,
    pub frames: u64,
    /// Paths written as lines or blocks.
    pub paths: u64,
    /// Records without geometry (`null` path data or missing `d`).
    pub skipped: u64,
    pub parts_written: Vec<PathBuf>,
    pub output_dir: PathBuf,
    /// Counters after the run.
    pub state: EncodeState,
}

/// Turns frames into BAS text and writes it in numbered parts.
#[derive(Debug)]
pub struct BasEncoder {
    options: EncodeOptions,
    state: EncodeState,
    buffer: String,
    buffered_entries: usize,
    buffered_chars: usize,
    chunk_time: Option<i64>,
    summary: EncodeSummary,
}

impl BasEncoder {
    pub fn new(options: &EncodeOptions) -> Self {
        Self::with_state(options, EncodeState::default())
    }

    pub fn with_state(options: &EncodeOptions, state: EncodeState) -> Self {
        Self {
            options: options.clone(),
            state,
            buffer: String::new(),
            buffered_entries: 0,
            buffered_chars: 0,
            chunk_time: None,
            summary: EncodeSummary {
                output_dir: options.output_dir.clone(),
                ..EncodeSummary::default()
            },
        }
    }

    pub fn state(&self) -> EncodeState {
        self.state
    }

    /// Encode the frames of one batch, in order.
    ///
    /// # Errors
    ///
    /// Returns write errors for any part flushed along the way.
    pub fn encode_batch(&mut self, entries: &[BatchEntry]) -> Result<(), Svg2BasError> {
        for entry in entries {
            self.encode_frame(entry)?;
        }
        self.summary.batches_read += 1;
        Ok(())
    }

    /// Encode one frame and advance the frame counter.
    ///
    /// # Errors
    ///
    /// Returns write errors for any part flushed along the way.
    pub fn encode_frame(&mut self, entry: &BatchEntry) -> Result<(), Svg2BasError> {
        let frame_number = self.state.frame_counter;
        let time = display_time(frame_number, self.options.fps, self.options.start_offset_ms);
        let (paths, skipped) = entry.encodable_paths();
        self.summary.skipped += skipped as u64;

        for (index, path) in paths.iter().enumerate() {
            let text = self.render(frame_number, index, path, time);
            self.push(text, time)?;
            self.summary.paths += 1;
        }

        self.state.frame_counter += 1;
        self.summary.frames += 1;
        Ok(())
    }

    fn render(&self, frame_number: u64, index: usize, path: &EncodablePath<'_>, time: i64) -> String {
        let flipped = flip_y(path.d, self.options.canvas_height);
        match self.options.encoding {
            BasEncoding::Flat => flat_line(time, &flipped),
            BasEncoding::Block => {
                let name = format!("f{frame_number}_{index}");
                let object = BlockObject {
                    name: &name,
                    flipped_path: &flipped,
                    color: parse_color(path.color),
                    canvas_width: self.options.canvas_width,
                    canvas_height: self.options.canvas_height,
                };
                block(&object, time, frame_duration(self.options.fps))
            }
        }
    }

    fn separator(&self) -> &'static str {
        match self.options.encoding {
            BasEncoding::Flat => "\n",
            BasEncoding::Block => "\n\n",
        }
    }

    fn push(&mut self, text: String, time: i64) -> Result<(), Svg2BasError> {
        if self.buffered_entries > 0 {
            let separator = self.separator();
            self.buffer.push_str(separator);
            self.buffered_chars += separator.len();
        }
        self.buffered_chars += text.chars().count();
        self.buffer.push_str(&text);
        self.buffered_entries += 1;
        self.chunk_time.get_or_insert(time);

        let full = match self.options.chunk_limit {
            ChunkLimit::Entries(limit) => self.buffered_entries >= limit,
            ChunkLimit::Chars(limit) => self.buffered_chars >= limit,
        };
        if full {
            self.flush()?;
        }
        Ok(())
    }

    fn part_path(&self) -> PathBuf {
        let part = self.state.next_part;
        let name = match self.options.naming {
            PartNaming::Numbered => {
                format!("output_part{part}.{}", self.options.encoding.extension())
            }
            PartNaming::Timestamped => {
                format!("{}_{part}.txt", self.chunk_time.unwrap_or_default())
            }
        };
        self.options.output_dir.join(name)
    }

    /// Write the buffered entries as the next part. No-op when empty.
    fn flush(&mut self) -> Result<(), Svg2BasError> {
        if self.buffered_entries == 0 {
            return Ok(());
        }

        let path = self.part_path();
        let content = &self.buffer;
        write_atomically(&path, |writer| {
            writer.write_all(content.as_bytes())?;
            writer.write_all(b"\n")?;
            Ok(())
        })?;
        log::info!(
            "Wrote {} ({} entries, {} chars)",
            path.display(),
            self.buffered_entries,
            self.buffered_chars
        );

        self.buffer.clear();
        self.buffered_entries = 0;
        self.buffered_chars = 0;
        self.chunk_time = None;
        self.state.next_part += 1;
        self.summary.parts_written.push(path);
        Ok(())
    }

    /// Flush the final partial part and return the run summary.
    ///
    /// # Errors
    ///
    /// Returns the write error of the final part.
    pub fn finish(mut self) -> Result<EncodeSummary, Svg2BasError> {
        self.flush()?;
        self.summary.state = self.state;
        Ok(self.summary)
    }
}

/// Numeric key of a batch file name: the last run of digits in its stem.
fn batch_key(path: &Path) -> Option<u64> {
    let stem = path.file_stem()?.to_str()?;
    let digits: String = stem
        .chars()
        .rev()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    digits.parse().ok()
}

/// List the `*.json` files of `dir`, ordered by the number in their name
/// (`2.json` before `10.json`). Names without a number follow, lexically.
///
/// # Errors
///
/// Returns an I/O error if `dir` cannot be read.
pub fn list_batches(dir: &Path) -> Result<Vec<PathBuf>, Svg2BasError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort_by(|a, b| {
        let (key_a, key_b) = (batch_key(a), batch_key(b));
        key_a
            .is_none()
            .cmp(&key_b.is_none())
            .then(key_a.cmp(&key_b))
            .then_with(|| a.file_name().cmp(&b.file_name()))
    });
    Ok(files)
}

/// Decode one batch file.
///
/// # Errors
///
/// Returns [`Svg2BasError::Decode`] if the file is not an array of frames or
/// flat-file records.
pub fn read_batch(path: &Path) -> Result<Vec<BatchEntry>, Svg2BasError> {
    let text = fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|error| Svg2BasError::Decode {
        path: path.to_path_buf(),
        reason: error.to_string(),
    })
}

/// Convert every batch under `options.input_dir()` into BAS parts.
///
/// # Errors
///
/// Returns [`Svg2BasError::Configuration`] for invalid options,
/// [`Svg2BasError::NoInput`] if the directory has no `.json` files, and
/// decode or write errors, all of which end the run.
pub fn encode(options: &EncodeOptions) -> Result<EncodeSummary, Svg2BasError> {
    options.validate()?;

    let batches = list_batches(options.input_dir())?;
    if batches.is_empty() {
        return Err(Svg2BasError::NoInput {
            path: options.input_dir().to_path_buf(),
            reason: "no .json batch files".to_string(),
        });
    }
    fs::create_dir_all(options.output_dir())?;

    log::info!(
        "Encoding {} batch(es) from {} (canvas {}x{}, {} fps)",
        batches.len(),
        options.input_dir().display(),
        options.canvas_width,
        options.canvas_height,
        options.fps
    );

    let mut tracker = ProgressTracker::new(
        options.progress.clone(),
        OperationType::Encoding,
        Some(batches.len() as u64),
    );
    let mut encoder = BasEncoder::new(options);

    for path in &batches {
        let entries = read_batch(path)?;
        log::debug!("{}: {} frame(s)", path.display(), entries.len());
        encoder.encode_batch(&entries)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        tracker.advance(&name);
    }

    tracker.finish();
    encoder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ColorPath, FrameData};

    fn frame(index: u64, paths: &[&str]) -> BatchEntry {
        BatchEntry::Frame(FrameData {
            frame_index: index,
            data: paths
                .iter()
                .map(|d| ColorPath {
                    color: "ff0000".to_string(),
                    pathdata: Some(d.to_string()),
                })
                .collect(),
        })
    }

    #[test]
    fn display_time_rounds_to_milliseconds() {
        assert_eq!(display_time(0, 5.0, 3000), 3000);
        assert_eq!(display_time(1, 5.0, 3000), 3200);
        assert_eq!(display_time(1, 3.0, 0), 333);
        assert_eq!(display_time(2, 3.0, 0), 667);
        assert_eq!(display_time(10, 24.0, -100), 317);
    }

    #[test]
    fn colors() {
        assert_eq!(parse_color(Some("ff0000")), 0xff0000);
        assert_eq!(parse_color(Some("#00FF00")), 0x00ff00);
        assert_eq!(parse_color(Some("#00f")), 0x0000ff);
        assert_eq!(parse_color(Some("12345678")), 0x123456);
        assert_eq!(parse_color(Some("none")), FLAT_COLOR);
        assert_eq!(parse_color(None), FLAT_COLOR);
    }

    #[test]
    fn flat_line_format() {
        assert_eq!(
            flat_line(3200, "M0 100"),
            "3200,0,25,16777215,baseline,M0 100"
        );
    }

    #[test]
    fn block_format() {
        let object = BlockObject {
            name: "f1_0",
            flipped_path: "M0 10",
            color: 0xff0000,
            canvas_width: 20,
            canvas_height: 10,
        };
        assert_eq!(
            block(&object, 3200, 200),
            "def path f1_0 {\n    d = \"M0 10\"\n    viewBox = \"0 0 20 10\"\n    fillColor = 0xff0000\n    alpha = 0\n}\nset f1_0 { alpha = 0 } 3200ms\nthen set f1_0 { alpha = 1 } 0ms\nthen set f1_0 {} 200ms\nthen set f1_0 { alpha = 0 } 0ms"
        );
    }

    #[test]
    fn block_path_is_escaped() {
        let object = BlockObject {
            name: "f0_0",
            flipped_path: r#"M0 9"x\"#,
            color: 0xffffff,
            canvas_width: 10,
            canvas_height: 10,
        };
        let text = block(&object, 0, 100);
        assert!(text.contains(r#"d = "M0 9\"x\\""#), "{text}");
    }

    #[test]
    fn batch_keys() {
        assert_eq!(batch_key(Path::new("10.json")), Some(10));
        assert_eq!(batch_key(Path::new("output_7.json")), Some(7));
        assert_eq!(batch_key(Path::new("extra.json")), None);
    }

    #[test]
    fn frame_counter_spans_batches_and_parts_chunk_by_entries() {
        let dir = tempfile::tempdir().unwrap();
        let options = EncodeOptions::new()
            .with_output_dir(dir.path())
            .with_canvas(10, 10)
            .with_start_offset_ms(0)
            .with_chunk_limit(ChunkLimit::Entries(2));

        let mut encoder = BasEncoder::new(&options);
        encoder
            .encode_batch(&[frame(0, &["M0 1"]), frame(1, &["M0 2", "M0 3"])])
            .unwrap();
        encoder.encode_batch(&[frame(2, &["M0 4"])]).unwrap();
        assert_eq!(encoder.state().frame_counter, 3);

        let summary = encoder.finish().unwrap();
        assert_eq!(summary.frames, 3);
        assert_eq!(summary.paths, 4);
        assert_eq!(summary.batches_read, 2);
        assert_eq!(
            summary.parts_written,
            vec![
                dir.path().join("output_part1.txt"),
                dir.path().join("output_part2.txt")
            ]
        );
        assert_eq!(summary.state.next_part, 3);

        let first = fs::read_to_string(dir.path().join("output_part1.txt")).unwrap();
        assert_eq!(
            first,
            "0,0,25,16777215,baseline,M0 9\n200,0,25,16777215,baseline,M0 8\n"
        );
        let second = fs::read_to_string(dir.path().join("output_part2.txt")).unwrap();
        assert_eq!(
            second,
            "200,0,25,16777215,baseline,M0 7\n400,0,25,16777215,baseline,M0 6\n"
        );
    }

    #[test]
    fn char_limit_flushes_once_reached() {
        let dir = tempfile::tempdir().unwrap();
        let line_len = flat_line(0, "M0 9").len();
        let options = EncodeOptions::new()
            .with_output_dir(dir.path())
            .with_canvas(10, 10)
            .with_start_offset_ms(0)
            .with_fps(1000.0)
            .with_chunk_limit(ChunkLimit::Chars(line_len + 1));

        let mut encoder = BasEncoder::new(&options);
        for index in 0..3 {
            encoder.encode_frame(&frame(index, &["M0 1"])).unwrap();
        }
        let summary = encoder.finish().unwrap();
        // Two lines plus a separator reach the limit; the third is the tail.
        assert_eq!(summary.parts_written.len(), 2);
    }

    #[test]
    fn timestamped_parts_use_first_entry_time() {
        let dir = tempfile::tempdir().unwrap();
        let options = EncodeOptions::new()
            .with_output_dir(dir.path())
            .with_naming(PartNaming::Timestamped)
            .with_chunk_limit(ChunkLimit::Entries(1));

        let mut encoder = BasEncoder::new(&options);
        encoder
            .encode_batch(&[frame(0, &["M0 0"]), frame(1, &["M0 0"])])
            .unwrap();
        let summary = encoder.finish().unwrap();
        assert_eq!(
            summary.parts_written,
            vec![dir.path().join("3000_1.txt"), dir.path().join("3200_2.txt")]
        );
    }

    #[test]
    fn block_parts_are_separated_by_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let options = EncodeOptions::new()
            .with_output_dir(dir.path())
            .with_encoding(BasEncoding::Block)
            .with_canvas(10, 10);

        let mut encoder = BasEncoder::new(&options);
        encoder.encode_frame(&frame(0, &["M0 1", "M0 2"])).unwrap();
        let summary = encoder.finish().unwrap();
        assert_eq!(summary.parts_written, vec![dir.path().join("output_part1.bas")]);

        let text = fs::read_to_string(&summary.parts_written[0]).unwrap();
        let blocks: Vec<&str> = text.trim_end().split("\n\n").collect();
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].starts_with("def path f0_0 {"));
        assert!(blocks[1].starts_with("def path f0_1 {"));
        assert!(blocks[1].contains("d = \"M0 8\""));
        assert!(blocks[1].contains("fillColor = 0xff0000"));
    }
}
