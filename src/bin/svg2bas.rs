use std::{path::PathBuf, sync::Arc};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use svg2bas::{
    BasEncoding, ChunkLimit, CollectLayout, CollectOptions, EncodeOptions, FsListing, PartNaming,
    ProgressCallback, ProgressInfo, Svg2BasError,
};

const CLI_AFTER_HELP: &str = "Examples:\n  svg2bas collect -d ./video_frames -o ./svgjson --progress\n  svg2bas collect -s 4 -d ./video_frames -o ./svgjson\n  svg2bas encode -i ./svgjson -o ./bas_output -w 4000 -H 3620 --fps 5\n  svg2bas encode --encoding block --chunk-by entries --max-size 2000\n  svg2bas completions zsh > _svg2bas";

#[derive(Debug, Parser)]
#[command(
    name = "svg2bas",
    version,
    about = "Convert per-frame SVG folders into JSON batches and BAS danmaku text",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Print every file written and every degraded input.
    #[arg(long, global = true)]
    verbose: bool,

    /// Show a progress bar.
    #[arg(long, global = true)]
    progress: bool,

    /// Only print errors.
    #[arg(long, short, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract SVG path data into numbered JSON batches.
    #[command(
        about = "Collect SVG frames into JSON batches",
        after_help = "Examples:\n  svg2bas collect -d ./video_frames -o ./svgjson\n  svg2bas collect --files -d ./shapes -o ./shapesjson --batch-size 100"
    )]
    Collect {
        /// Index of the first batch file (1-based); earlier batches are skipped.
        #[arg(short, long, default_value_t = 1)]
        start: u64,
        /// Input directory.
        #[arg(short, long, default_value = "./video_frames")]
        dir: PathBuf,
        /// Output directory for JSON batches.
        #[arg(short, long, default_value = "./svgjson")]
        out: PathBuf,
        /// Frames (or files) per batch. Defaults to 30 frames or 100 files.
        #[arg(long)]
        batch_size: Option<usize>,
        /// Read every SVG directly under the input directory instead of frame folders.
        #[arg(long)]
        files: bool,
        /// Length of the color code in frame SVG names.
        #[arg(long, default_value_t = 6)]
        color_width: usize,
    },

    /// Encode JSON batches as BAS text.
    #[command(
        about = "Encode JSON batches as BAS",
        after_help = "Examples:\n  svg2bas encode -i ./svgjson -o ./bas_output\n  svg2bas encode --naming timestamped --start-time 0"
    )]
    Encode {
        /// Input directory of JSON batches.
        #[arg(short, long, default_value = "./svgjson")]
        input: PathBuf,
        /// Output directory for BAS parts.
        #[arg(short, long, default_value = "./bas_output")]
        out: PathBuf,
        /// Canvas width.
        #[arg(short, long, default_value_t = 4000)]
        width: u32,
        /// Canvas height (the flip axis).
        #[arg(short = 'H', long, default_value_t = 3620)]
        height: u32,
        /// Frames per second.
        #[arg(long, default_value_t = 5.0)]
        fps: f64,
        /// Maximum size of one output part.
        #[arg(long, default_value_t = 500_000)]
        max_size: usize,
        /// Unit of --max-size: chars | entries.
        #[arg(long, default_value = "chars")]
        chunk_by: String,
        /// Output form: flat | block.
        #[arg(long, default_value = "flat")]
        encoding: String,
        /// Part file names: part | timestamped.
        #[arg(long, default_value = "part")]
        naming: String,
        /// Offset added to every display time, in milliseconds.
        #[arg(long, default_value_t = 3000, allow_hyphen_values = true)]
        start_time: i64,
    },

    /// Check an input tree without writing anything.
    #[command(
        about = "Validate an input tree",
        after_help = "Examples:\n  svg2bas validate -d ./video_frames"
    )]
    Validate {
        /// Input directory.
        #[arg(short, long, default_value = "./video_frames")]
        dir: PathBuf,
        /// Validate a flat directory of SVG files.
        #[arg(long)]
        files: bool,
        /// Length of the color code in frame SVG names.
        #[arg(long, default_value_t = 6)]
        color_width: usize,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_encoding(value: &str) -> Option<BasEncoding> {
    match value.to_ascii_lowercase().as_str() {
        "flat" | "line" | "lines" => Some(BasEncoding::Flat),
        "block" | "blocks" | "bas" => Some(BasEncoding::Block),
        _ => None,
    }
}

fn parse_chunk_limit(unit: &str, size: usize) -> Option<ChunkLimit> {
    match unit.to_ascii_lowercase().as_str() {
        "chars" | "characters" => Some(ChunkLimit::Chars(size)),
        "entries" | "lines" | "records" => Some(ChunkLimit::Entries(size)),
        _ => None,
    }
}

fn parse_naming(value: &str) -> Option<PartNaming> {
    match value.to_ascii_lowercase().as_str() {
        "part" | "numbered" => Some(PartNaming::Numbered),
        "timestamped" | "time" => Some(PartNaming::Timestamped),
        _ => None,
    }
}

fn layout(files: bool) -> CollectLayout {
    if files {
        CollectLayout::Files
    } else {
        CollectLayout::Frames
    }
}

/// Drives an indicatif bar from library progress callbacks.
struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.green} {bar:40.cyan/blue} {percent}% | {pos}/{len} | {msg}",
        )?;
        bar.set_style(style.progress_chars("█░ "));
        Ok(Self { bar })
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        if let Some(total) = info.total {
            self.bar.set_length(total);
        }
        self.bar.set_position(info.current);
        match &info.current_item {
            Some(item) if info.degraded > 0 => {
                self.bar
                    .set_message(format!("{item} ({} degraded)", info.degraded));
            }
            Some(item) => self.bar.set_message(item.clone()),
            None => self.bar.finish_and_clear(),
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Collect {
            start,
            dir,
            out,
            batch_size,
            files,
            color_width,
        } => {
            let mut options = CollectOptions::new()
                .with_input_dir(&dir)
                .with_output_dir(&out)
                .with_start_index(start)
                .with_layout(layout(files))
                .with_color_code_width(color_width);
            if let Some(size) = batch_size {
                options = options.with_batch_size(size);
            }
            if cli.global.progress {
                options = options.with_progress(Arc::new(TerminalProgress::new()?));
            }

            let summary = svg2bas::collect(&options)?;

            if cli.global.verbose {
                for path in &summary.batches_written {
                    eprintln!("saved {}", path.display());
                }
            }
            if cli.global.quiet {
                return Ok(());
            }
            if !summary.degraded.is_empty() {
                eprintln!(
                    "{} {}",
                    "warning:".yellow().bold(),
                    format!(
                        "{} SVG file(s) could not be parsed; their geometry was written as null",
                        summary.degraded.len()
                    )
                    .yellow()
                );
                if cli.global.verbose {
                    for path in &summary.degraded {
                        eprintln!("  {}", path.display());
                    }
                }
            }

            println!(
                "{} {}",
                "success:".green().bold(),
                format!(
                    "Collected {} unit(s) from {} file(s) into {} batch(es) in {}",
                    summary.units,
                    summary.files_read,
                    summary.batches_written.len(),
                    summary.output_dir.display()
                )
                .green()
            );
        }
        Commands::Encode {
            input,
            out,
            width,
            height,
            fps,
            max_size,
            chunk_by,
            encoding,
            naming,
            start_time,
        } => {
            let encoding = parse_encoding(&encoding).ok_or("unsupported --encoding (flat|block)")?;
            let chunk_limit = parse_chunk_limit(&chunk_by, max_size)
                .ok_or("unsupported --chunk-by (chars|entries)")?;
            let naming = parse_naming(&naming).ok_or("unsupported --naming (part|timestamped)")?;

            let mut options = EncodeOptions::new()
                .with_input_dir(&input)
                .with_output_dir(&out)
                .with_canvas(width, height)
                .with_fps(fps)
                .with_chunk_limit(chunk_limit)
                .with_start_offset_ms(start_time)
                .with_encoding(encoding)
                .with_naming(naming);
            if cli.global.progress {
                options = options.with_progress(Arc::new(TerminalProgress::new()?));
            }

            if cli.global.verbose {
                eprintln!("input:  {}", input.display());
                eprintln!("output: {}", out.display());
                eprintln!("canvas: {width}x{height}, fps={fps}");
                eprintln!("chunk:  {chunk_limit:?}, start offset {start_time}ms");
            }

            let summary = svg2bas::encode(&options)?;

            if cli.global.verbose {
                for path in &summary.parts_written {
                    eprintln!("saved {}", path.display());
                }
            }
            if cli.global.quiet {
                return Ok(());
            }
            if summary.skipped > 0 {
                eprintln!(
                    "{} {}",
                    "warning:".yellow().bold(),
                    format!("{} record(s) had no path data", summary.skipped).yellow()
                );
            }

            println!(
                "{} {}",
                "success:".green().bold(),
                format!(
                    "Encoded {} frame(s) / {} path(s) from {} batch(es) into {} part(s) in {}",
                    summary.frames,
                    summary.paths,
                    summary.batches_read,
                    summary.parts_written.len(),
                    summary.output_dir.display()
                )
                .green()
            );
        }
        Commands::Validate {
            dir,
            files,
            color_width,
        } => {
            let options = CollectOptions::new()
                .with_input_dir(&dir)
                .with_layout(layout(files))
                .with_color_code_width(color_width);
            let report = svg2bas::validate_input(&FsListing, &options);
            if !cli.global.quiet {
                print!("{report}");
            }
            if !report.is_valid() {
                return Err("input is not valid".into());
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "svg2bas", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        match error.downcast_ref::<Svg2BasError>() {
            Some(error) if error.is_no_input() => {
                eprintln!("{} {error}", "nothing to do:".yellow().bold());
                std::process::exit(2);
            }
            _ => {
                eprintln!("{} {error}", "error:".red().bold());
                std::process::exit(1);
            }
        }
    }
}
