//! Collect a tree of SVG frame folders into JSON batches, then encode them
//! as BAS text.
//!
//! Usage:
//!   cargo run --example collect_and_encode -- <frames_dir> [height] [fps]

use std::error::Error;

use svg2bas::{CollectOptions, EncodeOptions};

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let frames_dir = args.next().unwrap_or_else(|| "./video_frames".to_string());
    let height: u32 = args.next().map(|value| value.parse()).transpose()?.unwrap_or(3620);
    let fps: f64 = args.next().map(|value| value.parse()).transpose()?.unwrap_or(5.0);

    // Validate first: nothing is written if the tree has no frames.
    let options = CollectOptions::new()
        .with_input_dir(&frames_dir)
        .with_output_dir("./svgjson");
    let report = svg2bas::validate_input(&svg2bas::FsListing, &options);
    print!("{report}");
    if !report.is_valid() {
        return Err("input is not valid".into());
    }

    println!("Collecting {frames_dir}...");
    let collected = svg2bas::collect(&options)?;
    println!(
        "Wrote {} batch(es) for {} frame(s), {} degraded file(s)",
        collected.batches_written.len(),
        collected.units,
        collected.degraded.len()
    );

    println!("Encoding at {fps} fps, canvas height {height}...");
    let encoded = svg2bas::encode(
        &EncodeOptions::new()
            .with_input_dir("./svgjson")
            .with_output_dir("./bas_output")
            .with_canvas(4000, height)
            .with_fps(fps),
    )?;
    for path in &encoded.parts_written {
        println!("Saved {}", path.display());
    }
    println!(
        "{} frame(s), {} path(s), {} skipped",
        encoded.frames, encoded.paths, encoded.skipped
    );

    Ok(())
}
