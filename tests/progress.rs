//! Progress reporting integration tests.

mod common;

use std::sync::{Arc, Mutex};

use common::{frame_tree, write};
use svg2bas::{
    CollectOptions, EncodeOptions, OperationType, ProgressCallback, ProgressInfo, collect, encode,
};

/// Records every progress snapshot it receives.
#[derive(Default)]
struct RecordingProgress {
    seen: Mutex<Vec<ProgressInfo>>,
}

impl RecordingProgress {
    fn snapshots(&self) -> Vec<ProgressInfo> {
        self.seen.lock().unwrap().clone()
    }
}

impl ProgressCallback for RecordingProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        self.seen.lock().unwrap().push(info.clone());
    }
}

#[test]
fn collection_reports_every_frame() {
    let input = tempfile::tempdir().expect("tempdir");
    let output = tempfile::tempdir().expect("tempdir");
    frame_tree(input.path(), 3);
    let progress = Arc::new(RecordingProgress::default());

    collect(
        &CollectOptions::new()
            .with_input_dir(input.path())
            .with_output_dir(output.path())
            .with_progress(progress.clone()),
    )
    .expect("collect");

    let snapshots = progress.snapshots();
    // One per frame plus the final report.
    assert_eq!(snapshots.len(), 4);
    assert!(snapshots.iter().all(|s| s.operation == OperationType::Collection));
    assert_eq!(snapshots[0].current_item.as_deref(), Some("0_1"));
    assert_eq!(snapshots[2].current_item.as_deref(), Some("2_3"));

    let last = snapshots.last().unwrap();
    assert_eq!(last.current, 3);
    assert_eq!(last.total, Some(3));
    assert_eq!(last.current_item, None);
    assert!((last.percentage.unwrap() - 100.0).abs() < f32::EPSILON);
}

#[test]
fn degraded_files_are_counted() {
    let input = tempfile::tempdir().expect("tempdir");
    let output = tempfile::tempdir().expect("tempdir");
    write(input.path(), "0_1/ff0000.svg", "not xml <");
    write(input.path(), "0_1/00ff00.svg", "<svg/>");
    let progress = Arc::new(RecordingProgress::default());

    collect(
        &CollectOptions::new()
            .with_input_dir(input.path())
            .with_output_dir(output.path())
            .with_progress(progress.clone()),
    )
    .expect("collect");

    assert_eq!(progress.snapshots().last().unwrap().degraded, 1);
}

#[test]
fn encoding_reports_every_batch() {
    let input = tempfile::tempdir().expect("tempdir");
    let batches = tempfile::tempdir().expect("tempdir");
    let output = tempfile::tempdir().expect("tempdir");
    frame_tree(input.path(), 5);
    collect(
        &CollectOptions::new()
            .with_input_dir(input.path())
            .with_output_dir(batches.path())
            .with_batch_size(2),
    )
    .expect("collect");
    let progress = Arc::new(RecordingProgress::default());

    encode(
        &EncodeOptions::new()
            .with_input_dir(batches.path())
            .with_output_dir(output.path())
            .with_progress(progress.clone()),
    )
    .expect("encode");

    let snapshots = progress.snapshots();
    assert_eq!(snapshots.len(), 4);
    assert!(snapshots.iter().all(|s| s.operation == OperationType::Encoding));
    let items: Vec<_> = snapshots
        .iter()
        .filter_map(|s| s.current_item.as_deref())
        .collect();
    assert_eq!(items, ["1.json", "2.json", "3.json"]);
}
