//! Progress reporting.
//!
//! This module provides [`ProgressCallback`] for monitoring collection and
//! encoding runs, and [`ProgressInfo`] for detailed progress snapshots.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use svg2bas::{CollectOptions, ProgressCallback, ProgressInfo, Svg2BasError};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         if let Some(pct) = info.percentage {
//!             println!("[{:?}] {pct:.1}% complete", info.operation);
//!         }
//!     }
//! }
//!
//! let options = CollectOptions::new().with_progress(Arc::new(PrintProgress));
//! let summary = svg2bas::collect(&options)?;
//! println!("{} batch file(s)", summary.batches_written.len());
//! # Ok::<(), Svg2BasError>(())
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

/// The kind of operation currently in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OperationType {
    /// Extracting SVG frames into JSON batches.
    Collection,
    /// Encoding JSON batches into BAS text.
    Encoding,
}

/// A snapshot of run progress.
///
/// Delivered to [`ProgressCallback::on_progress`] after every processed
/// unit (frame folder, SVG file, or JSON batch).
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// What kind of work is being performed.
    pub operation: OperationType,
    /// How many units have been processed so far.
    pub current: u64,
    /// Total units expected, if known ahead of time.
    pub total: Option<u64>,
    /// Completion percentage (0.0 – 100.0), if `total` is known.
    pub percentage: Option<f32>,
    /// Wall-clock time elapsed since the operation started.
    pub elapsed: Duration,
    /// Estimated time remaining, based on current throughput.
    pub estimated_remaining: Option<Duration>,
    /// Name of the unit that was just processed (folder or file name).
    pub current_item: Option<String>,
    /// Number of units recovered from a per-file failure so far.
    pub degraded: u64,
}

/// Trait for receiving progress updates during a run.
///
/// Progress callbacks are **infallible**: they observe but cannot halt
/// the operation.
pub trait ProgressCallback: Send + Sync {
    /// Called after each processed unit and once more when the run ends.
    fn on_progress(&self, info: &ProgressInfo);
}

/// A no-op implementation that discards all progress notifications.
///
/// This is the default when no callback is configured.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Internal helper that tracks progress timing and emits callbacks.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    operation: OperationType,
    total: Option<u64>,
    current: u64,
    degraded: u64,
    start_time: Instant,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        operation: OperationType,
        total: Option<u64>,
    ) -> Self {
        Self {
            callback,
            operation,
            total,
            current: 0,
            degraded: 0,
            start_time: Instant::now(),
        }
    }

    /// Record one completed unit and fire the callback.
    pub(crate) fn advance(&mut self, item: &str) {
        self.current += 1;
        self.report(Some(item.to_string()));
    }

    /// Count a unit whose contribution was degraded by a recovered failure.
    pub(crate) fn mark_degraded(&mut self) {
        self.degraded += 1;
    }

    /// Unconditionally emit a final progress report.
    pub(crate) fn finish(&mut self) {
        self.report(None);
    }

    fn report(&self, item: Option<String>) {
        let elapsed = self.start_time.elapsed();

        let percentage = self
            .total
            .filter(|&t| t > 0)
            .map(|t| (self.current as f32 / t as f32) * 100.0);

        let estimated_remaining = if self.current > 0 {
            self.total.map(|t| {
                let remaining = t.saturating_sub(self.current);
                let per_item = elapsed / self.current as u32;
                per_item * remaining as u32
            })
        } else {
            None
        };

        let info = ProgressInfo {
            operation: self.operation,
            current: self.current,
            total: self.total,
            percentage,
            elapsed,
            estimated_remaining,
            current_item: item,
            degraded: self.degraded,
        };

        self.callback.on_progress(&info);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct Recorder(Mutex<Vec<ProgressInfo>>);

    impl ProgressCallback for Recorder {
        fn on_progress(&self, info: &ProgressInfo) {
            self.0.lock().unwrap().push(info.clone());
        }
    }

    #[test]
    fn tracker_reports_each_unit_and_final() {
        let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
        let mut tracker = ProgressTracker::new(recorder.clone(), OperationType::Collection, Some(2));
        tracker.advance("1_1");
        tracker.mark_degraded();
        tracker.advance("1_2");
        tracker.finish();

        let infos = recorder.0.lock().unwrap();
        assert_eq!(infos.len(), 3);
        assert_eq!(infos[0].current_item.as_deref(), Some("1_1"));
        assert_eq!(infos[0].percentage, Some(50.0));
        assert_eq!(infos[1].degraded, 1);
        assert_eq!(infos[2].current, 2);
        assert!(infos[2].current_item.is_none());
    }

    #[test]
    fn unknown_total_has_no_percentage() {
        let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
        let mut tracker = ProgressTracker::new(recorder.clone(), OperationType::Encoding, None);
        tracker.advance("1.json");

        let infos = recorder.0.lock().unwrap();
        assert!(infos[0].percentage.is_none());
        assert!(infos[0].estimated_remaining.is_none());
    }
}
