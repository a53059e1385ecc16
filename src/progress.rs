//! # Progress Tracking and Statistics Module
//!
//! Running statistics and visual feedback for a preprocessing run.
//!
//! ## Components:
//! - `RunStats`: per-item timing accumulator (current value, sum, count,
//!   running average) plus processed/failed counters. Never reset mid-run;
//!   every item is counted whether it succeeded or failed.
//! - `ProgressReporter`: `indicatif` progress bar emitting one
//!   `i/N : current (average) sec/video` line per completed item and a
//!   consolidated failure report at the end of the run.
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:02:15] [========================>---] 150/163 (92%) 150/163 : 0.84 (1.02) sec/video
//! ```

use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Running average of per-item processing time, with outcome counters
#[derive(Debug, Default, Clone)]
pub struct RunStats {
    /// Seconds taken by the most recent item
    pub val: f64,
    /// Total seconds across all items
    pub sum: f64,
    /// Items processed so far (success or failure)
    pub count: usize,
    /// Items that failed at some pipeline stage
    pub failed: usize,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed item and the seconds it took.
    pub fn record(&mut self, seconds: f64, success: bool) {
        self.val = seconds;
        self.sum += seconds;
        self.count += 1;
        if !success {
            self.failed += 1;
        }
    }

    /// Running average in seconds per item
    pub fn avg(&self) -> f64 {
        if self.count > 0 {
            self.sum / self.count as f64
        } else {
            0.0
        }
    }
}

/// Reports per-item progress and the end-of-run failure summary
#[derive(Clone)]
pub struct ProgressReporter {
    bar: ProgressBar,
    total: usize,
}

impl ProgressReporter {
    /// Create a reporter for a run of `total` items
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);

        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap()
                .progress_chars("=>-"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar, total }
    }

    /// Advance the bar after one item and show its timing line.
    pub fn item_done(&self, stats: &RunStats) {
        self.bar.inc(1);
        self.bar.set_message(format!(
            "{}/{} : {:.3} ({:.3}) sec/video",
            stats.count,
            self.total,
            stats.val,
            stats.avg()
        ));
    }

    /// Finish the bar and emit the consolidated failure report.
    pub fn finish(&self, stats: &RunStats, error_log: &[PathBuf]) {
        self.bar.finish_with_message(format!(
            "Processed {} videos in {:.1}s (avg {:.3} sec/video)",
            stats.count,
            stats.sum,
            stats.avg()
        ));

        info!("=== Run Complete ===");
        info!("Videos processed: {}", stats.count);
        info!("Videos failed: {}", stats.failed);

        if !error_log.is_empty() {
            info!("Failed videos:");
            for path in error_log {
                info!("  {}", path.display());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_stats_running_average() {
        let mut stats = RunStats::new();
        assert_eq!(stats.avg(), 0.0);

        stats.record(2.0, true);
        stats.record(4.0, true);

        assert_eq!(stats.count, 2);
        assert_eq!(stats.val, 4.0);
        assert_eq!(stats.avg(), 3.0);
        assert_eq!(stats.failed, 0);
    }

    #[test]
    fn test_run_stats_counts_failures() {
        let mut stats = RunStats::new();

        stats.record(1.0, true);
        stats.record(3.0, false);
        stats.record(2.0, true);

        // Failed items still count toward the total and the average
        assert_eq!(stats.count, 3);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.avg(), 2.0);
    }
}
