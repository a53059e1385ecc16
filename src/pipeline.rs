//! # Pipeline Orchestrator Module
//!
//! Drives every discovered video through the preprocessing pipeline.
//!
//! ## Per-item state machine:
//! ```text
//! Discovered -> Rescaling -> Probing -> Renaming -> (ExtractingFrames -> Cleanup ->) Done
//!                  |            |           |              |              |
//!                  +------------+-----------+--------------+--------------+--> Failed
//! ```
//! The stages compose with `?` over `Result<_, PipelineError>` inside
//! `process_item`; the error is caught once, at the item boundary, where it
//! becomes an error-log entry. A single item's failure never aborts the
//! batch. Nothing is rolled back on failure: a partially produced rescaled
//! file may be left on disk after a probe or extraction failure, which
//! operators should expect when inspecting a failed item.
//!
//! ## Concurrency:
//! Items are fully independent, so each one runs in its own task gated by
//! a semaphore with `workers` permits. Statistics and the error log are
//! owned by the run loop alone and updated at the single join point where
//! task outcomes are collected, so no locking is needed.
//!
//! ## Execution flow:
//! 1. Discover videos under the root (early return when none)
//! 2. Verify ffmpeg/ffprobe are installed
//! 3. Fan items out over the worker pool
//! 4. Collect outcomes, update stats, append failures to the error log
//! 5. Emit the per-item progress line and the final failure report

use crate::{
    config::Config,
    error::PipelineError,
    extractor::FrameExtractor,
    locator::VideoLocator,
    progress::{ProgressReporter, RunStats},
    transcoder::{frame_count, Transcoder},
};
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, error, info};

/// Terminal state of a successfully processed item
#[derive(Debug, Clone)]
pub enum ItemOutcome {
    /// Rescaled and renamed; extraction was not requested
    Rescaled { video: PathBuf, frames: u64 },
    /// Fully processed: frames on disk, source and rescaled video removed
    Extracted { frames_dir: PathBuf, frames: u64 },
}

/// Aggregated result of a whole run
#[derive(Debug, Default)]
pub struct RunReport {
    pub stats: RunStats,
    /// Paths that failed at some stage, in completion order
    pub error_log: Vec<PathBuf>,
}

/// Main pipeline orchestrator
pub struct PipelineOrchestrator {
    config: Config,
}

impl PipelineOrchestrator {
    /// Create a new orchestrator with a validated configuration
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Process every matching video under `root`.
    pub async fn run(&self, root: &Path) -> Result<RunReport> {
        let videos = VideoLocator::find_videos(root, &self.config.extension)?;
        info!("{} videos to process in total", videos.len());

        if videos.is_empty() {
            return Ok(RunReport::default());
        }

        Transcoder::check_dependencies().await?;

        let reporter = ProgressReporter::new(videos.len());
        let mut stats = RunStats::new();
        let mut error_log = Vec::new();

        // Bounded worker pool; the loop blocks on a permit before spawning
        let semaphore = Arc::new(Semaphore::new(self.config.workers));
        let mut tasks = Vec::new();

        for video in videos {
            let permit = semaphore.clone().acquire_owned().await?;
            let worker = ItemWorker::new(self.config.clone());

            let task = tokio::spawn(async move {
                let _permit = permit; // Keep permit alive
                let start = Instant::now();
                let result = worker.process_item(&video).await;
                (video, result, start.elapsed().as_secs_f64())
            });

            tasks.push(task);
        }

        // Single collection point for stats and the error log
        for task in tasks {
            let (video, result, seconds) = task.await?;

            match result {
                Ok(outcome) => {
                    debug!("Done: {} -> {:?}", video.display(), outcome);
                    stats.record(seconds, true);
                }
                Err(e) => {
                    error!("Impossible to process {}: {}", video.display(), e);
                    error_log.push(video);
                    stats.record(seconds, false);
                }
            }

            reporter.item_done(&stats);
        }

        reporter.finish(&stats, &error_log);

        Ok(RunReport { stats, error_log })
    }
}

/// Per-item worker owning its own tool wrappers
struct ItemWorker {
    config: Config,
    transcoder: Transcoder,
    extractor: FrameExtractor,
}

impl ItemWorker {
    fn new(config: Config) -> Self {
        Self {
            transcoder: Transcoder::new(config.clone()),
            extractor: FrameExtractor::new(config.clone()),
            config,
        }
    }

    /// Run one video through rescale -> probe -> rename -> (extract ->
    /// cleanup). Any stage error short-circuits to the item boundary.
    async fn process_item(&self, video: &Path) -> Result<ItemOutcome, PipelineError> {
        let rescaled = self.transcoder.rescale(video).await?;

        let info = self.transcoder.probe(&rescaled).await?;
        let fps = Transcoder::effective_fps(&self.config.rescale, &info)?;
        let frames = frame_count(info.duration, fps);

        let final_path = self
            .transcoder
            .rename_with_frame_count(&rescaled, frames)
            .await?;

        if !self.config.extract_frames {
            return Ok(ItemOutcome::Rescaled {
                video: final_path,
                frames,
            });
        }

        // Extraction consumes the rescaled video on success
        let frames_dir = self.extractor.extract(&final_path).await?;

        // Cleanup: the original source is no longer needed, and removing
        // it is what makes a re-run skip already-processed items
        tokio::fs::remove_file(video).await?;

        Ok(ItemOutcome::Extracted { frames_dir, frames })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// Install stub ffmpeg/ffprobe executables on PATH. The ffmpeg stub
    /// exits non-zero for any input whose name contains "corrupt" and
    /// otherwise writes its output file; the ffprobe stub reports a fixed
    /// 2-second duration.
    #[cfg(unix)]
    fn install_stub_tools(bin_dir: &Path) {
        use std::os::unix::fs::PermissionsExt;

        let ffmpeg = r#"#!/bin/sh
input=""
prev=""
for a in "$@"; do
  if [ "$prev" = "-i" ]; then input="$a"; fi
  prev="$a"
  out="$a"
done
case "$input" in
  *corrupt*) echo "Invalid data found when processing input" >&2; exit 1;;
esac
echo stub > "$out"
"#;
        let ffprobe = r#"#!/bin/sh
printf '{"format":{"duration":"2.0"},"streams":[{"codec_type":"video","r_frame_rate":"25/1"}]}'
"#;

        for (name, script) in [("ffmpeg", ffmpeg), ("ffprobe", ffprobe)] {
            let path = bin_dir.join(name);
            fs::write(&path, script).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        }

        let path_var = std::env::var("PATH").unwrap_or_default();
        std::env::set_var("PATH", format!("{}:{}", bin_dir.display(), path_var));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = Config::default();
        config.workers = 0;
        assert!(PipelineOrchestrator::new(config).is_err());
    }

    #[tokio::test]
    async fn test_run_on_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let orchestrator = PipelineOrchestrator::new(Config::default()).unwrap();

        let report = orchestrator.run(temp_dir.path()).await.unwrap();

        assert_eq!(report.stats.count, 0);
        assert_eq!(report.stats.failed, 0);
        assert!(report.error_log.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_item_is_logged_and_batch_continues() {
        let bin_dir = TempDir::new().unwrap();
        install_stub_tools(bin_dir.path());

        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("good_one.mp4"), b"video").unwrap();
        fs::write(root.join("corrupt.mp4"), b"garbage").unwrap();
        fs::write(root.join("good_two.mp4"), b"video").unwrap();

        let orchestrator = PipelineOrchestrator::new(Config::default()).unwrap();
        let report = orchestrator.run(root).await.unwrap();

        // Every item is counted, the bad one is logged, the run never aborts
        assert_eq!(report.stats.count, 3);
        assert_eq!(report.stats.failed, 1);
        assert_eq!(report.error_log, vec![root.join("corrupt.mp4")]);

        // The good items were rescaled and renamed (2.0s at 30 fps = 60 frames)
        assert!(root.join("good_one_320x240_30_60.mp4").is_file());
        assert!(root.join("good_two_320x240_30_60.mp4").is_file());

        // The failed item's source stays on disk for retry
        assert!(root.join("corrupt.mp4").is_file());
    }

    #[tokio::test]
    async fn test_run_on_missing_root_is_fatal() {
        let orchestrator = PipelineOrchestrator::new(Config::default()).unwrap();
        let result = orchestrator.run(Path::new("/no/such/directory")).await;
        assert!(result.is_err());
    }
}
