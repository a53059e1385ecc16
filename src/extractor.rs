//! # Frame Extraction Module
//!
//! Decodes a rescaled video into a numbered sequence of JPEG frames.
//!
//! ## Responsibilities:
//! - Ensures the sibling `frames_<w>x<h>_<fps>` directory exists
//! - Runs ffmpeg to dump one `%06d.jpg` per frame into it
//! - Deletes the source video, but only after ffmpeg reports success
//!
//! Deleting the source is destructive and irreversible, so extraction
//! failure is detected first; a failed item keeps its video on disk for
//! retry or inspection. The directory creation is idempotent
//! (`create_dir_all`), so concurrent workers sharing a parent directory
//! cannot race each other into an error.

use crate::config::{Config, RescaleSpec};
use crate::error::PipelineError;
use crate::naming::NamingPolicy;
use crate::platform::PlatformCommands;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Drives ffmpeg frame dumping and source cleanup
pub struct FrameExtractor {
    config: Config,
}

impl FrameExtractor {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Extract every frame of `video` into its frames directory, then
    /// delete the video. Returns the frames directory path.
    pub async fn extract(&self, video: &Path) -> Result<PathBuf, PipelineError> {
        let frames_dir = ensure_frames_dir(video, &self.config.rescale).await?;

        debug!(
            "Extracting frames {} -> {}",
            video.display(),
            frames_dir.display()
        );

        let platform = PlatformCommands::instance();
        let mut cmd = Command::new(platform.get_command("ffmpeg"));
        cmd.args(["-loglevel", "error"])
            .arg("-i")
            .arg(video)
            .arg(frames_dir.join("%06d.jpg"))
            .kill_on_drop(true);

        let timeout = Duration::from_secs(self.config.tool_timeout_secs);
        let output = match tokio::time::timeout(timeout, cmd.output()).await {
            Ok(result) => result.map_err(|e| {
                PipelineError::MissingDependency(format!("failed to execute ffmpeg: {}", e))
            })?,
            Err(_) => return Err(PipelineError::Timeout(self.config.tool_timeout_secs)),
        };

        if !output.status.success() {
            // Source stays on disk for retry/inspection
            return Err(PipelineError::Extraction(format!(
                "{}: {}",
                video.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        // Only reached after ffmpeg reported success
        tokio::fs::remove_file(video).await?;

        Ok(frames_dir)
    }
}

/// Create the frames directory for `video` if it does not exist yet.
pub async fn ensure_frames_dir(
    video: &Path,
    spec: &RescaleSpec,
) -> Result<PathBuf, PipelineError> {
    let frames_dir = NamingPolicy::frames_dir_name(video, spec);
    tokio::fs::create_dir_all(&frames_dir).await?;
    Ok(frames_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn spec() -> RescaleSpec {
        RescaleSpec {
            width: 128,
            height: 128,
            fps: 25,
        }
    }

    #[tokio::test]
    async fn test_ensure_frames_dir_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let video = temp_dir.path().join("clip_128x128_25_75.mp4");

        let frames_dir = ensure_frames_dir(&video, &spec()).await.unwrap();

        assert_eq!(frames_dir, temp_dir.path().join("frames_128x128_25"));
        assert!(frames_dir.is_dir());
    }

    #[tokio::test]
    async fn test_ensure_frames_dir_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let video = temp_dir.path().join("clip.mp4");

        let first = ensure_frames_dir(&video, &spec()).await.unwrap();
        // Pre-existing content must survive a second call
        fs::write(first.join("000001.jpg"), b"frame").unwrap();

        let second = ensure_frames_dir(&video, &spec()).await.unwrap();
        assert_eq!(first, second);
        assert!(second.join("000001.jpg").is_file());
    }
}
