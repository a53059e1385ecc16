//! # Transcoder Module
//!
//! Wraps the two external tools the rescale half of the pipeline drives.
//!
//! ## Responsibilities:
//! - Rescale a video to the target resolution/frame rate with ffmpeg
//! - Probe the rescaled output with ffprobe (duration + effective fps)
//! - Rename the rescaled file to embed the computed frame count
//! - Verify that ffmpeg and ffprobe are installed before a run starts
//!
//! ## Rescale pipeline:
//! ```text
//! ffmpeg -loglevel error -i <input> -vf scale=w:h [-r fps] -y <basename>_<w>x<h>_<fps>.mp4
//! ```
//! ffmpeg can exit 0 while writing nothing, so success is confirmed by an
//! explicit existence check on the output file, not by exit code alone.
//!
//! ## Probing:
//! ffprobe is asked for JSON (`-show_format -show_streams`); the container
//! duration comes from `format.duration` and the effective frame rate from
//! the video stream's `r_frame_rate`, which supplies the fps when the run
//! was configured to keep the source rate.
//!
//! Every invocation runs under the configured timeout; a tool that never
//! exits is killed and the item fails with `Timeout`.

use crate::config::{Config, RescaleSpec};
use crate::error::PipelineError;
use crate::naming::NamingPolicy;
use crate::platform::PlatformCommands;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Container metadata for a video file
#[derive(Debug, Clone)]
pub struct VideoInfo {
    /// Duration in seconds
    pub duration: f64,
    /// Frame rate of the first video stream, if present
    pub fps: Option<f64>,
}

/// Compute the number of frames in `duration` seconds at `fps`,
/// truncated toward zero.
pub fn frame_count(duration: f64, fps: f64) -> u64 {
    (duration * fps) as u64
}

/// Drives ffmpeg/ffprobe for rescaling and duration probing
pub struct Transcoder {
    config: Config,
}

impl Transcoder {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Rescale a video to the configured resolution and frame rate.
    ///
    /// Writes `<basename>_<w>x<h>_<fps>.mp4` next to the input, overwriting
    /// any previous file at that path. The input is left untouched.
    pub async fn rescale(&self, input: &Path) -> Result<PathBuf, PipelineError> {
        let spec = self.config.rescale;
        let output_path = NamingPolicy::rescaled_name(input, &spec);

        debug!(
            "Rescaling {} -> {}",
            input.display(),
            output_path.display()
        );

        let platform = PlatformCommands::instance();
        let mut cmd = Command::new(platform.get_command("ffmpeg"));
        cmd.args(["-loglevel", "error"])
            .arg("-i")
            .arg(input)
            .arg("-vf")
            .arg(format!("scale={}:{}", spec.width, spec.height));

        if !spec.keeps_source_fps() {
            cmd.arg("-r").arg(spec.fps.to_string());
        }

        cmd.arg("-y").arg(&output_path);

        let output = self.run_with_timeout(cmd, "ffmpeg").await?;

        if !output.status.success() {
            return Err(PipelineError::Transcode(format!(
                "{}: {}",
                input.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        // ffmpeg can report success without producing a file
        if !output_path.is_file() {
            return Err(PipelineError::Transcode(format!(
                "{}: no output file was produced",
                input.display()
            )));
        }

        Ok(output_path)
    }

    /// Probe container metadata (duration, frame rate) with ffprobe.
    pub async fn probe(&self, path: &Path) -> Result<VideoInfo, PipelineError> {
        let platform = PlatformCommands::instance();
        let mut cmd = Command::new(platform.get_command("ffprobe"));
        cmd.args(["-v", "quiet", "-print_format", "json", "-show_format", "-show_streams"])
            .arg(path);

        let output = self.run_with_timeout(cmd, "ffprobe").await?;

        if !output.status.success() {
            return Err(PipelineError::Probe(format!(
                "{}: {}",
                path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        parse_probe_output(&String::from_utf8_lossy(&output.stdout))
            .map_err(|e| PipelineError::Probe(format!("{}: {}", path.display(), e)))
    }

    /// Rename the rescaled file so its name carries the computed frame count.
    pub async fn rename_with_frame_count(
        &self,
        rescaled: &Path,
        frames: u64,
    ) -> Result<PathBuf, PipelineError> {
        let final_path = NamingPolicy::final_name(rescaled, frames);

        if final_path.exists() {
            return Err(PipelineError::Rename(format!(
                "destination already exists: {}",
                final_path.display()
            )));
        }

        tokio::fs::rename(rescaled, &final_path)
            .await
            .map_err(|e| {
                PipelineError::Rename(format!("{}: {}", rescaled.display(), e))
            })?;

        Ok(final_path)
    }

    /// Resolve the effective fps for frame-count computation: the target
    /// rate when one was requested, otherwise the probed stream rate.
    pub fn effective_fps(spec: &RescaleSpec, info: &VideoInfo) -> Result<f64, PipelineError> {
        if spec.keeps_source_fps() {
            info.fps.ok_or_else(|| {
                PipelineError::Probe("no frame rate reported for source-fps run".to_string())
            })
        } else {
            Ok(spec.fps as f64)
        }
    }

    async fn run_with_timeout(
        &self,
        mut cmd: Command,
        tool: &str,
    ) -> Result<Output, PipelineError> {
        cmd.kill_on_drop(true);

        let timeout = Duration::from_secs(self.config.tool_timeout_secs);
        match tokio::time::timeout(timeout, cmd.output()).await {
            Ok(result) => result.map_err(|e| {
                PipelineError::MissingDependency(format!("failed to execute {}: {}", tool, e))
            }),
            Err(_) => Err(PipelineError::Timeout(self.config.tool_timeout_secs)),
        }
    }

    /// Check if required tools are available
    pub async fn check_dependencies() -> Result<(), PipelineError> {
        let platform = PlatformCommands::instance();

        for tool in ["ffmpeg", "ffprobe"] {
            if !platform.is_command_available(tool).await {
                return Err(PipelineError::MissingDependency(format!(
                    "{} is required for video preprocessing",
                    tool
                )));
            }
        }

        Ok(())
    }
}

/// Parse ffprobe JSON output into a `VideoInfo`.
fn parse_probe_output(raw: &str) -> Result<VideoInfo, String> {
    let info: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| format!("invalid ffprobe output: {}", e))?;

    let duration = info["format"]["duration"]
        .as_str()
        .and_then(|d| d.parse::<f64>().ok())
        .ok_or_else(|| "duration metadata missing or unparsable".to_string())?;

    if duration < 0.0 {
        return Err(format!("negative duration: {}", duration));
    }

    let empty_vec = vec![];
    let streams = info["streams"].as_array().unwrap_or(&empty_vec);
    let fps = streams
        .iter()
        .find(|s| s["codec_type"] == "video")
        .and_then(|s| s["r_frame_rate"].as_str())
        .and_then(parse_frame_rate);

    Ok(VideoInfo { duration, fps })
}

/// Parse an ffprobe frame-rate fraction such as "30000/1001".
fn parse_frame_rate(raw: &str) -> Option<f64> {
    let (num, den) = match raw.split_once('/') {
        Some((n, d)) => (n.parse::<f64>().ok()?, d.parse::<f64>().ok()?),
        None => (raw.parse::<f64>().ok()?, 1.0),
    };

    if den == 0.0 {
        return None;
    }

    Some(num / den)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SOURCE_FPS;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_frame_count_truncates_toward_zero() {
        assert_eq!(frame_count(2.5, 30.0), 75);
        assert_eq!(frame_count(2.999, 30.0), 89);
        assert_eq!(frame_count(0.0, 30.0), 0);
    }

    #[test]
    fn test_parse_frame_rate() {
        assert_eq!(parse_frame_rate("25/1"), Some(25.0));
        assert_eq!(parse_frame_rate("30"), Some(30.0));
        assert_eq!(parse_frame_rate("0/0"), None);
        assert_eq!(parse_frame_rate("garbage"), None);

        let ntsc = parse_frame_rate("30000/1001").unwrap();
        assert!((ntsc - 29.97).abs() < 0.01);
    }

    #[test]
    fn test_parse_probe_output() {
        let raw = r#"{
            "format": {"duration": "2.500000"},
            "streams": [
                {"codec_type": "audio"},
                {"codec_type": "video", "r_frame_rate": "25/1"}
            ]
        }"#;

        let info = parse_probe_output(raw).unwrap();
        assert!((info.duration - 2.5).abs() < f64::EPSILON);
        assert_eq!(info.fps, Some(25.0));
    }

    #[test]
    fn test_parse_probe_output_missing_duration() {
        let raw = r#"{"format": {}, "streams": []}"#;
        assert!(parse_probe_output(raw).is_err());

        let raw = r#"{"format": {"duration": "N/A"}, "streams": []}"#;
        assert!(parse_probe_output(raw).is_err());
    }

    #[test]
    fn test_effective_fps() {
        let info = VideoInfo {
            duration: 2.0,
            fps: Some(24.0),
        };

        let fixed = RescaleSpec {
            width: 128,
            height: 128,
            fps: 25,
        };
        assert_eq!(Transcoder::effective_fps(&fixed, &info).unwrap(), 25.0);

        let source = RescaleSpec {
            width: 128,
            height: 128,
            fps: SOURCE_FPS,
        };
        assert_eq!(Transcoder::effective_fps(&source, &info).unwrap(), 24.0);

        let no_stream = VideoInfo {
            duration: 2.0,
            fps: None,
        };
        assert!(Transcoder::effective_fps(&source, &no_stream).is_err());
    }

    #[tokio::test]
    async fn test_rename_with_frame_count() {
        let temp_dir = TempDir::new().unwrap();
        let rescaled = temp_dir.path().join("clip_128x128_25.mp4");
        fs::write(&rescaled, b"video").unwrap();

        let transcoder = Transcoder::new(Config::default());
        let renamed = transcoder.rename_with_frame_count(&rescaled, 75).await.unwrap();

        assert_eq!(renamed, temp_dir.path().join("clip_128x128_25_75.mp4"));
        assert!(renamed.is_file());
        assert!(!rescaled.exists());
    }

    #[tokio::test]
    async fn test_rename_refuses_existing_destination() {
        let temp_dir = TempDir::new().unwrap();
        let rescaled = temp_dir.path().join("clip_128x128_25.mp4");
        let taken = temp_dir.path().join("clip_128x128_25_75.mp4");
        fs::write(&rescaled, b"video").unwrap();
        fs::write(&taken, b"older run").unwrap();

        let transcoder = Transcoder::new(Config::default());
        let result = transcoder.rename_with_frame_count(&rescaled, 75).await;

        assert!(matches!(result, Err(PipelineError::Rename(_))));
        assert!(rescaled.is_file());
    }
}
