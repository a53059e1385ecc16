//! # Configuration Management Module
//!
//! Run configuration for the preprocessing pipeline.
//!
//! ## Responsibilities:
//! - Defines the `Config` struct with every run parameter
//! - Defines `RescaleSpec`, the target geometry shared read-only by all items
//! - Validates input parameters before any work starts
//! - Supports loading/saving configuration from/to JSON files
//!
//! ## Parameters:
//! - `rescale`: target {width, height, fps} (fps `-1` keeps the source rate)
//! - `extension`: filename suffix filter for discovery (default: "mp4")
//! - `extract_frames`: dump one image per frame and delete the source video
//! - `workers`: number of parallel workers (default: 4)
//! - `tool_timeout_secs`: wall-clock budget per external tool invocation
//!
//! ## Example:
//! ```rust,ignore
//! let config = Config {
//!     rescale: RescaleSpec { width: 128, height: 128, fps: 25 },
//!     extract_frames: true,
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use crate::error::PipelineError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Sentinel fps value meaning "keep the source frame rate".
pub const SOURCE_FPS: i32 = -1;

/// Target geometry for the rescale stage. Shared read-only across all items.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RescaleSpec {
    /// Target width in pixels
    pub width: u32,
    /// Target height in pixels
    pub height: u32,
    /// Target frame rate; `SOURCE_FPS` (-1) keeps the source rate
    pub fps: i32,
}

impl RescaleSpec {
    /// Whether the source frame rate should be preserved
    pub fn keeps_source_fps(&self) -> bool {
        self.fps == SOURCE_FPS
    }
}

impl Default for RescaleSpec {
    fn default() -> Self {
        Self {
            width: 320,
            height: 240,
            fps: 30,
        }
    }
}

/// Configuration for a preprocessing run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Target resolution and frame rate
    pub rescale: RescaleSpec,
    /// Filename suffix filter for video discovery
    pub extension: String,
    /// Extract frames after rescaling (deletes the source video on success)
    pub extract_frames: bool,
    /// Number of parallel workers
    pub workers: usize,
    /// Wall-clock budget in seconds for each external tool invocation
    pub tool_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rescale: RescaleSpec::default(),
            extension: "mp4".to_string(),
            extract_frames: false,
            workers: 4,
            tool_timeout_secs: 900,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.rescale.width == 0 || self.rescale.height == 0 {
            return Err(PipelineError::Validation(
                "Width and height must be positive".to_string(),
            ));
        }

        if self.rescale.fps == 0 || (self.rescale.fps < 0 && !self.rescale.keeps_source_fps()) {
            return Err(PipelineError::Validation(format!(
                "FPS must be positive, or {} to keep the source frame rate",
                SOURCE_FPS
            )));
        }

        if self.extension.is_empty() {
            return Err(PipelineError::Validation(
                "Extension filter must not be empty".to_string(),
            ));
        }

        if self.workers == 0 {
            return Err(PipelineError::Validation(
                "Number of workers must be greater than 0".to_string(),
            ));
        }

        if self.tool_timeout_secs == 0 {
            return Err(PipelineError::Validation(
                "Tool timeout must be greater than 0 seconds".to_string(),
            ));
        }

        Ok(())
    }

    /// Load configuration from file
    pub async fn from_file(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &PathBuf) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
