//! # Video Preprocessor Library
//!
//! Batch pipeline that discovers video files under a directory tree,
//! rescales each one to a target resolution/frame rate with ffmpeg,
//! optionally extracts per-frame JPEG images, and reports throughput and
//! failures at the end of the run.
//!
//! ## Module architecture:
//! - `config`: run configuration and parameter validation
//! - `error`: custom error types per pipeline stage
//! - `locator`: recursive video discovery
//! - `naming`: deterministic output file/directory naming
//! - `transcoder`: ffmpeg rescale + ffprobe duration probing
//! - `extractor`: frame extraction and source cleanup
//! - `pipeline`: per-item orchestration, failure isolation, worker pool
//! - `progress`: running statistics and progress reporting
//! - `platform`: cross-platform external tool resolution
//!
//! ## Usage:
//! ```rust,ignore
//! use video_preprocessor::{Config, PipelineOrchestrator};
//!
//! let config = Config::default();
//! let orchestrator = PipelineOrchestrator::new(config)?;
//! let report = orchestrator.run(&root).await?;
//! ```

pub mod config;
pub mod error;
pub mod extractor;
pub mod locator;
pub mod naming;
pub mod pipeline;
pub mod platform;
pub mod progress;
pub mod transcoder;

pub use config::{Config, RescaleSpec, SOURCE_FPS};
pub use error::PipelineError;
pub use pipeline::{ItemOutcome, PipelineOrchestrator, RunReport};
pub use progress::RunStats;
