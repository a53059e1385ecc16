//! # Error Types Module
//!
//! Custom error types for the preprocessing pipeline.
//!
//! ## Error categories:
//! - `DirectoryNotFound`: discovery root missing or not a directory
//! - `Transcode`: ffmpeg rescale exited non-zero or produced no output file
//! - `Probe`: ffprobe metadata missing or unparsable
//! - `Rename`: embedding the frame count into the filename failed
//! - `Extraction`: ffmpeg frame dump exited non-zero
//! - `Timeout`: an external tool exceeded the configured time budget
//! - `Io`: filesystem errors (automatic conversion from `std::io::Error`)
//! - `MissingDependency`: ffmpeg/ffprobe not installed
//! - `Validation`: bad configuration input
//!
//! Every per-item error kind is caught at the item boundary inside the
//! orchestrator and turned into an error-log entry; none of them abort
//! the batch.

/// Custom error types for the video preprocessing pipeline
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),

    #[error("Transcode failed: {0}")]
    Transcode(String),

    #[error("Probe failed: {0}")]
    Probe(String),

    #[error("Rename failed: {0}")]
    Rename(String),

    #[error("Frame extraction failed: {0}")]
    Extraction(String),

    #[error("External tool timed out after {0}s")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Dependency missing: {0}")]
    MissingDependency(String),

    #[error("Validation error: {0}")]
    Validation(String),
}
