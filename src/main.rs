//! # Video Preprocessor - Main Entry Point
//!
//! ## Execution flow:
//! 1. Parse CLI arguments (root directory, geometry, extension, flags)
//! 2. Configure logging (INFO, or DEBUG with the verbose flag)
//! 3. Validate that the video directory exists
//! 4. Build a Config and hand it to the orchestrator
//!
//! ## Example usage:
//! ```bash
//! video-preprocessor /path/to/videos --width 128 --height 128 --fps 25 --extract-frames
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use video_preprocessor::{Config, PipelineOrchestrator, RescaleSpec};

#[derive(Parser)]
#[command(name = "video-preprocessor")]
#[command(about = "Batch rescale videos and extract per-frame images")]
struct Args {
    /// Directory containing video files to process
    video_directory: PathBuf,

    /// Target width in pixels
    #[arg(short = 'W', long, default_value = "320")]
    width: u32,

    /// Target height in pixels
    #[arg(short = 'H', long, default_value = "240")]
    height: u32,

    /// Target frame rate (-1 keeps the source frame rate)
    #[arg(short, long, default_value = "30", allow_hyphen_values = true)]
    fps: i32,

    /// Extension filter for video discovery
    #[arg(short, long, default_value = "mp4")]
    extension: String,

    /// Extract one JPEG per frame and delete the source video afterwards
    #[arg(long)]
    extract_frames: bool,

    /// Number of parallel workers
    #[arg(short, long, default_value = "4")]
    workers: usize,

    /// Timeout in seconds for each external tool invocation
    #[arg(short, long, default_value = "900")]
    timeout: u64,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Validate arguments
    if !args.video_directory.is_dir() {
        return Err(anyhow::anyhow!(
            "Video directory does not exist: {}",
            args.video_directory.display()
        ));
    }

    let config = Config {
        rescale: RescaleSpec {
            width: args.width,
            height: args.height,
            fps: args.fps,
        },
        extension: args.extension,
        extract_frames: args.extract_frames,
        workers: args.workers,
        tool_timeout_secs: args.timeout,
    };

    let orchestrator = PipelineOrchestrator::new(config)?;
    let report = orchestrator.run(&args.video_directory).await?;

    if report.stats.failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}
