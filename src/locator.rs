//! # Video Discovery Module
//!
//! Recursive enumeration of video files under a root directory.
//!
//! ## Responsibilities:
//! - Walks the directory tree with `walkdir`
//! - Keeps files whose name ends with the configured extension filter
//! - Fails with `DirectoryNotFound` when the root is missing
//! - Logs and continues past unreadable subdirectories
//!
//! No ordering guarantee beyond stability within a single run; tests sort
//! before comparing.

use crate::error::PipelineError;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// Discovers video files to process
pub struct VideoLocator;

impl VideoLocator {
    /// Find all files under `root` (recursively) whose name ends with
    /// `extension`.
    pub fn find_videos(root: &Path, extension: &str) -> Result<Vec<PathBuf>, PipelineError> {
        if !root.is_dir() {
            return Err(PipelineError::DirectoryNotFound(
                root.display().to_string(),
            ));
        }

        let mut videos = Vec::new();

        for entry in WalkDir::new(root) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    // Permission-denied subtrees are skipped, not fatal
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let matches = entry
                .file_name()
                .to_str()
                .map(|name| name.ends_with(extension))
                .unwrap_or(false);

            if matches {
                videos.push(entry.path().to_path_buf());
            }
        }

        Ok(videos)
    }
}
