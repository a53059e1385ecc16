//! # Naming Policy Module
//!
//! Deterministic derivation of output file and directory names.
//!
//! ## Responsibilities:
//! - `rescaled_name()`: path for the rescaled video next to the original
//! - `final_name()`: same path with the frame count embedded before the
//!   extension, so callers can read the true frame count off the filename
//! - `frames_dir_name()`: sibling directory holding the extracted frames
//!
//! All derivations are pure and idempotent: the rename and retry paths in
//! the orchestrator depend on recomputing the same target from the same
//! inputs. The fps sentinel (-1) appears literally in names.
//!
//! ## Layout produced:
//! ```text
//! clip.avi
//! clip_128x128_25.mp4          (after rescale)
//! clip_128x128_25_75.mp4       (after probe + rename, 75 frames)
//! frames_128x128_25/000001.jpg (after extraction)
//! ```

use crate::config::RescaleSpec;
use std::path::{Path, PathBuf};

/// Derives output names from input name and target geometry
pub struct NamingPolicy;

impl NamingPolicy {
    /// Path of the rescaled video: `<dir>/<basename>_<w>x<h>_<fps>.mp4`
    pub fn rescaled_name(input: &Path, spec: &RescaleSpec) -> PathBuf {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        input.with_file_name(format!(
            "{}_{}x{}_{}.mp4",
            stem, spec.width, spec.height, spec.fps
        ))
    }

    /// Rescaled path with the frame count appended before the extension:
    /// `<dir>/<basename>_<w>x<h>_<fps>_<frames>.mp4`
    pub fn final_name(rescaled: &Path, frame_count: u64) -> PathBuf {
        let stem = rescaled.file_stem().unwrap_or_default().to_string_lossy();
        let ext = rescaled.extension().unwrap_or_default().to_string_lossy();
        rescaled.with_file_name(format!("{}_{}.{}", stem, frame_count, ext))
    }

    /// Sibling directory for extracted frames: `<dir>/frames_<w>x<h>_<fps>`
    pub fn frames_dir_name(video: &Path, spec: &RescaleSpec) -> PathBuf {
        let dir = video.parent().unwrap_or_else(|| Path::new(""));
        dir.join(format!("frames_{}x{}_{}", spec.width, spec.height, spec.fps))
    }
}
