// ============================================================================
// vbvid-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with ffmpeg and ffprobe
//
// The pipeline never shells out directly. Joining and recoding go through the
// `FfmpegSpawner` trait and probing through `FfprobeExecutor`, so the drivers
// can be exercised with mock implementations. The default implementations use
// the ffmpeg-sidecar and ffprobe crates.

use crate::error::{CoreError, CoreResult};

use std::io;
use std::process::{Command, Stdio};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Traits and implementations for executing ffmpeg commands
pub mod ffmpeg_executor;

/// Traits and implementations for probing media with ffprobe
pub mod ffprobe_executor;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use ffmpeg_executor::{
    FfmpegProcess, FfmpegSpawner, SidecarProcess, SidecarSpawner, run_to_completion,
};
pub use ffprobe_executor::{CrateFfprobeExecutor, FfprobeExecutor, VideoStreamInfo};

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks if a required external command is available and executable.
///
/// Runs `<cmd_name> -version` with output discarded. Only a failure to start
/// the command counts; the exit status is not inspected.
///
/// # Returns
///
/// * `Ok(Vec<String>)` - The command parts if the command is found
/// * `Err(CoreError::DependencyNotFound)` - If the command is not on PATH
/// * `Err(CoreError::CommandStart)` - If the command exists but fails to start
pub fn check_dependency(cmd_name: &str) -> CoreResult<Vec<String>> {
    let cmd_parts = vec![cmd_name.to_string()];

    let result = Command::new(&cmd_parts[0])
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {}", cmd_name);
            Ok(cmd_parts)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{}' not found.", cmd_name);
            Err(CoreError::DependencyNotFound(cmd_name.to_string()))
        }
        Err(e) => {
            log::error!("Failed to start dependency check command '{}': {}", cmd_name, e);
            Err(CoreError::CommandStart(cmd_name.to_string(), e))
        }
    }
}
