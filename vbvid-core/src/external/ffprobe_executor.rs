//! FFprobe integration for the recode stage.
//!
//! Only the first video stream's dimensions and the container duration are
//! needed: width picks the quality tier, duration drives progress reporting.

use crate::error::{CoreError, CoreResult, command_failed_error, command_start_error};
use crate::external::check_dependency;

use ffprobe::{FfProbeError, ffprobe};
use serde::Serialize;
use std::path::Path;
use std::process::ExitStatus;

/// Properties of a merged file's first video stream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VideoStreamInfo {
    pub width: u32,
    pub height: u32,
    /// Container duration in seconds, when ffprobe reports one.
    pub duration_secs: Option<f64>,
}

impl VideoStreamInfo {
    /// Validates raw ffprobe values. Missing or negative dimensions are errors;
    /// an unparseable duration is treated as unknown.
    pub fn from_probe_values(
        input_path: &Path,
        width: Option<i64>,
        height: Option<i64>,
        duration: Option<&str>,
    ) -> CoreResult<Self> {
        let (Some(width), Some(height)) = (width, height) else {
            return Err(CoreError::VideoInfoError(format!(
                "Video stream missing dimensions in {}",
                input_path.display()
            )));
        };

        let (Ok(width), Ok(height)) = (u32::try_from(width), u32::try_from(height)) else {
            return Err(CoreError::VideoInfoError(format!(
                "Invalid dimensions found in {}: width={}, height={}",
                input_path.display(),
                width,
                height
            )));
        };

        let duration_secs = duration
            .and_then(|d| d.parse::<f64>().ok())
            .filter(|d| d.is_finite() && *d >= 0.0);

        Ok(Self {
            width,
            height,
            duration_secs,
        })
    }
}

/// Trait for probing media files.
pub trait FfprobeExecutor {
    /// Reads the first video stream of `input_path`.
    fn get_video_stream_info(&self, input_path: &Path) -> CoreResult<VideoStreamInfo>;

    /// Checks that the underlying binary can be run.
    fn ensure_available(&self) -> CoreResult<()> {
        Ok(())
    }
}

/// `FfprobeExecutor` backed by the `ffprobe` crate.
#[derive(Debug, Clone, Default)]
pub struct CrateFfprobeExecutor;

impl CrateFfprobeExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl FfprobeExecutor for CrateFfprobeExecutor {
    fn get_video_stream_info(&self, input_path: &Path) -> CoreResult<VideoStreamInfo> {
        log::debug!(
            "Running ffprobe (via crate) for video stream info on: {}",
            input_path.display()
        );
        match ffprobe(input_path) {
            Ok(metadata) => {
                let video_stream = metadata
                    .streams
                    .iter()
                    .find(|s| s.codec_type.as_deref() == Some("video"))
                    .ok_or_else(|| {
                        CoreError::VideoInfoError(format!(
                            "No video stream found in {}",
                            input_path.display()
                        ))
                    })?;

                VideoStreamInfo::from_probe_values(
                    input_path,
                    video_stream.width,
                    video_stream.height,
                    metadata.format.duration.as_deref(),
                )
            }
            Err(err) => {
                log::error!(
                    "ffprobe failed for video stream info on {}: {:?}",
                    input_path.display(),
                    err
                );
                Err(map_ffprobe_error(err, "video stream info"))
            }
        }
    }

    fn ensure_available(&self) -> CoreResult<()> {
        check_dependency("ffprobe").map(|_| ())
    }
}

/// Maps an `FfProbeError` onto `CoreError`.
fn map_ffprobe_error(err: FfProbeError, context: &str) -> CoreError {
    match err {
        FfProbeError::Io(io_err) => command_start_error(format!("ffprobe ({context})"), io_err),
        FfProbeError::Status(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            command_failed_error(format!("ffprobe ({context})"), output.status, stderr)
        }
        FfProbeError::Deserialize(err) => {
            CoreError::JsonParseError(format!("ffprobe {context} output deserialization: {err}"))
        }
        _ => command_failed_error(
            format!("ffprobe ({context})"),
            ExitStatus::default(),
            format!("Unknown ffprobe error: {err:?}"),
        ),
    }
}
