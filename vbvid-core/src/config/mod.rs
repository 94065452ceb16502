//! Configuration structures and constants for the vbvid-core library.
//!
//! This module provides the configuration for the clip pipeline: where the
//! target directory and its marker directories live, the gap thresholds used
//! for temporal grouping, and the encoding parameters of the recode stage.

mod builder;

use crate::error::{CoreError, CoreResult};
use chrono::TimeDelta;
use std::path::PathBuf;

pub use builder::CoreConfigBuilder;

// Default constants

/// Gap between consecutive clips above which a new recording session starts (seconds).
pub const DEFAULT_SESSION_GAP_SECS: i64 = 10 * 60;

/// Gap between consecutive clips above which a continuation is flagged as a timeout (seconds).
pub const DEFAULT_TIMEOUT_GAP_SECS: i64 = 60;

/// Extensions (case-insensitive, without the dot) of clips picked up by discovery.
pub const DEFAULT_VIDEO_EXTENSIONS: &[&str] = &["mp4"];

/// Prefix of the per-session directories created by the grouping stage.
pub const DEFAULT_GROUP_DIR_PREFIX: &str = "group";

/// Hidden directory holding one merged file per group.
pub const DEFAULT_JOINED_DIR_NAME: &str = ".joined";

/// Hidden directory holding the recoded counterpart of each merged file.
pub const DEFAULT_RECODED_DIR_NAME: &str = ".recoded";

/// Extension given to merged files.
pub const MERGED_FILE_EXTENSION: &str = "mp4";

/// Sources strictly wider than this are encoded with the high-resolution quality.
pub const HIGH_RES_WIDTH_THRESHOLD: u32 = 3000;

/// CRF used for sources at or below the high-resolution width threshold.
pub const DEFAULT_QUALITY_STANDARD: u8 = 26;

/// CRF used for sources above the high-resolution width threshold.
/// Slightly higher than the standard value: those sources get smaller files.
pub const DEFAULT_QUALITY_HIGH_RES: u8 = 28;

/// Largest CRF accepted by libx265.
pub const MAX_QUALITY: u8 = 51;

/// Video encoder used by the recode stage.
pub const DEFAULT_VIDEO_CODEC: &str = "libx265";

/// Codec tag written on recoded files so Apple players accept HEVC in MP4.
pub const DEFAULT_CODEC_TAG: &str = "hvc1";

/// Configuration for one pipeline run.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Directory whose contents are grouped, joined and recoded
    pub target_dir: PathBuf,

    /// Destination for recode-only runs (defaults to the recoded marker directory)
    pub recode_dest: Option<PathBuf>,

    /// Clip extensions picked up by discovery, compared case-insensitively
    pub video_extensions: Vec<String>,

    /// Gaps strictly above this start a new group
    pub session_gap: TimeDelta,

    /// Gaps strictly above this (but within the session gap) are flagged as timeouts
    pub timeout_gap: TimeDelta,

    /// Prefix of the group directories
    pub group_dir_prefix: String,

    /// Name of the hidden directory holding merged files
    pub joined_dir_name: String,

    /// Name of the hidden directory holding recoded files
    pub recoded_dir_name: String,

    /// Width above which `quality_high_res` is used
    pub high_res_width_threshold: u32,

    /// CRF for sources at or below the width threshold
    pub quality_standard: u8,

    /// CRF for sources above the width threshold
    pub quality_high_res: u8,

    /// ffmpeg video encoder name
    pub video_codec: String,

    /// Codec tag passed with `-tag:v`
    pub codec_tag: String,

    /// Keep going through the remaining stages after grouping
    pub run_all: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            target_dir: PathBuf::from("."),
            recode_dest: None,
            video_extensions: DEFAULT_VIDEO_EXTENSIONS
                .iter()
                .map(|ext| (*ext).to_string())
                .collect(),
            session_gap: TimeDelta::seconds(DEFAULT_SESSION_GAP_SECS),
            timeout_gap: TimeDelta::seconds(DEFAULT_TIMEOUT_GAP_SECS),
            group_dir_prefix: DEFAULT_GROUP_DIR_PREFIX.to_string(),
            joined_dir_name: DEFAULT_JOINED_DIR_NAME.to_string(),
            recoded_dir_name: DEFAULT_RECODED_DIR_NAME.to_string(),
            high_res_width_threshold: HIGH_RES_WIDTH_THRESHOLD,
            quality_standard: DEFAULT_QUALITY_STANDARD,
            quality_high_res: DEFAULT_QUALITY_HIGH_RES,
            video_codec: DEFAULT_VIDEO_CODEC.to_string(),
            codec_tag: DEFAULT_CODEC_TAG.to_string(),
            run_all: false,
        }
    }
}

impl CoreConfig {
    /// Creates config for a target directory. Other fields use defaults.
    pub fn new(target_dir: PathBuf) -> Self {
        Self {
            target_dir,
            ..Default::default()
        }
    }

    /// Checks thresholds, quality values and directory names.
    pub fn validate(&self) -> CoreResult<()> {
        if self.timeout_gap <= TimeDelta::zero() {
            return Err(CoreError::Config(format!(
                "timeout_gap must be positive, got {}s",
                self.timeout_gap.num_seconds()
            )));
        }

        if self.session_gap <= self.timeout_gap {
            return Err(CoreError::Config(format!(
                "session_gap ({}s) must be greater than timeout_gap ({}s)",
                self.session_gap.num_seconds(),
                self.timeout_gap.num_seconds()
            )));
        }

        if self.quality_standard > MAX_QUALITY {
            return Err(CoreError::Config(format!(
                "quality_standard must be 0-{MAX_QUALITY}, got {}",
                self.quality_standard
            )));
        }

        if self.quality_high_res > MAX_QUALITY {
            return Err(CoreError::Config(format!(
                "quality_high_res must be 0-{MAX_QUALITY}, got {}",
                self.quality_high_res
            )));
        }

        if self.video_extensions.is_empty() {
            return Err(CoreError::Config(
                "video_extensions must not be empty".to_string(),
            ));
        }

        if self.group_dir_prefix.is_empty()
            || self.group_dir_prefix.starts_with('.')
            || self.group_dir_prefix.contains(['/', '\\'])
        {
            return Err(CoreError::Config(format!(
                "group_dir_prefix must be a plain, non-hidden name, got '{}'",
                self.group_dir_prefix
            )));
        }

        for (label, name) in [
            ("joined_dir_name", &self.joined_dir_name),
            ("recoded_dir_name", &self.recoded_dir_name),
        ] {
            if !name.starts_with('.') || name.len() < 2 || name.contains(['/', '\\']) {
                return Err(CoreError::Config(format!(
                    "{label} must be a hidden directory name (leading '.'), got '{name}'"
                )));
            }
        }

        if self.joined_dir_name == self.recoded_dir_name {
            return Err(CoreError::Config(
                "joined_dir_name and recoded_dir_name must differ".to_string(),
            ));
        }

        Ok(())
    }
}
