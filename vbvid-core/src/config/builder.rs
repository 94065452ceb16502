// ============================================================================
// vbvid-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for CoreConfig
//
// Fluent construction of CoreConfig. Unset fields keep the defaults from
// CoreConfig::default(); `build_validated` runs CoreConfig::validate on the
// result.

// ---- Standard library imports ----
use std::path::PathBuf;

// ---- External crate imports ----
use chrono::TimeDelta;

// ---- Internal crate imports ----
use super::CoreConfig;
use crate::error::CoreResult;

/// Builder for creating CoreConfig instances.
///
/// # Examples
///
/// ```rust
/// use vbvid_core::config::CoreConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = CoreConfigBuilder::new()
///     .target_dir(PathBuf::from("/videos/2023-02-25"))
///     .quality_standard(24)
///     .quality_high_res(27)
///     .run_all(true)
///     .build();
///
/// assert_eq!(config.quality_standard, 24);
/// assert!(config.run_all);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CoreConfigBuilder {
    config: CoreConfig,
}

impl CoreConfigBuilder {
    /// Creates a builder seeded with `CoreConfig::default()`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the directory the pipeline operates on.
    pub fn target_dir(mut self, dir: PathBuf) -> Self {
        self.config.target_dir = dir;
        self
    }

    /// Sets an explicit destination for recode-only runs.
    pub fn recode_dest(mut self, dir: PathBuf) -> Self {
        self.config.recode_dest = Some(dir);
        self
    }

    /// Replaces the list of clip extensions.
    pub fn video_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.video_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the hard-boundary gap.
    pub fn session_gap(mut self, gap: TimeDelta) -> Self {
        self.config.session_gap = gap;
        self
    }

    /// Sets the timeout-annotation gap.
    pub fn timeout_gap(mut self, gap: TimeDelta) -> Self {
        self.config.timeout_gap = gap;
        self
    }

    pub fn group_dir_prefix(mut self, prefix: &str) -> Self {
        self.config.group_dir_prefix = prefix.to_string();
        self
    }

    pub fn joined_dir_name(mut self, name: &str) -> Self {
        self.config.joined_dir_name = name.to_string();
        self
    }

    pub fn recoded_dir_name(mut self, name: &str) -> Self {
        self.config.recoded_dir_name = name.to_string();
        self
    }

    pub fn high_res_width_threshold(mut self, width: u32) -> Self {
        self.config.high_res_width_threshold = width;
        self
    }

    pub fn quality_standard(mut self, quality: u8) -> Self {
        self.config.quality_standard = quality;
        self
    }

    pub fn quality_high_res(mut self, quality: u8) -> Self {
        self.config.quality_high_res = quality;
        self
    }

    pub fn video_codec(mut self, codec: &str) -> Self {
        self.config.video_codec = codec.to_string();
        self
    }

    pub fn codec_tag(mut self, tag: &str) -> Self {
        self.config.codec_tag = tag.to_string();
        self
    }

    /// Continue through joining and recoding after the grouping stage.
    pub fn run_all(mut self, run_all: bool) -> Self {
        self.config.run_all = run_all;
        self
    }

    /// Builds the configuration without validation.
    pub fn build(self) -> CoreConfig {
        self.config
    }

    /// Builds the configuration and validates it.
    pub fn build_validated(self) -> CoreResult<CoreConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
