//! Core library for turning a directory of camera clips into one recoded file
//! per recording session, using ffmpeg and ffprobe.
//!
//! The pipeline has three stages, and the one to run is inferred from what is
//! on disk:
//!
//! 1. **Group**: top-level clips are clustered by modification time and moved
//!    into `group01/`, `group02/`, ... A gap of more than ten minutes starts a
//!    new group.
//! 2. **Join**: each group directory is losslessly concatenated into
//!    `.joined/<group>.mp4`.
//! 3. **Recode**: each merged file is re-encoded to HEVC into
//!    `.recoded/<group>.mp4`.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use vbvid_core::{CoreConfig, run_pipeline};
//! use vbvid_core::external::{CrateFfprobeExecutor, SidecarSpawner};
//! use vbvid_core::reporting::TerminalReporter;
//! use std::path::PathBuf;
//!
//! let mut config = CoreConfig::new(PathBuf::from("/videos/2023-02-25"));
//! config.run_all = true;
//!
//! let summary = run_pipeline(
//!     &config,
//!     &SidecarSpawner,
//!     &CrateFfprobeExecutor::new(),
//!     &TerminalReporter::new(),
//! )
//! .unwrap();
//! assert!(!summary.has_failures());
//! ```

pub mod concat;
pub mod config;
pub mod discovery;
pub mod error;
pub mod external;
pub mod file_logging;
pub mod grouping;
pub mod layout;
pub mod pipeline;
pub mod progress;
pub mod reporting;
pub mod stage;
pub mod temp_files;
pub mod transcode;
pub mod utils;

// Re-exports for public API
pub use config::{CoreConfig, CoreConfigBuilder};
pub use discovery::{SourceFile, find_source_files};
pub use error::{CoreError, CoreResult};
pub use grouping::{GapAnnotation, Group, GroupThresholds, GroupingEntry, GroupingPlan, group_files};
pub use layout::PipelineLayout;
pub use pipeline::{PipelinePlan, plan_pipeline, run_pipeline, run_recode_only};
pub use reporting::{ItemOutcome, PipelineStep, RunSummary, StageReport};
pub use stage::{PipelineStage, StageSnapshot, detect_stage};
pub use utils::{format_duration, format_gap};
