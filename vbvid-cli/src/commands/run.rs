// ============================================================================
// vbvid-cli/src/commands/run.rs
// ============================================================================
//
// RUN COMMAND: Maps CLI flags onto a core configuration and dispatches to the
// dry-run planner, the recode-only path or the staged pipeline.

use crate::cli::Cli;
use crate::error::CliResult;

use vbvid_core::external::{CrateFfprobeExecutor, SidecarSpawner};
use vbvid_core::reporting::Reporter;
use vbvid_core::{
    CoreConfig, CoreConfigBuilder, PipelinePlan, RunSummary, plan_pipeline, run_pipeline,
    run_recode_only,
};

use std::path::PathBuf;

/// Result of one CLI invocation.
#[derive(Debug)]
pub enum RunOutcome {
    Planned(PipelinePlan),
    Completed(RunSummary),
}

impl RunOutcome {
    pub fn has_failures(&self) -> bool {
        match self {
            RunOutcome::Planned(_) => false,
            RunOutcome::Completed(summary) => summary.has_failures(),
        }
    }
}

/// Builds the core configuration for `target_dir` from the parsed flags.
pub fn build_core_config(args: &Cli, target_dir: PathBuf) -> CliResult<CoreConfig> {
    let mut builder = CoreConfigBuilder::new()
        .target_dir(target_dir)
        .run_all(args.all);

    if let Some(dest) = &args.dest {
        builder = builder.recode_dest(dest.clone());
    }
    if let Some(quality) = args.quality_standard {
        builder = builder.quality_standard(quality);
    }
    if let Some(quality) = args.quality_high_res {
        builder = builder.quality_high_res(quality);
    }

    builder.build_validated()
}

/// Runs vbvid against `target_dir` with real ffmpeg and ffprobe.
pub fn run_command(args: &Cli, target_dir: PathBuf, reporter: &dyn Reporter) -> CliResult<RunOutcome> {
    let config = build_core_config(args, target_dir)?;
    log::debug!("Configuration: {config:?}");

    if args.dry_run {
        return plan_pipeline(&config, reporter).map(RunOutcome::Planned);
    }

    let spawner = SidecarSpawner;
    let prober = CrateFfprobeExecutor::new();
    let summary = if args.recode_only {
        run_recode_only(&config, &spawner, &prober, reporter)?
    } else {
        run_pipeline(&config, &spawner, &prober, reporter)?
    };

    Ok(RunOutcome::Completed(summary))
}
