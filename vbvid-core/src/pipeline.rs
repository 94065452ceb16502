// ============================================================================
// vbvid-core/src/pipeline.rs
// ============================================================================
//
// PIPELINE: Stage dispatch for one invocation
//
// Each run inspects the target directory, decides which stage it is in and
// runs the matching step:
//
//   Ungrouped -> group clips into group directories (stop, unless run_all)
//   Grouped   -> join pending groups, then recode every merged file
//   Joined    -> recode every merged file
//   Recoded   -> nothing to do
//
// All state lives on disk, so an interrupted run is resumed by simply running
// again. ffmpeg and ffprobe are only required once a join or recode is about
// to happen.

use crate::concat::join_groups;
use crate::config::CoreConfig;
use crate::discovery::find_source_files;
use crate::error::{CoreError, CoreResult};
use crate::external::{FfmpegSpawner, FfprobeExecutor};
use crate::grouping::{
    GroupThresholds, GroupingPlan, check_group_destinations, group_files, materialize_group,
};
use crate::layout::PipelineLayout;
use crate::reporting::{ItemOutcome, PipelineStep, Reporter, RunSummary, StageReport};
use crate::stage::{PipelineStage, StageSnapshot, detect_stage};
use crate::transcode::transcode_files;

use std::path::{Path, PathBuf};
use std::time::Instant;

/// What a dry run found.
#[derive(Debug, Clone)]
pub struct PipelinePlan {
    pub snapshot: StageSnapshot,
    /// Clustering of the top-level clips; only computed for `Ungrouped`.
    pub grouping: Option<GroupingPlan>,
}

fn ensure_target_dir(dir: &Path) -> CoreResult<()> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(CoreError::PathError(format!(
            "Target is not a directory: {}",
            dir.display()
        )))
    }
}

fn ensure_tools<S: FfmpegSpawner, P: FfprobeExecutor>(spawner: &S, prober: &P) -> CoreResult<()> {
    spawner.ensure_available()?;
    prober.ensure_available()
}

/// Runs the step for the directory's current stage.
///
/// Per-item join and recode failures are recorded in the returned summary.
/// An `Err` means the run could not proceed at all: invalid config, unreadable
/// target, missing tools, or a failed move while grouping.
pub fn run_pipeline<S, P>(
    config: &CoreConfig,
    spawner: &S,
    prober: &P,
    reporter: &dyn Reporter,
) -> CoreResult<RunSummary>
where
    S: FfmpegSpawner,
    P: FfprobeExecutor,
{
    config.validate()?;
    ensure_target_dir(&config.target_dir)?;

    let start = Instant::now();
    let layout = PipelineLayout::new(config);
    let mut snapshot = detect_stage(&layout)?;
    reporter.stage_detected(&snapshot);
    let initial_stage = snapshot.stage;
    log::info!(
        "Starting run in {} at stage {}",
        layout.root().display(),
        initial_stage
    );

    let mut steps = Vec::new();

    if snapshot.stage == PipelineStage::Ungrouped {
        let report = group_target(config, &layout, reporter)?;
        let grouped_any = !report.items.is_empty();
        steps.push(report);

        if !grouped_any {
            reporter.operation_complete("No clips to group");
            return finish(&layout, Some(initial_stage), steps, start, reporter);
        }
        if !config.run_all {
            reporter.operation_complete("Grouping done; review the groups, then run again");
            return finish(&layout, Some(initial_stage), steps, start, reporter);
        }

        snapshot = detect_stage(&layout)?;
        reporter.stage_detected(&snapshot);
    }

    match snapshot.stage {
        PipelineStage::Ungrouped => {}
        PipelineStage::Grouped => {
            ensure_tools(spawner, prober)?;
            steps.push(join_groups(
                spawner,
                &layout,
                &snapshot.pending_joins,
                &config.video_extensions,
                reporter,
            ));
            let merged = layout.merged_outputs()?;
            steps.push(transcode_files(
                spawner,
                prober,
                config,
                &merged,
                layout.recoded_dir(),
                reporter,
            )?);
        }
        PipelineStage::Joined => {
            ensure_tools(spawner, prober)?;
            steps.push(transcode_files(
                spawner,
                prober,
                config,
                &snapshot.merged_outputs,
                layout.recoded_dir(),
                reporter,
            )?);
        }
        PipelineStage::Recoded => {
            reporter.operation_complete("Everything is already recoded");
        }
    }

    finish(&layout, Some(initial_stage), steps, start, reporter)
}

fn finish(
    layout: &PipelineLayout,
    initial_stage: Option<PipelineStage>,
    steps: Vec<StageReport>,
    start: Instant,
    reporter: &dyn Reporter,
) -> CoreResult<RunSummary> {
    let final_stage = match initial_stage {
        Some(_) => Some(detect_stage(layout)?.stage),
        None => None,
    };

    let summary = RunSummary {
        target_dir: layout.root().to_path_buf(),
        initial_stage,
        final_stage,
        steps,
        elapsed_secs: start.elapsed().as_secs_f64(),
    };

    log::info!(
        "Run finished in {:.1}s with {} failed items",
        summary.elapsed_secs,
        summary.failed_count()
    );
    reporter.run_complete(&summary);
    Ok(summary)
}

/// Clusters the top-level clips and moves them into group directories.
fn group_target(
    config: &CoreConfig,
    layout: &PipelineLayout,
    reporter: &dyn Reporter,
) -> CoreResult<StageReport> {
    let files = find_source_files(layout.root(), &config.video_extensions);
    let plan = group_files(files, &GroupThresholds::from_config(config));

    let mut report = StageReport::new(PipelineStep::Group);
    if plan.groups.is_empty() {
        return Ok(report);
    }

    for entry in &plan.entries {
        reporter.grouping_entry(entry);
    }

    check_group_destinations(layout, &plan.groups)?;

    reporter.step_started(PipelineStep::Group, plan.file_count());
    for group in &plan.groups {
        let materialized = materialize_group(layout, group)?;
        for (file, moved) in group.files.iter().zip(&materialized.moved) {
            report.push(ItemOutcome::Completed {
                input: file.path.clone(),
                output: moved.clone(),
            });
        }
        reporter.group_materialized(&materialized);
    }

    log::info!(
        "Grouped {} clips into {} groups",
        plan.file_count(),
        plan.groups.len()
    );
    Ok(report)
}

/// Recodes the top-level clips of the target directory directly, skipping
/// grouping and joining.
///
/// Output goes to `config.recode_dest`, or the recoded marker directory when
/// unset.
pub fn run_recode_only<S, P>(
    config: &CoreConfig,
    spawner: &S,
    prober: &P,
    reporter: &dyn Reporter,
) -> CoreResult<RunSummary>
where
    S: FfmpegSpawner,
    P: FfprobeExecutor,
{
    config.validate()?;
    ensure_target_dir(&config.target_dir)?;

    let start = Instant::now();
    let layout = PipelineLayout::new(config);
    let dest: PathBuf = config
        .recode_dest
        .clone()
        .unwrap_or_else(|| layout.recoded_dir().to_path_buf());

    if same_directory(&dest, layout.root()) {
        return Err(CoreError::Config(format!(
            "Recode destination must differ from the source directory: {}",
            dest.display()
        )));
    }

    let inputs: Vec<PathBuf> = find_source_files(layout.root(), &config.video_extensions)
        .into_iter()
        .map(|f| f.path)
        .collect();

    let mut steps = Vec::new();
    if inputs.is_empty() {
        reporter.operation_complete("No clips to recode");
    } else {
        ensure_tools(spawner, prober)?;
        steps.push(transcode_files(
            spawner, prober, config, &inputs, &dest, reporter,
        )?);
    }

    finish(&layout, None, steps, start, reporter)
}

fn same_directory(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Reports what a run would do without touching anything.
pub fn plan_pipeline(config: &CoreConfig, reporter: &dyn Reporter) -> CoreResult<PipelinePlan> {
    config.validate()?;
    ensure_target_dir(&config.target_dir)?;

    let layout = PipelineLayout::new(config);
    let snapshot = detect_stage(&layout)?;
    reporter.stage_detected(&snapshot);

    let grouping = if snapshot.stage == PipelineStage::Ungrouped {
        let files = find_source_files(layout.root(), &config.video_extensions);
        let plan = group_files(files, &GroupThresholds::from_config(config));
        for entry in &plan.entries {
            reporter.grouping_entry(entry);
        }
        Some(plan)
    } else {
        None
    };

    let message = match (&snapshot.stage, &grouping) {
        (PipelineStage::Ungrouped, Some(plan)) if !plan.groups.is_empty() => format!(
            "Dry run: would move {} clips into {} groups",
            plan.file_count(),
            plan.groups.len()
        ),
        (PipelineStage::Ungrouped, _) => "Dry run: no clips to group".to_string(),
        (PipelineStage::Grouped, _) => format!(
            "Dry run: would join {} groups, then recode merged files",
            snapshot.pending_joins.len()
        ),
        (PipelineStage::Joined, _) => format!(
            "Dry run: would recode {} merged files",
            snapshot.pending_recodes.len()
        ),
        (PipelineStage::Recoded, _) => "Dry run: everything is already recoded".to_string(),
    };
    reporter.operation_complete(&message);

    Ok(PipelinePlan { snapshot, grouping })
}
