// ============================================================================
// vbvid-core/src/transcode.rs
// ============================================================================
//
// TRANSCODE DRIVER: HEVC recode of merged files
//
// Each input is probed for its first video stream. The width picks the CRF
// (sources strictly wider than the threshold get the high-resolution value),
// then ffmpeg re-encodes video with the configured encoder and copies audio.
// An input whose destination already exists is skipped without probing, which
// is what makes repeated runs cheap.

use crate::config::CoreConfig;
use crate::error::CoreResult;
use crate::external::{FfmpegSpawner, FfprobeExecutor, run_to_completion};
use crate::layout::recoded_output_in;
use crate::progress::ProgressTracker;
use crate::reporting::{ItemOutcome, ItemStart, PipelineStep, Reporter, StageReport, TranscodeStart};
use crate::temp_files;
use crate::utils::{calculate_size_reduction, format_bytes};

use ffmpeg_sidecar::command::FfmpegCommand;
use std::path::{Path, PathBuf};

/// Encoding parameters for one ffmpeg invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeParams {
    pub input: PathBuf,
    pub output: PathBuf,
    pub quality: u8,
    pub video_codec: String,
    pub codec_tag: String,
}

/// CRF for a source of the given width.
pub fn select_quality(width: u32, config: &CoreConfig) -> u8 {
    if width > config.high_res_width_threshold {
        config.quality_high_res
    } else {
        config.quality_standard
    }
}

pub fn build_transcode_command(params: &TranscodeParams) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new();
    cmd.input(params.input.to_string_lossy().as_ref());
    cmd.args(["-map", "0:v:0", "-map", "0:a?"]);
    cmd.args(["-c:v", params.video_codec.as_str()]);
    cmd.args(["-crf", params.quality.to_string().as_str()]);
    cmd.args(["-tag:v", params.codec_tag.as_str()]);
    cmd.args(["-c:a", "copy"]);
    cmd.args(["-movflags", "+faststart"]);
    cmd.overwrite();
    cmd.output(params.output.to_string_lossy().as_ref());
    cmd
}

/// Probes and recodes `input` into `output`.
///
/// Output is written to a hidden partial file and renamed on success, so a
/// failed or interrupted recode leaves no file at `output`.
pub fn transcode_file<S, P>(
    spawner: &S,
    prober: &P,
    config: &CoreConfig,
    input: &Path,
    output: &Path,
    reporter: &dyn Reporter,
) -> CoreResult<()>
where
    S: FfmpegSpawner,
    P: FfprobeExecutor,
{
    let info = prober.get_video_stream_info(input)?;
    let quality = select_quality(info.width, config);
    log::info!(
        "Recoding {} ({}x{}) with crf {}",
        input.display(),
        info.width,
        info.height,
        quality
    );

    reporter.transcode_started(&TranscodeStart {
        input: input.to_path_buf(),
        width: info.width,
        height: info.height,
        quality,
        duration_secs: info.duration_secs,
    });

    let partial = temp_files::create_partial_output(output)?;
    let params = TranscodeParams {
        input: input.to_path_buf(),
        output: partial.to_path_buf(),
        quality,
        video_codec: config.video_codec.clone(),
        codec_tag: config.codec_tag.clone(),
    };

    let mut tracker = ProgressTracker::new(info.duration_secs);
    run_to_completion(
        spawner,
        build_transcode_command(&params),
        "ffmpeg (transcode)",
        |progress| {
            if let Some(snapshot) = tracker.update(progress) {
                reporter.transcode_progress(&snapshot);
            }
        },
    )?;

    temp_files::persist_output(partial, output)?;
    log_size_change(input, output);
    Ok(())
}

fn log_size_change(input: &Path, output: &Path) {
    if let (Ok(before), Ok(after)) = (std::fs::metadata(input), std::fs::metadata(output)) {
        log::info!(
            "Recoded {}: {} -> {} ({}% smaller)",
            input.display(),
            format_bytes(before.len()),
            format_bytes(after.len()),
            calculate_size_reduction(before.len(), after.len())
        );
    }
}

/// Recodes every input into `dest_dir`, keeping file names.
///
/// Existing destinations are skipped and a failing item does not stop the
/// batch. Only failing to create `dest_dir` is fatal.
pub fn transcode_files<S, P>(
    spawner: &S,
    prober: &P,
    config: &CoreConfig,
    inputs: &[PathBuf],
    dest_dir: &Path,
    reporter: &dyn Reporter,
) -> CoreResult<StageReport>
where
    S: FfmpegSpawner,
    P: FfprobeExecutor,
{
    std::fs::create_dir_all(dest_dir)?;

    let mut report = StageReport::new(PipelineStep::Recode);
    reporter.step_started(PipelineStep::Recode, inputs.len());

    for (idx, input) in inputs.iter().enumerate() {
        let outcome = match recoded_output_in(dest_dir, input) {
            Err(e) => ItemOutcome::Failed {
                input: input.clone(),
                error: e.to_string(),
            },
            Ok(output) if output.exists() => {
                log::debug!("Skipping {}: {} exists", input.display(), output.display());
                ItemOutcome::Skipped {
                    input: input.clone(),
                    reason: "already recoded".to_string(),
                }
            }
            Ok(output) => {
                reporter.item_started(&ItemStart {
                    step: PipelineStep::Recode,
                    index: idx + 1,
                    total: inputs.len(),
                    input: input.clone(),
                    output: output.clone(),
                });
                match transcode_file(spawner, prober, config, input, &output, reporter) {
                    Ok(()) => ItemOutcome::Completed {
                        input: input.clone(),
                        output,
                    },
                    Err(e) => {
                        log::error!("Recode failed for {}: {}", input.display(), e);
                        ItemOutcome::Failed {
                            input: input.clone(),
                            error: e.to_string(),
                        }
                    }
                }
            }
        };

        reporter.item_finished(PipelineStep::Recode, &outcome);
        report.push(outcome);
    }

    Ok(report)
}
