// ============================================================================
// vbvid-core/src/concat.rs
// ============================================================================
//
// CONCAT DRIVER: Lossless joining of a group's clips
//
// Each group directory becomes one merged file through ffmpeg's concat
// demuxer with stream copy. The manifest lists the clips in timestamp order
// (the same order the grouping stage used), one `file '<path>'` line each.
// Manifest and in-progress output are hidden temp files next to the merged
// file; the output only gets its final name once ffmpeg exits successfully.

use crate::discovery::{SourceFile, find_source_files};
use crate::error::{CoreError, CoreResult};
use crate::external::{FfmpegSpawner, run_to_completion};
use crate::layout::PipelineLayout;
use crate::reporting::{ItemOutcome, ItemStart, PipelineStep, Reporter, StageReport};
use crate::temp_files;

use ffmpeg_sidecar::command::FfmpegCommand;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Quotes a path for a concat manifest line.
///
/// The demuxer reads single-quoted strings; an embedded quote is written as
/// `'\''` (close, escaped quote, reopen).
pub fn escape_manifest_path(path: &Path) -> String {
    path.to_string_lossy().replace('\'', r"'\''")
}

/// Writes one `file '<path>'` line per clip.
pub fn write_manifest<W: Write>(writer: &mut W, clips: &[PathBuf]) -> std::io::Result<()> {
    for clip in clips {
        writeln!(writer, "file '{}'", escape_manifest_path(clip))?;
    }
    writer.flush()
}

/// ffmpeg command joining the manifest's clips into `output` without re-encoding.
pub fn build_concat_command(manifest: &Path, output: &Path) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new();
    cmd.args(["-f", "concat", "-safe", "0"]);
    cmd.input(manifest.to_string_lossy().as_ref());
    // Default stream selection: camera data tracks (tmcd, gpmd) have no mp4 tag.
    cmd.args(["-c", "copy"]);
    cmd.overwrite();
    cmd.output(output.to_string_lossy().as_ref());
    cmd
}

/// Joins `clips` (already in order) into `output`.
///
/// Clip paths are made absolute since the demuxer resolves relative entries
/// against the manifest's directory.
pub fn join_clips<S: FfmpegSpawner>(
    spawner: &S,
    clips: &[SourceFile],
    output: &Path,
) -> CoreResult<()> {
    if clips.is_empty() {
        return Err(CoreError::OperationFailed(format!(
            "No clips to join into {}",
            output.display()
        )));
    }

    let output_dir = output.parent().ok_or_else(|| {
        CoreError::PathError(format!("Output has no parent: {}", output.display()))
    })?;
    std::fs::create_dir_all(output_dir)?;

    let clip_paths = clips
        .iter()
        .map(|clip| std::path::absolute(&clip.path))
        .collect::<std::io::Result<Vec<_>>>()?;

    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "concat".to_string());
    let mut manifest = temp_files::create_temp_file(output_dir, &format!("{stem}.list"), "txt")?;
    write_manifest(manifest.as_file_mut(), &clip_paths)?;

    let partial = temp_files::create_partial_output(output)?;
    let cmd = build_concat_command(manifest.path(), &partial);
    run_to_completion(spawner, cmd, "ffmpeg (concat)", |_| {})?;

    temp_files::persist_output(partial, output)?;
    log::info!("Joined {} clips into {}", clips.len(), output.display());
    Ok(())
}

/// Joins every group directory in `group_dirs`.
///
/// Callers pass only groups without a merged output. A failed join is
/// recorded and the remaining groups still run.
pub fn join_groups<S: FfmpegSpawner>(
    spawner: &S,
    layout: &PipelineLayout,
    group_dirs: &[PathBuf],
    extensions: &[String],
    reporter: &dyn Reporter,
) -> StageReport {
    let mut report = StageReport::new(PipelineStep::Join);
    reporter.step_started(PipelineStep::Join, group_dirs.len());

    for (idx, group_dir) in group_dirs.iter().enumerate() {
        let outcome = join_one(spawner, layout, group_dir, extensions, idx, group_dirs.len(), reporter);
        if let ItemOutcome::Failed { error, .. } = &outcome {
            log::error!("Join failed for {}: {}", group_dir.display(), error);
        }
        reporter.item_finished(PipelineStep::Join, &outcome);
        report.push(outcome);
    }

    report
}

fn join_one<S: FfmpegSpawner>(
    spawner: &S,
    layout: &PipelineLayout,
    group_dir: &Path,
    extensions: &[String],
    idx: usize,
    total: usize,
    reporter: &dyn Reporter,
) -> ItemOutcome {
    let output = match layout.merged_output_for(group_dir) {
        Ok(output) => output,
        Err(e) => {
            return ItemOutcome::Failed {
                input: group_dir.to_path_buf(),
                error: e.to_string(),
            };
        }
    };

    let clips = find_source_files(group_dir, extensions);
    if clips.is_empty() {
        let message = format!("{} contains no clips", group_dir.display());
        log::warn!("{message}");
        reporter.warning(&message);
        return ItemOutcome::Skipped {
            input: group_dir.to_path_buf(),
            reason: "no clips".to_string(),
        };
    }

    reporter.item_started(&ItemStart {
        step: PipelineStep::Join,
        index: idx + 1,
        total,
        input: group_dir.to_path_buf(),
        output: output.clone(),
    });

    match join_clips(spawner, &clips, &output) {
        Ok(()) => ItemOutcome::Completed {
            input: group_dir.to_path_buf(),
            output,
        },
        Err(e) => ItemOutcome::Failed {
            input: group_dir.to_path_buf(),
            error: e.to_string(),
        },
    }
}
