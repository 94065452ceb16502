// ============================================================================
// vbvid-core/src/external/ffmpeg_executor.rs
// ============================================================================
//
// FFMPEG EXECUTOR: FFmpeg Process Management and Abstraction
//
// Traits for spawning ffmpeg and consuming its event stream, the concrete
// ffmpeg-sidecar implementation, and `run_to_completion`, which both the concat
// and transcode drivers use to run one command, forward progress, capture
// stderr and turn a non-zero exit into an `ExternalToolFailure`.

use crate::error::{
    CoreError, CoreResult, command_failed_error, command_start_error, command_wait_error,
};
use crate::external::check_dependency;

use ffmpeg_sidecar::child::FfmpegChild as SidecarChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, FfmpegProgress, LogLevel};
use std::fmt;
use std::process::ExitStatus;

/// Stderr lines kept for error reports. Older lines are dropped.
const STDERR_TAIL_LINES: usize = 40;

// --- FFmpeg Execution Abstraction ---

/// Trait representing an active ffmpeg process instance.
pub trait FfmpegProcess {
    /// Processes events from the running command using a provided handler closure.
    fn handle_events<F>(&mut self, handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>;

    /// Waits for the command to complete and returns its exit status.
    fn wait(&mut self) -> CoreResult<ExitStatus>;
}

/// Trait representing something that can spawn an FfmpegProcess.
pub trait FfmpegSpawner {
    type Process: FfmpegProcess;

    /// Spawns the ffmpeg command, consuming the command object.
    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process>;

    /// Checks that the underlying binary can be run. Called once before the
    /// first join or recode of a run.
    fn ensure_available(&self) -> CoreResult<()> {
        Ok(())
    }
}

// --- Concrete Implementation using ffmpeg-sidecar ---

/// Wrapper around `ffmpeg_sidecar::child::FfmpegChild` implementing `FfmpegProcess`.
pub struct SidecarProcess(SidecarChild);

impl FfmpegProcess for SidecarProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        let iterator = self.0.iter().map_err(|e| {
            log::error!("Failed to get ffmpeg event iterator: {}", e);
            event_stream_error(e)
        })?;
        for event in iterator {
            handler(event)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        self.0.wait().map_err(|e| command_wait_error("ffmpeg", e))
    }
}

/// Error for an ffmpeg whose output could not be attached. The process may
/// still be running, so no exit status is reported.
fn event_stream_error(err: impl fmt::Display) -> CoreError {
    CoreError::OperationFailed(format!("Failed to read ffmpeg output events: {err}"))
}

/// Concrete implementation of `FfmpegSpawner` using `ffmpeg-sidecar`.
#[derive(Debug, Clone, Default)]
pub struct SidecarSpawner;

impl FfmpegSpawner for SidecarSpawner {
    type Process = SidecarProcess;

    fn spawn(&self, mut cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        cmd.spawn()
            .map(SidecarProcess)
            .map_err(|e| command_start_error("ffmpeg", e))
    }

    fn ensure_available(&self) -> CoreResult<()> {
        check_dependency("ffmpeg").map(|_| ())
    }
}

// --- Running a command to completion ---

/// Collects the stderr tail of a running ffmpeg and forwards progress events.
struct OutputCollector<F> {
    stderr_lines: Vec<String>,
    on_progress: F,
}

impl<F: FnMut(&FfmpegProgress)> OutputCollector<F> {
    fn new(on_progress: F) -> Self {
        Self {
            stderr_lines: Vec::new(),
            on_progress,
        }
    }

    fn handle_event(&mut self, event: FfmpegEvent) {
        match event {
            FfmpegEvent::Progress(progress) => (self.on_progress)(&progress),
            FfmpegEvent::Log(level, message) => match level {
                LogLevel::Fatal | LogLevel::Error => {
                    log::error!(target: "ffmpeg_log", "{message}");
                    self.push_line(message);
                }
                LogLevel::Warning => {
                    log::warn!(target: "ffmpeg_log", "{message}");
                    self.push_line(message);
                }
                _ => log::trace!(target: "ffmpeg_log", "{message}"),
            },
            FfmpegEvent::Error(error) => {
                log::debug!("ffmpeg stderr error: {error}");
                self.push_line(error);
            }
            _ => {}
        }
    }

    fn push_line(&mut self, line: String) {
        if self.stderr_lines.len() == STDERR_TAIL_LINES {
            self.stderr_lines.remove(0);
        }
        self.stderr_lines.push(line);
    }

    fn stderr(&self) -> String {
        self.stderr_lines.join("\n")
    }
}

/// Spawns `cmd`, drains its events and waits for it.
///
/// `tool` labels the command in errors (e.g. "ffmpeg (concat)"). A non-zero
/// exit becomes `ExternalToolFailure` carrying the exit code and the last
/// stderr lines.
pub fn run_to_completion<S, F>(
    spawner: &S,
    mut cmd: FfmpegCommand,
    tool: &str,
    on_progress: F,
) -> CoreResult<()>
where
    S: FfmpegSpawner,
    F: FnMut(&FfmpegProgress),
{
    let args: Vec<String> = cmd
        .as_inner()
        .get_args()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();
    log::debug!("Running {}: ffmpeg {}", tool, args.join(" "));

    let mut process = spawner.spawn(cmd)?;
    let mut collector = OutputCollector::new(on_progress);
    process.handle_events(|event| {
        collector.handle_event(event);
        Ok(())
    })?;

    let status = process.wait()?;
    if !status.success() {
        log::error!("{} exited with {}", tool, status);
        return Err(command_failed_error(tool, status, collector.stderr()));
    }

    Ok(())
}
