// vbvid-core/tests/common/mod.rs
//
// Test doubles for the external tool traits, plus helpers for building clip
// directories with controlled modification times.

#![allow(dead_code)]

use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, FfmpegProgress};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::rc::Rc;
use std::time::{Duration, SystemTime};

use vbvid_core::external::{FfmpegProcess, FfmpegSpawner, FfprobeExecutor, VideoStreamInfo};
use vbvid_core::{CoreError, CoreResult};

/// Base time for generated clips (2023-02-25 13:00:00 UTC).
pub fn base_time() -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(1_677_330_000)
}

/// Creates `name` in `dir` with its mtime `offset_secs` after [`base_time`].
pub fn create_clip(dir: &Path, name: &str, offset_secs: u64) -> PathBuf {
    let path = dir.join(name);
    let mut file = File::create(&path).expect("Failed to create clip");
    file.write_all(b"dummy clip").expect("Failed to write clip");
    file.set_modified(base_time() + Duration::from_secs(offset_secs))
        .expect("Failed to set mtime");
    path
}

/// Mock ffmpeg process replaying canned events.
pub struct MockFfmpegProcess {
    events: Vec<FfmpegEvent>,
    exit_status: ExitStatus,
}

impl FfmpegProcess for MockFfmpegProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        for event in self.events.drain(..) {
            handler(event)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        Ok(self.exit_status)
    }
}

/// Mock spawner. Every call is recorded; a successful call writes a small
/// file at the command's last argument, standing in for ffmpeg's output.
/// Calls whose arguments contain a registered failure pattern exit non-zero.
#[derive(Clone, Default)]
pub struct MockFfmpegSpawner {
    received_calls: Rc<RefCell<Vec<Vec<String>>>>,
    failures: Rc<RefCell<Vec<(String, i32)>>>,
    progress_events: Rc<RefCell<Vec<FfmpegEvent>>>,
    manifests: Rc<RefCell<Vec<String>>>,
    unavailable: bool,
}

impl MockFfmpegSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// A spawner whose binary check fails.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn fail_when_args_contain(&self, pattern: &str, exit_code: i32) {
        self.failures
            .borrow_mut()
            .push((pattern.to_string(), exit_code));
    }

    pub fn emit_progress(&self, times: &[&str]) {
        let mut events = self.progress_events.borrow_mut();
        for time in times {
            events.push(FfmpegEvent::Progress(FfmpegProgress {
                frame: 100,
                fps: 30.0,
                q: 28.0,
                size_kb: 512,
                time: (*time).to_string(),
                bitrate_kbps: 1000.0,
                speed: 1.0,
                raw_log_message: String::new(),
            }));
        }
    }

    /// Contents of the concat manifests seen so far, read at spawn time.
    pub fn manifests(&self) -> Vec<String> {
        self.manifests.borrow().clone()
    }

    pub fn get_received_calls(&self) -> Vec<Vec<String>> {
        self.received_calls.borrow().clone()
    }

    pub fn calls_containing(&self, arg: &str) -> Vec<Vec<String>> {
        self.get_received_calls()
            .into_iter()
            .filter(|args| args.iter().any(|a| a == arg))
            .collect()
    }
}

impl FfmpegSpawner for MockFfmpegSpawner {
    type Process = MockFfmpegProcess;

    fn spawn(&self, mut cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        let args: Vec<String> = cmd
            .as_inner()
            .get_args()
            .map(|s| s.to_string_lossy().into_owned())
            .collect();
        self.received_calls.borrow_mut().push(args.clone());

        if args.iter().any(|a| a == "concat") {
            if let Some(pos) = args.iter().position(|a| a == "-i") {
                let manifest = std::fs::read_to_string(&args[pos + 1])
                    .expect("Manifest should exist while ffmpeg runs");
                self.manifests.borrow_mut().push(manifest);
            }
        }

        let failure = self
            .failures
            .borrow()
            .iter()
            .find(|(pattern, _)| args.iter().any(|a| a.contains(pattern.as_str())))
            .map(|(_, code)| *code);

        if let Some(code) = failure {
            return Ok(MockFfmpegProcess {
                events: vec![FfmpegEvent::Error(format!("mock failure {code}"))],
                exit_status: ExitStatus::from_raw(code << 8),
            });
        }

        if let Some(output) = args.last() {
            std::fs::write(output, b"mock output").expect("Mock failed to write output");
        }

        Ok(MockFfmpegProcess {
            events: self.progress_events.borrow().clone(),
            exit_status: ExitStatus::from_raw(0),
        })
    }

    fn ensure_available(&self) -> CoreResult<()> {
        if self.unavailable {
            Err(CoreError::DependencyNotFound("ffmpeg".to_string()))
        } else {
            Ok(())
        }
    }
}

/// Mock prober keyed by file name. Unknown files get `default_info`.
#[derive(Clone)]
pub struct MockFfprobeExecutor {
    default_info: VideoStreamInfo,
    overrides: Rc<RefCell<HashMap<String, Option<VideoStreamInfo>>>>,
    probed: Rc<RefCell<Vec<PathBuf>>>,
}

impl Default for MockFfprobeExecutor {
    fn default() -> Self {
        Self {
            default_info: VideoStreamInfo {
                width: 1920,
                height: 1080,
                duration_secs: Some(60.0),
            },
            overrides: Rc::default(),
            probed: Rc::default(),
        }
    }
}

impl MockFfprobeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_info(&self, file_name: &str, info: VideoStreamInfo) {
        self.overrides
            .borrow_mut()
            .insert(file_name.to_string(), Some(info));
    }

    /// Probing `file_name` fails with `VideoInfoError`.
    pub fn fail_for(&self, file_name: &str) {
        self.overrides.borrow_mut().insert(file_name.to_string(), None);
    }

    pub fn probed(&self) -> Vec<PathBuf> {
        self.probed.borrow().clone()
    }
}

impl FfprobeExecutor for MockFfprobeExecutor {
    fn get_video_stream_info(&self, input_path: &Path) -> CoreResult<VideoStreamInfo> {
        self.probed.borrow_mut().push(input_path.to_path_buf());
        let name = input_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        match self.overrides.borrow().get(&name) {
            Some(Some(info)) => Ok(*info),
            Some(None) => Err(CoreError::VideoInfoError(format!(
                "No video stream found in {}",
                input_path.display()
            ))),
            None => Ok(self.default_info),
        }
    }
}
