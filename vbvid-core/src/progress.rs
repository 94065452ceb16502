// ============================================================================
// vbvid-core/src/progress.rs
// ============================================================================
//
// PROGRESS TRACKING: ffmpeg progress lines to reporter snapshots
//
// ffmpeg reports the output position as a time string. With the probed
// duration that becomes a percentage and an ETA. Snapshots are emitted only
// when the percentage has moved by at least PROGRESS_STEP_PERCENT (plus the
// final 100%), and the file log gets a line every LOG_STEP_PERCENT or every
// LOG_INTERVAL, whichever comes first.

use crate::reporting::ProgressSnapshot;
use crate::utils::{format_duration, parse_ffmpeg_time};

use ffmpeg_sidecar::event::FfmpegProgress;
use std::time::{Duration, Instant};

const PROGRESS_STEP_PERCENT: f64 = 1.0;
const LOG_STEP_PERCENT: i32 = 10;
const LOG_INTERVAL: Duration = Duration::from_secs(300);

pub struct ProgressTracker {
    duration: Option<f64>,
    start_time: Instant,
    last_progress_percent: f64,
    last_log_time: Instant,
    last_logged_threshold: i32,
}

impl ProgressTracker {
    pub fn new(duration: Option<f64>) -> Self {
        Self {
            duration: duration.filter(|&d| d > 0.0),
            start_time: Instant::now(),
            last_progress_percent: -PROGRESS_STEP_PERCENT,
            last_log_time: Instant::now(),
            last_logged_threshold: -1,
        }
    }

    /// Folds one ffmpeg progress event; returns a snapshot when it is worth reporting.
    pub fn update(&mut self, progress: &FfmpegProgress) -> Option<ProgressSnapshot> {
        let current_secs = parse_ffmpeg_time(&progress.time).unwrap_or(0.0);
        let percent = self
            .duration
            .map_or(0.0, |d| (current_secs / d * 100.0).clamp(0.0, 100.0));

        let finished = percent >= 100.0 && self.last_progress_percent < 100.0;
        if percent < self.last_progress_percent + PROGRESS_STEP_PERCENT && !finished {
            return None;
        }
        self.last_progress_percent = percent;

        let elapsed = self.start_time.elapsed().as_secs_f64();
        let avg_fps = if elapsed > 0.01 {
            f64::from(progress.frame) / elapsed
        } else {
            0.0
        };
        let eta = self.calculate_eta(current_secs, progress.speed);

        self.log_if_needed(percent, current_secs, progress.speed, eta);

        Some(ProgressSnapshot {
            percent: percent as f32,
            current_secs,
            total_secs: self.duration,
            speed: progress.speed,
            fps: avg_fps as f32,
            eta: Duration::from_secs_f64(eta),
        })
    }

    fn calculate_eta(&self, current_secs: f64, speed: f32) -> f64 {
        match self.duration {
            Some(total) if speed > 0.01 && total > current_secs => {
                (total - current_secs) / f64::from(speed)
            }
            _ => 0.0,
        }
    }

    fn log_if_needed(&mut self, percent: f64, current_secs: f64, speed: f32, eta: f64) {
        let threshold = (percent as i32 / LOG_STEP_PERCENT) * LOG_STEP_PERCENT;
        let should_log = threshold > self.last_logged_threshold
            || self.last_log_time.elapsed() >= LOG_INTERVAL;

        if should_log {
            log::info!(
                target: "vbvid::progress",
                "Recode progress: {:.1}% | Time: {} / {} | Speed: {:.2}x | ETA: {}",
                percent,
                format_duration(current_secs),
                self.duration.map_or_else(|| "??:??:??".to_string(), format_duration),
                speed,
                format_duration(eta)
            );
            self.last_log_time = Instant::now();
            self.last_logged_threshold = threshold;
        }
    }
}
