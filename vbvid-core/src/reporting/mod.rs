//! Reporting of pipeline events.
//!
//! The core never prints. Every user-facing event goes through a [`Reporter`];
//! the CLI picks the terminal or JSON implementation and tests use
//! [`NullReporter`].

mod summary;

pub use summary::{ItemOutcome, PipelineStep, RunSummary, StageReport};

use crate::grouping::{GroupingEntry, MaterializedGroup};
use crate::stage::StageSnapshot;
use crate::utils::{format_duration, format_gap};

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// One join or recode item about to run.
#[derive(Clone, Debug)]
pub struct ItemStart {
    pub step: PipelineStep,
    /// 1-based position within the step.
    pub index: usize,
    pub total: usize,
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Encoding parameters chosen for one recode item.
#[derive(Clone, Debug)]
pub struct TranscodeStart {
    pub input: PathBuf,
    pub width: u32,
    pub height: u32,
    pub quality: u8,
    pub duration_secs: Option<f64>,
}

/// Snapshot of recode progress.
#[derive(Clone, Debug)]
pub struct ProgressSnapshot {
    pub percent: f32,
    pub current_secs: f64,
    pub total_secs: Option<f64>,
    pub speed: f32,
    pub fps: f32,
    pub eta: Duration,
}

/// Reporter interface implemented by both human-readable and JSON reporters.
pub trait Reporter: Send + Sync {
    fn stage_detected(&self, _snapshot: &StageSnapshot) {}
    fn grouping_entry(&self, _entry: &GroupingEntry) {}
    fn group_materialized(&self, _group: &MaterializedGroup) {}
    fn step_started(&self, _step: PipelineStep, _total_items: usize) {}
    fn item_started(&self, _item: &ItemStart) {}
    fn transcode_started(&self, _info: &TranscodeStart) {}
    fn transcode_progress(&self, _progress: &ProgressSnapshot) {}
    fn item_finished(&self, _step: PipelineStep, _outcome: &ItemOutcome) {}
    fn warning(&self, _message: &str) {}
    fn operation_complete(&self, _message: &str) {}
    fn run_complete(&self, _summary: &RunSummary) {}
}

/// No-op reporter that discards all updates.
pub struct NullReporter;

impl Reporter for NullReporter {}

/// Human-friendly reporter that prints concise text output.
pub struct TerminalReporter {
    progress: Mutex<Option<ProgressBar>>,
    max_percent: Mutex<f32>,
    grouping_header_shown: Mutex<bool>,
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self {
            progress: Mutex::new(None),
            max_percent: Mutex::new(0.0),
            grouping_header_shown: Mutex::new(false),
        }
    }

    fn finish_progress(&self) {
        if let Ok(mut guard) = self.progress.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
        if let Ok(mut max_percent) = self.max_percent.lock() {
            *max_percent = 0.0;
        }
    }

    fn start_progress(&self) {
        self.finish_progress();
        let pb = ProgressBar::new(100);
        if let Ok(bar_style) =
            ProgressStyle::default_bar().template("Recoding [{bar:40}] {percent:>3}% | {msg}")
        {
            pb.set_style(bar_style.progress_chars("=> "));
        }
        pb.enable_steady_tick(Duration::from_millis(120));
        if let Ok(mut guard) = self.progress.lock() {
            *guard = Some(pb);
        }
    }

    fn update_progress_bar(&self, progress: &ProgressSnapshot) {
        let (Ok(guard), Ok(mut max_percent)) = (self.progress.lock(), self.max_percent.lock())
        else {
            return;
        };
        let Some(pb) = guard.as_ref() else {
            return;
        };

        let clamped = progress.percent.clamp(0.0, 100.0);
        if clamped >= *max_percent {
            *max_percent = clamped;
            pb.set_position(clamped as u64);
        }

        pb.set_message(format!(
            "speed {:.1}x, fps {:.1}, eta {}",
            progress.speed,
            progress.fps,
            format_duration(progress.eta.as_secs_f64())
        ));
    }
}

impl Reporter for TerminalReporter {
    fn stage_detected(&self, snapshot: &StageSnapshot) {
        println!(
            "\n{} {}",
            style("STAGE").bold().cyan(),
            style(snapshot.stage).bold()
        );
        println!(
            "  {} groups, {} merged, {} to join, {} to recode",
            snapshot.group_dirs.len(),
            snapshot.merged_outputs.len(),
            snapshot.pending_joins.len(),
            snapshot.pending_recodes.len()
        );
    }

    fn grouping_entry(&self, entry: &GroupingEntry) {
        if let Ok(mut shown) = self.grouping_header_shown.lock() {
            if !*shown {
                println!("\n{}", style("GROUPING").bold().cyan());
                *shown = true;
            }
        }
        let marker = entry.annotation.marker();
        let marker = match marker {
            "*" => style(marker).green().bold().to_string(),
            "TO" => style(marker).yellow().bold().to_string(),
            _ => String::new(),
        };
        println!(
            "  {:>3}  {:<24} {}  {:>8}  {}",
            entry.group_index,
            entry.file.file_name(),
            entry.file.timestamp.format("%Y-%m-%d %H:%M:%S"),
            format_gap(entry.gap),
            marker
        );
    }

    fn group_materialized(&self, group: &MaterializedGroup) {
        println!(
            "  {}{} ({} clips)",
            style("› ").magenta(),
            group.dir.display(),
            group.moved.len()
        );
    }

    fn step_started(&self, step: PipelineStep, total_items: usize) {
        println!(
            "\n{} ({} items)",
            style(step.to_string().to_uppercase()).bold().cyan(),
            total_items
        );
    }

    fn item_started(&self, item: &ItemStart) {
        println!(
            "  {}[{}/{}] {} -> {}",
            style("› ").magenta(),
            item.index,
            item.total,
            item.input.display(),
            item.output.display()
        );
    }

    fn transcode_started(&self, info: &TranscodeStart) {
        println!(
            "    {} {}x{}, crf {}{}",
            style("Source:").bold(),
            info.width,
            info.height,
            info.quality,
            info.duration_secs
                .map(|d| format!(", {}", format_duration(d)))
                .unwrap_or_default()
        );
        self.start_progress();
    }

    fn transcode_progress(&self, progress: &ProgressSnapshot) {
        self.update_progress_bar(progress);
    }

    fn item_finished(&self, _step: PipelineStep, outcome: &ItemOutcome) {
        self.finish_progress();
        match outcome {
            ItemOutcome::Completed { output, .. } => {
                println!("    {} {}", style("✓").green().bold(), output.display());
            }
            ItemOutcome::Skipped { input, reason } => {
                println!(
                    "    {} {} ({})",
                    style("skipped").dim(),
                    input.display(),
                    reason
                );
            }
            ItemOutcome::Failed { input, error } => {
                eprintln!(
                    "    {} {}: {}",
                    style("FAILED").red().bold(),
                    input.display(),
                    error
                );
            }
        }
    }

    fn warning(&self, message: &str) {
        println!("\n{}", style(format!("WARN: {message}")).yellow().bold());
    }

    fn operation_complete(&self, message: &str) {
        println!("\n{} {}", style("✓").green().bold(), style(message).bold());
    }

    fn run_complete(&self, summary: &RunSummary) {
        self.finish_progress();
        println!("\n{}", style("SUMMARY").bold().cyan());
        if summary.steps.is_empty() {
            println!("  Nothing to do");
        }
        for report in &summary.steps {
            println!(
                "  {:<9} {} done, {} skipped, {}",
                format!("{}:", report.step),
                report.completed_count(),
                report.skipped_count(),
                if report.failed_count() > 0 {
                    style(format!("{} failed", report.failed_count())).red().bold()
                } else {
                    style("0 failed".to_string()).dim()
                }
            );
        }
        let failed = failed_item_lines(summary);
        if !failed.is_empty() {
            println!("\n{}", style("FAILED").bold().red());
            for line in &failed {
                println!("  {}", style(line).red());
            }
        }
        if let Some(stage) = summary.final_stage {
            println!("  {:<9} {}", "Stage:", style(stage).bold());
        }
        println!("  {:<9} {}", "Time:", format_duration(summary.elapsed_secs));
    }
}

/// One line per failed item: step, input path and error.
fn failed_item_lines(summary: &RunSummary) -> Vec<String> {
    summary
        .failures()
        .map(|(step, input, error)| format!("{step}: {}: {error}", input.display()))
        .collect()
}

/// Reporter writing one JSON object per line.
pub struct JsonReporter {
    writer: Mutex<Box<dyn Write + Send>>,
    last_progress_bucket: Mutex<i32>,
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonReporter {
    pub fn new() -> Self {
        Self::with_writer(Box::new(io::stdout()))
    }

    pub fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
            last_progress_bucket: Mutex::new(-1),
        }
    }

    fn timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }

    fn write_value(&self, value: serde_json::Value) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{value}");
            let _ = writer.flush();
        }
    }
}

impl Reporter for JsonReporter {
    fn stage_detected(&self, snapshot: &StageSnapshot) {
        self.write_value(json!({
            "type": "stage_detected",
            "stage": snapshot.stage,
            "group_dirs": snapshot.group_dirs,
            "pending_joins": snapshot.pending_joins,
            "merged_outputs": snapshot.merged_outputs,
            "pending_recodes": snapshot.pending_recodes,
            "timestamp": Self::timestamp(),
        }));
    }

    fn grouping_entry(&self, entry: &GroupingEntry) {
        self.write_value(json!({
            "type": "grouping_entry",
            "file": entry.file.path,
            "modified": entry.file.timestamp.to_rfc3339(),
            "gap_seconds": entry.gap.map(|g| g.num_seconds()),
            "annotation": entry.annotation,
            "group_index": entry.group_index,
            "timestamp": Self::timestamp(),
        }));
    }

    fn group_materialized(&self, group: &MaterializedGroup) {
        self.write_value(json!({
            "type": "group_materialized",
            "group_index": group.index,
            "dir": group.dir,
            "files": group.moved,
            "timestamp": Self::timestamp(),
        }));
    }

    fn step_started(&self, step: PipelineStep, total_items: usize) {
        self.write_value(json!({
            "type": "step_started",
            "step": step,
            "total_items": total_items,
            "timestamp": Self::timestamp(),
        }));
    }

    fn item_started(&self, item: &ItemStart) {
        self.write_value(json!({
            "type": "item_started",
            "step": item.step,
            "index": item.index,
            "total": item.total,
            "input": item.input,
            "output": item.output,
            "timestamp": Self::timestamp(),
        }));
    }

    fn transcode_started(&self, info: &TranscodeStart) {
        if let Ok(mut bucket) = self.last_progress_bucket.lock() {
            *bucket = -1;
        }
        self.write_value(json!({
            "type": "transcode_started",
            "input": info.input,
            "width": info.width,
            "height": info.height,
            "quality": info.quality,
            "duration_seconds": info.duration_secs,
            "timestamp": Self::timestamp(),
        }));
    }

    fn transcode_progress(&self, progress: &ProgressSnapshot) {
        let bucket = (progress.percent as i32) / 5;
        {
            let Ok(mut guard) = self.last_progress_bucket.lock() else {
                return;
            };
            if bucket <= *guard && progress.percent < 99.0 {
                return;
            }
            *guard = bucket;
        }

        self.write_value(json!({
            "type": "transcode_progress",
            "percent": progress.percent,
            "current_seconds": progress.current_secs,
            "total_seconds": progress.total_secs,
            "speed": progress.speed,
            "fps": progress.fps,
            "eta_seconds": progress.eta.as_secs(),
            "timestamp": Self::timestamp(),
        }));
    }

    fn item_finished(&self, step: PipelineStep, outcome: &ItemOutcome) {
        self.write_value(json!({
            "type": "item_finished",
            "step": step,
            "outcome": outcome,
            "timestamp": Self::timestamp(),
        }));
    }

    fn warning(&self, message: &str) {
        self.write_value(json!({
            "type": "warning",
            "message": message,
            "timestamp": Self::timestamp(),
        }));
    }

    fn operation_complete(&self, message: &str) {
        self.write_value(json!({
            "type": "operation_complete",
            "message": message,
            "timestamp": Self::timestamp(),
        }));
    }

    fn run_complete(&self, summary: &RunSummary) {
        self.write_value(json!({
            "type": "run_complete",
            "summary": summary,
            "failed": summary.failed_count(),
            "timestamp": Self::timestamp(),
        }));
    }
}
