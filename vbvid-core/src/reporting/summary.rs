//! Per-item outcomes and run summaries.
//!
//! Join and recode work item by item: one item failing is recorded here and
//! the batch moves on. The CLI turns [`RunSummary::has_failures`] into the
//! process exit code.

use crate::stage::PipelineStage;

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// A mutating step of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStep {
    Group,
    Join,
    Recode,
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PipelineStep::Group => "grouping",
            PipelineStep::Join => "joining",
            PipelineStep::Recode => "recoding",
        })
    }
}

/// What happened to one input of a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemOutcome {
    Completed { input: PathBuf, output: PathBuf },
    Skipped { input: PathBuf, reason: String },
    Failed { input: PathBuf, error: String },
}

impl ItemOutcome {
    pub fn input(&self) -> &Path {
        match self {
            ItemOutcome::Completed { input, .. }
            | ItemOutcome::Skipped { input, .. }
            | ItemOutcome::Failed { input, .. } => input,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ItemOutcome::Failed { .. })
    }
}

/// Outcomes of one step, in processing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub step: PipelineStep,
    pub items: Vec<ItemOutcome>,
}

impl StageReport {
    pub fn new(step: PipelineStep) -> Self {
        Self {
            step,
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, outcome: ItemOutcome) {
        self.items.push(outcome);
    }

    pub fn completed_count(&self) -> usize {
        self.items
            .iter()
            .filter(|o| matches!(o, ItemOutcome::Completed { .. }))
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.items
            .iter()
            .filter(|o| matches!(o, ItemOutcome::Skipped { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.failures().count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.items.iter().filter(|o| o.is_failed())
    }
}

/// Everything a run did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub target_dir: PathBuf,
    /// Stage detected at the start; `None` for recode-only runs.
    pub initial_stage: Option<PipelineStage>,
    /// Stage detected at the end; `None` for recode-only runs.
    pub final_stage: Option<PipelineStage>,
    pub steps: Vec<StageReport>,
    pub elapsed_secs: f64,
}

impl RunSummary {
    pub fn step(&self, step: PipelineStep) -> Option<&StageReport> {
        self.steps.iter().find(|r| r.step == step)
    }

    pub fn failed_count(&self) -> usize {
        self.steps.iter().map(StageReport::failed_count).sum()
    }

    pub fn has_failures(&self) -> bool {
        self.failed_count() > 0
    }

    /// Every failed item across all steps, as (step, input, error).
    pub fn failures(&self) -> impl Iterator<Item = (PipelineStep, &Path, &str)> {
        self.steps.iter().flat_map(|report| {
            report.items.iter().filter_map(move |outcome| match outcome {
                ItemOutcome::Failed { input, error } => {
                    Some((report.step, input.as_path(), error.as_str()))
                }
                _ => None,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_failures() {
        let mut report = StageReport::new(PipelineStep::Recode);
        report.push(ItemOutcome::Completed {
            input: PathBuf::from("a.mp4"),
            output: PathBuf::from(".recoded/a.mp4"),
        });
        report.push(ItemOutcome::Skipped {
            input: PathBuf::from("b.mp4"),
            reason: "already recoded".to_string(),
        });
        report.push(ItemOutcome::Failed {
            input: PathBuf::from("c.mp4"),
            error: "boom".to_string(),
        });

        assert_eq!(report.completed_count(), 1);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.failed_count(), 1);

        let summary = RunSummary {
            target_dir: PathBuf::from("/clips"),
            initial_stage: Some(PipelineStage::Joined),
            final_stage: Some(PipelineStage::Joined),
            steps: vec![report],
            elapsed_secs: 1.0,
        };
        assert!(summary.has_failures());
        assert!(summary.step(PipelineStep::Join).is_none());

        let failures: Vec<_> = summary.failures().collect();
        assert_eq!(
            failures,
            vec![(PipelineStep::Recode, Path::new("c.mp4"), "boom")]
        );
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let outcome = ItemOutcome::Skipped {
            input: PathBuf::from("group03"),
            reason: "no clips".to_string(),
        };
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["status"], "skipped");
        assert_eq!(value["reason"], "no clips");
    }
}
