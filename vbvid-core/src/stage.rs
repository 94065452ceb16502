//! Stage detection.
//!
//! The pipeline keeps no state of its own: which stage to run next is read
//! from the target directory every time. Detection only lists directories and
//! checks for file existence, so it is cheap and never mutates anything.

use crate::error::CoreResult;
use crate::layout::PipelineLayout;

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Where a target directory stands in the group → join → recode pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// No group directories and no merged outputs yet.
    Ungrouped,
    /// At least one group directory has no merged output.
    Grouped,
    /// Every group is merged, but some merged output has no recoded counterpart.
    Joined,
    /// Every merged output has been recoded.
    Recoded,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PipelineStage::Ungrouped => "ungrouped",
            PipelineStage::Grouped => "grouped",
            PipelineStage::Joined => "joined",
            PipelineStage::Recoded => "recoded",
        })
    }
}

impl PipelineStage {
    /// Derives the stage from counts gathered on disk.
    pub fn from_counts(pending_joins: usize, merged_outputs: usize, pending_recodes: usize) -> Self {
        if pending_joins > 0 {
            PipelineStage::Grouped
        } else if pending_recodes > 0 {
            PipelineStage::Joined
        } else if merged_outputs > 0 {
            PipelineStage::Recoded
        } else {
            PipelineStage::Ungrouped
        }
    }
}

/// Result of inspecting a target directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageSnapshot {
    pub stage: PipelineStage,
    /// All group directories, sorted by name.
    pub group_dirs: Vec<PathBuf>,
    /// Group directories without a merged output.
    pub pending_joins: Vec<PathBuf>,
    /// Merged outputs present in the joined directory.
    pub merged_outputs: Vec<PathBuf>,
    /// Merged outputs without a recoded counterpart.
    pub pending_recodes: Vec<PathBuf>,
}

/// Inspects the target directory and classifies it.
pub fn detect_stage(layout: &PipelineLayout) -> CoreResult<StageSnapshot> {
    let group_dirs = layout.group_dirs()?;

    let mut pending_joins = Vec::new();
    for dir in &group_dirs {
        if !layout.merged_output_for(dir)?.exists() {
            pending_joins.push(dir.clone());
        }
    }

    let merged_outputs = layout.merged_outputs()?;

    let mut pending_recodes = Vec::new();
    for merged in &merged_outputs {
        if !layout.recoded_output_for(merged)?.exists() {
            pending_recodes.push(merged.clone());
        }
    }

    let stage = PipelineStage::from_counts(
        pending_joins.len(),
        merged_outputs.len(),
        pending_recodes.len(),
    );

    log::debug!(
        "Detected stage {} in {} ({} groups, {} pending joins, {} merged, {} pending recodes)",
        stage,
        layout.root().display(),
        group_dirs.len(),
        pending_joins.len(),
        merged_outputs.len(),
        pending_recodes.len()
    );

    Ok(StageSnapshot {
        stage,
        group_dirs,
        pending_joins,
        merged_outputs,
        pending_recodes,
    })
}
