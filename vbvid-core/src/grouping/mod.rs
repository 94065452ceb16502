//! Temporal grouping of camera clips into recording sessions.
//!
//! Clustering is a pure function over timestamps: a gap strictly above the
//! session gap starts a new group, a gap strictly above the timeout gap is
//! annotated but stays in the current group. Moving the clips into their group
//! directories lives in [`materialize`] and is the only destructive step of
//! the pipeline.

pub mod materialize;

use crate::config::CoreConfig;
use crate::discovery::{SourceFile, compare_source_files};

use chrono::{DateTime, Local, TimeDelta};
use serde::Serialize;
use std::fmt;

pub use materialize::{MaterializedGroup, check_group_destinations, materialize_group};

/// How a clip relates to the clip before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GapAnnotation {
    /// First clip, or gap above the session gap: a new group starts here.
    SessionStart,
    /// Gap above the timeout gap but within the session gap. Flagged for review only.
    TimeoutContinuation,
    /// Gap within the timeout gap.
    Continuation,
}

impl GapAnnotation {
    /// Short marker used in the audit listing.
    pub const fn marker(self) -> &'static str {
        match self {
            GapAnnotation::SessionStart => "*",
            GapAnnotation::TimeoutContinuation => "TO",
            GapAnnotation::Continuation => "",
        }
    }
}

impl fmt::Display for GapAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GapAnnotation::SessionStart => "session start",
            GapAnnotation::TimeoutContinuation => "timeout continuation",
            GapAnnotation::Continuation => "continuation",
        })
    }
}

/// Gap thresholds used for clustering. Both comparisons are strict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupThresholds {
    pub session_gap: TimeDelta,
    pub timeout_gap: TimeDelta,
}

impl GroupThresholds {
    pub fn from_config(config: &CoreConfig) -> Self {
        Self {
            session_gap: config.session_gap,
            timeout_gap: config.timeout_gap,
        }
    }

    /// Classifies the gap to the previous clip; `None` means there is no previous clip.
    pub fn classify(&self, gap: Option<TimeDelta>) -> GapAnnotation {
        match gap {
            None => GapAnnotation::SessionStart,
            Some(gap) if gap > self.session_gap => GapAnnotation::SessionStart,
            Some(gap) if gap > self.timeout_gap => GapAnnotation::TimeoutContinuation,
            Some(_) => GapAnnotation::Continuation,
        }
    }
}

impl Default for GroupThresholds {
    fn default() -> Self {
        Self::from_config(&CoreConfig::default())
    }
}

/// A non-empty, timestamp-ordered run of clips from one recording session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// 1-based ordinal, encoded in the group directory name.
    pub index: usize,
    pub files: Vec<SourceFile>,
}

/// Audit record for one clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupingEntry {
    pub file: SourceFile,
    /// Gap to the previous clip; `None` for the first clip.
    pub gap: Option<TimeDelta>,
    pub annotation: GapAnnotation,
    /// 1-based index of the group the clip belongs to.
    pub group_index: usize,
}

/// Result of clustering: the groups plus one audit entry per input clip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingPlan {
    pub groups: Vec<Group>,
    pub entries: Vec<GroupingEntry>,
}

impl GroupingPlan {
    pub fn file_count(&self) -> usize {
        self.entries.len()
    }
}

/// Clusters clips into groups.
///
/// Input is sorted by timestamp (file name as tie-break) on entry. Every clip
/// ends up in exactly one group, groups keep input order, and no group is
/// empty. An empty input gives an empty plan.
pub fn group_files(mut files: Vec<SourceFile>, thresholds: &GroupThresholds) -> GroupingPlan {
    files.sort_by(compare_source_files);

    let (plan, _) = files.into_iter().fold(
        (GroupingPlan::default(), None::<DateTime<Local>>),
        |(mut plan, previous), file| {
            let gap = previous.map(|prev| file.timestamp - prev);
            let annotation = thresholds.classify(gap);

            if annotation == GapAnnotation::SessionStart || plan.groups.is_empty() {
                let index = plan.groups.len() + 1;
                plan.groups.push(Group {
                    index,
                    files: Vec::new(),
                });
            }

            let timestamp = file.timestamp;
            if let Some(group) = plan.groups.last_mut() {
                plan.entries.push(GroupingEntry {
                    file: file.clone(),
                    gap,
                    annotation,
                    group_index: group.index,
                });
                group.files.push(file);
            }

            (plan, Some(timestamp))
        },
    );

    log::debug!(
        "Clustered {} clips into {} groups",
        plan.file_count(),
        plan.groups.len()
    );
    plan
}
