// ============================================================================
// vbvid-core/src/grouping/materialize.rs
// ============================================================================
//
// GROUP MATERIALIZATION: Moving clips into their group directories
//
// This is the only step of the pipeline that moves source material. Every
// destination is checked up front so a conflicting layout is reported before
// any clip has moved, and each rename is checked again right before it runs.
// Nothing is ever overwritten.

use super::Group;
use crate::error::{CoreError, CoreResult};
use crate::layout::PipelineLayout;
use crate::utils::get_filename_safe;

use std::fs;
use std::path::{Path, PathBuf};

/// A group directory that now holds its clips.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializedGroup {
    pub index: usize,
    pub dir: PathBuf,
    /// New locations of the moved clips, in group order.
    pub moved: Vec<PathBuf>,
}

fn destination_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Fails with `DestinationAlreadyExists` if any clip of `groups` would land on
/// an existing path. Touches nothing.
pub fn check_group_destinations(layout: &PipelineLayout, groups: &[Group]) -> CoreResult<()> {
    for group in groups {
        let group_dir = layout.group_dir(group.index);
        if group_dir.exists() && !group_dir.is_dir() {
            return Err(CoreError::DestinationAlreadyExists(group_dir));
        }
        for file in &group.files {
            let dest = group_dir.join(get_filename_safe(&file.path)?);
            if destination_exists(&dest) {
                return Err(CoreError::DestinationAlreadyExists(dest));
            }
        }
    }
    Ok(())
}

/// Creates the directory for `group` and moves its clips into it.
///
/// Stops at the first failing move; clips already moved stay where they are.
pub fn materialize_group(layout: &PipelineLayout, group: &Group) -> CoreResult<MaterializedGroup> {
    let dir = layout.group_dir(group.index);
    fs::create_dir_all(&dir)?;

    let mut moved = Vec::with_capacity(group.files.len());
    for file in &group.files {
        let dest = dir.join(get_filename_safe(&file.path)?);
        if destination_exists(&dest) {
            return Err(CoreError::DestinationAlreadyExists(dest));
        }
        fs::rename(&file.path, &dest)?;
        log::debug!("Moved {} -> {}", file.path.display(), dest.display());
        moved.push(dest);
    }

    log::info!(
        "Materialized {} with {} clips",
        dir.display(),
        moved.len()
    );

    Ok(MaterializedGroup {
        index: group.index,
        dir,
        moved,
    })
}
