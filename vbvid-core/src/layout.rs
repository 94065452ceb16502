//! On-disk layout of a target directory.
//!
//! ```text
//! D/
//!   *.mp4                  ungrouped clips
//!   group01/ group02/ ...  one directory per session
//!   .joined/group01.mp4    merged output per group
//!   .recoded/group01.mp4   recoded counterpart per merged output
//! ```
//!
//! Every non-hidden subdirectory of `D` counts as a group directory, whatever
//! its name. Marker directories and temp files are hidden, so they never look
//! like clips or groups.

use crate::config::{CoreConfig, MERGED_FILE_EXTENSION};
use crate::error::{CoreError, CoreResult};
use crate::utils::{has_video_extension, is_hidden};

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineLayout {
    root: PathBuf,
    group_dir_prefix: String,
    joined_dir: PathBuf,
    recoded_dir: PathBuf,
}

impl PipelineLayout {
    pub fn new(config: &CoreConfig) -> Self {
        let root = config.target_dir.clone();
        Self {
            joined_dir: root.join(&config.joined_dir_name),
            recoded_dir: root.join(&config.recoded_dir_name),
            group_dir_prefix: config.group_dir_prefix.clone(),
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn joined_dir(&self) -> &Path {
        &self.joined_dir
    }

    pub fn recoded_dir(&self) -> &Path {
        &self.recoded_dir
    }

    /// Name of the directory for the 1-based group `index`, e.g. `group01`.
    pub fn group_dir_name(&self, index: usize) -> String {
        format!("{}{:02}", self.group_dir_prefix, index)
    }

    pub fn group_dir(&self, index: usize) -> PathBuf {
        self.root.join(self.group_dir_name(index))
    }

    /// Merged output for a group directory: `.joined/<dir name>.mp4`.
    pub fn merged_output_for(&self, group_dir: &Path) -> CoreResult<PathBuf> {
        let name = group_dir.file_name().ok_or_else(|| {
            CoreError::PathError(format!(
                "Group directory has no name: {}",
                group_dir.display()
            ))
        })?;
        Ok(self.joined_dir.join(format!(
            "{}.{}",
            name.to_string_lossy(),
            MERGED_FILE_EXTENSION
        )))
    }

    /// Recoded counterpart of a merged output: same file name under `.recoded`.
    pub fn recoded_output_for(&self, merged: &Path) -> CoreResult<PathBuf> {
        recoded_output_in(&self.recoded_dir, merged)
    }

    /// Non-hidden subdirectories of the root, sorted by name.
    pub fn group_dirs(&self) -> CoreResult<Vec<PathBuf>> {
        let mut dirs = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.is_dir() && !is_hidden(&path) {
                dirs.push(path);
            }
        }
        dirs.sort();
        Ok(dirs)
    }

    /// Non-hidden merged files in the joined directory, sorted by name.
    /// A missing joined directory yields an empty list.
    pub fn merged_outputs(&self) -> CoreResult<Vec<PathBuf>> {
        if !self.joined_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut outputs = Vec::new();
        for entry in std::fs::read_dir(&self.joined_dir)? {
            let path = entry?.path();
            if path.is_file()
                && !is_hidden(&path)
                && has_video_extension(&path, &[MERGED_FILE_EXTENSION])
            {
                outputs.push(path);
            }
        }
        outputs.sort();
        Ok(outputs)
    }
}

/// Destination of `input` inside `dest_dir`, keeping the file name.
pub fn recoded_output_in(dest_dir: &Path, input: &Path) -> CoreResult<PathBuf> {
    let name = input.file_name().ok_or_else(|| {
        CoreError::PathError(format!("Input has no file name: {}", input.display()))
    })?;
    Ok(dest_dir.join(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_paths_follow_config() {
        let config = CoreConfig::new(PathBuf::from("/clips"));
        let layout = PipelineLayout::new(&config);

        assert_eq!(layout.group_dir_name(1), "group01");
        assert_eq!(layout.group_dir_name(12), "group12");
        assert_eq!(layout.group_dir_name(123), "group123");
        assert_eq!(layout.group_dir(3), PathBuf::from("/clips/group03"));
        assert_eq!(layout.joined_dir(), Path::new("/clips/.joined"));
        assert_eq!(layout.recoded_dir(), Path::new("/clips/.recoded"));
    }

    #[test]
    fn test_merged_and_recoded_names() {
        let layout = PipelineLayout::new(&CoreConfig::new(PathBuf::from("/clips")));

        let merged = layout
            .merged_output_for(Path::new("/clips/group02"))
            .unwrap();
        assert_eq!(merged, PathBuf::from("/clips/.joined/group02.mp4"));

        let merged_dotted = layout
            .merged_output_for(Path::new("/clips/trip.day1"))
            .unwrap();
        assert_eq!(merged_dotted, PathBuf::from("/clips/.joined/trip.day1.mp4"));

        let recoded = layout.recoded_output_for(&merged).unwrap();
        assert_eq!(recoded, PathBuf::from("/clips/.recoded/group02.mp4"));
    }

    #[test]
    fn test_listing_skips_hidden_entries() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::create_dir(dir.path().join("group02"))?;
        fs::create_dir(dir.path().join("group01"))?;
        fs::create_dir(dir.path().join(".joined"))?;
        fs::create_dir(dir.path().join(".recoded"))?;
        fs::write(dir.path().join("clip.mp4"), b"x")?;
        fs::write(dir.path().join(".joined/group01.mp4"), b"x")?;
        fs::write(dir.path().join(".joined/.group02.mp4.tmp.mp4"), b"x")?;
        fs::write(dir.path().join(".joined/notes.txt"), b"x")?;

        let layout = PipelineLayout::new(&CoreConfig::new(dir.path().to_path_buf()));

        let groups = layout.group_dirs()?;
        assert_eq!(
            groups,
            vec![dir.path().join("group01"), dir.path().join("group02")]
        );

        let merged = layout.merged_outputs()?;
        assert_eq!(merged, vec![dir.path().join(".joined/group01.mp4")]);
        Ok(())
    }

    #[test]
    fn test_missing_joined_dir_lists_nothing() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let layout = PipelineLayout::new(&CoreConfig::new(dir.path().to_path_buf()));
        assert!(layout.merged_outputs()?.is_empty());
        Ok(())
    }
}
