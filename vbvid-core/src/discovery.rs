//! File discovery for the clip pipeline.
//!
//! Lists the eligible clips in the top level of a directory and attaches the
//! modification time used for ordering and grouping. Discovery never fails on
//! an unreadable directory or an empty one: both yield an empty list so the
//! calling stage simply has no work.

use crate::utils::{has_video_extension, is_hidden};

use chrono::{DateTime, Local};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// One discovered clip. Built fresh on every run, never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Filesystem modification time.
    pub timestamp: DateTime<Local>,
}

impl SourceFile {
    pub fn new(path: PathBuf, timestamp: DateTime<Local>) -> Self {
        Self { path, timestamp }
    }

    /// File name for display, lossy for non-UTF-8 names.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Orders clips by timestamp, then by file name for identical timestamps.
///
/// This is the single sort key used by both the grouping and joining stages.
pub fn compare_source_files(a: &SourceFile, b: &SourceFile) -> Ordering {
    a.timestamp
        .cmp(&b.timestamp)
        .then_with(|| a.path.file_name().cmp(&b.path.file_name()))
}

/// Finds eligible clips in the top level of `dir`, sorted by [`compare_source_files`].
///
/// Hidden files, subdirectories and files whose extension is not listed in
/// `extensions` are skipped.
pub fn find_source_files<S: AsRef<str>>(dir: &Path, extensions: &[S]) -> Vec<SourceFile> {
    let read_dir = match std::fs::read_dir(dir) {
        Ok(read_dir) => read_dir,
        Err(e) => {
            log::warn!("Cannot read directory {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut files: Vec<SourceFile> = Vec::new();
    let mut skipped_count = 0;

    for entry_result in read_dir {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Failed to read directory entry in {}: {}", dir.display(), e);
                continue;
            }
        };
        let path = entry.path();

        if is_hidden(&path) || !path.is_file() {
            continue;
        }

        if !has_video_extension(&path, extensions) {
            skipped_count += 1;
            continue;
        }

        match entry.metadata().and_then(|m| m.modified()) {
            Ok(modified) => files.push(SourceFile::new(path, DateTime::<Local>::from(modified))),
            Err(e) => log::warn!(
                "Skipping {}: modification time unavailable ({})",
                path.display(),
                e
            ),
        }
    }

    if skipped_count > 0 {
        log::debug!(
            "Skipped {} non-video files in {}",
            skipped_count,
            dir.display()
        );
    }

    files.sort_by(compare_source_files);

    log::debug!("Found {} clips in {}", files.len(), dir.display());
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Local> {
        Local.timestamp_opt(1_677_330_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_compare_uses_timestamp_before_name() {
        let later_a = SourceFile::new(PathBuf::from("a.mp4"), at(60));
        let earlier_b = SourceFile::new(PathBuf::from("b.mp4"), at(0));
        assert_eq!(compare_source_files(&earlier_b, &later_a), Ordering::Less);
    }

    #[test]
    fn test_compare_breaks_ties_by_name() {
        let a = SourceFile::new(PathBuf::from("/x/GX010002.MP4"), at(0));
        let b = SourceFile::new(PathBuf::from("/x/GX010001.MP4"), at(0));
        assert_eq!(compare_source_files(&b, &a), Ordering::Less);
    }

    #[test]
    fn test_unreadable_directory_yields_empty_list() {
        let files = find_source_files(Path::new("surely_this_does_not_exist_42"), &["mp4"]);
        assert!(files.is_empty());
    }
}
