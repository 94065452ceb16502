//! Temporary file management utilities.
//!
//! Concat manifests and in-progress outputs are hidden files created next to
//! their final destination with the tempfile crate. They are removed on drop,
//! so an interrupted or failed run never leaves something that looks like a
//! finished merged or recoded file. Finished outputs are moved into place with
//! [`persist_output`].

use crate::error::{CoreError, CoreResult};

use std::path::Path;
use tempfile::{Builder as TempFileBuilder, NamedTempFile, TempPath};

/// Creates a hidden temporary file with prefix and extension. Auto-deleted when dropped.
pub fn create_temp_file(dir: &Path, prefix: &str, extension: &str) -> CoreResult<NamedTempFile> {
    std::fs::create_dir_all(dir)?;
    let temp_file = TempFileBuilder::new()
        .prefix(&format!(".{prefix}_"))
        .suffix(&format!(".{extension}"))
        .tempfile_in(dir)?;

    Ok(temp_file)
}

/// Reserves a hidden partial file beside `final_path`, keeping its extension so
/// ffmpeg picks the right muxer.
pub fn create_partial_output(final_path: &Path) -> CoreResult<TempPath> {
    let dir = final_path.parent().ok_or_else(|| {
        CoreError::PathError(format!("Output has no parent: {}", final_path.display()))
    })?;
    let stem = final_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| {
            CoreError::PathError(format!("Output has no file name: {}", final_path.display()))
        })?;
    let extension = final_path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default();

    let partial = create_temp_file(dir, &format!("{stem}.partial"), &extension)?;
    Ok(partial.into_temp_path())
}

/// Moves a finished partial output to its final name.
pub fn persist_output(partial: TempPath, final_path: &Path) -> CoreResult<()> {
    partial
        .persist(final_path)
        .map_err(|e| CoreError::Io(e.error))?;
    Ok(())
}
