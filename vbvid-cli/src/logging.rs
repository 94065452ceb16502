// vbvid-cli/src/logging.rs
//
// Log file naming for the CLI. The logger itself is log4rs, installed through
// vbvid_core::file_logging.

use std::path::{Path, PathBuf};

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Path of this run's log file inside `log_dir`.
pub fn run_log_path(log_dir: &Path) -> PathBuf {
    log_dir.join(format!("vbvid_run_{}.log", get_timestamp()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_shape() {
        let ts = get_timestamp();
        assert_eq!(ts.len(), 15);
        assert_eq!(ts.as_bytes()[8], b'_');
        assert!(ts.chars().filter(|c| *c != '_').all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_run_log_path() {
        let path = run_log_path(Path::new("/clips/.logs"));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("vbvid_run_"));
        assert!(name.ends_with(".log"));
        assert_eq!(path.parent(), Some(Path::new("/clips/.logs")));
    }
}
