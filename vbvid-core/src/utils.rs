//! Utility functions for formatting and path checks.
//!
//! General-purpose helpers used throughout vbvid-core: extension and
//! hidden-entry checks for discovery, and duration/byte/gap formatting for
//! reporting.

use chrono::TimeDelta;
use std::path::Path;

/// True when the path's extension matches one of `extensions` (case-insensitive).
/// Does not touch the filesystem.
#[must_use]
pub fn has_video_extension<S: AsRef<str>>(path: &Path, extensions: &[S]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext_str| {
            extensions
                .iter()
                .any(|allowed| ext_str.eq_ignore_ascii_case(allowed.as_ref()))
        })
}

/// True when the final path component starts with a dot.
#[must_use]
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}

/// Formats seconds as HH:MM:SS (e.g., 3725.0 -> "01:02:05"). Returns "??:??:??" for invalid inputs.
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    if seconds < 0.0 || !seconds.is_finite() {
        return "??:??:??".to_string();
    }

    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Formats an inter-clip gap; `None` (first clip) renders as "-".
#[must_use]
pub fn format_gap(gap: Option<TimeDelta>) -> String {
    match gap {
        None => "-".to_string(),
        Some(delta) if delta < TimeDelta::zero() => format!("-{}", format_gap(Some(-delta))),
        Some(delta) => {
            let total = delta.num_seconds();
            format!("{}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
        }
    }
}

/// Formats bytes with appropriate binary units (B, KiB, MiB, GiB).
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    const GIB: f64 = MIB * 1024.0;

    let bytes_f64 = bytes as f64;
    if bytes_f64 >= GIB {
        format!("{:.2} GiB", bytes_f64 / GIB)
    } else if bytes_f64 >= MIB {
        format!("{:.2} MiB", bytes_f64 / MIB)
    } else if bytes_f64 >= KIB {
        format!("{:.2} KiB", bytes_f64 / KIB)
    } else {
        format!("{bytes} B")
    }
}

/// Parses FFmpeg time string (HH:MM:SS.MS) to seconds. Returns None if invalid.
#[must_use]
pub fn parse_ffmpeg_time(time: &str) -> Option<f64> {
    let parts: Vec<&str> = time.split(':').collect();
    if parts.len() == 3 {
        let hours = parts[0].parse::<f64>().ok()?;
        let minutes = parts[1].parse::<f64>().ok()?;
        let seconds = parts[2].parse::<f64>().ok()?;
        Some(hours * 3600.0 + minutes * 60.0 + seconds)
    } else {
        None
    }
}

/// Extracts the filename from a path, or a `PathError` if it has none.
pub fn get_filename_safe(path: &Path) -> crate::CoreResult<String> {
    Ok(path
        .file_name()
        .ok_or_else(|| {
            crate::CoreError::PathError(format!("Failed to get filename for {}", path.display()))
        })?
        .to_string_lossy()
        .to_string())
}

/// Calculates the percentage size reduction from input to output.
/// Returns 0 if input_size is 0 to avoid division by zero.
#[must_use]
pub fn calculate_size_reduction(input_size: u64, output_size: u64) -> u64 {
    if input_size == 0 || output_size >= input_size {
        0
    } else {
        100 - ((output_size * 100) / input_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_video_extension() {
        let exts = ["mp4"];
        assert!(has_video_extension(Path::new("GX010001.MP4"), &exts));
        assert!(has_video_extension(Path::new("/clips/a.mp4"), &exts));
        assert!(has_video_extension(Path::new("a.Mp4"), &exts));

        assert!(!has_video_extension(Path::new("a.mov"), &exts));
        assert!(!has_video_extension(Path::new("a.mp4.txt"), &exts));
        assert!(!has_video_extension(Path::new("mp4"), &exts));
        assert!(!has_video_extension(Path::new(""), &exts));

        let several = vec!["mp4".to_string(), "mov".to_string()];
        assert!(has_video_extension(Path::new("a.MOV"), &several));
    }

    #[test]
    fn test_is_hidden() {
        assert!(is_hidden(Path::new("/clips/.joined")));
        assert!(is_hidden(Path::new(".recoded")));
        assert!(!is_hidden(Path::new("/clips/group01")));
        assert!(!is_hidden(Path::new("/")));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "00:00:00");
        assert_eq!(format_duration(59.9), "00:00:59");
        assert_eq!(format_duration(3661.0), "01:01:01");
        assert_eq!(format_duration(90061.0), "25:01:01");
        assert_eq!(format_duration(-1.0), "??:??:??");
        assert_eq!(format_duration(f64::NAN), "??:??:??");
    }

    #[test]
    fn test_format_gap() {
        assert_eq!(format_gap(None), "-");
        assert_eq!(format_gap(Some(TimeDelta::seconds(30))), "0:00:30");
        assert_eq!(format_gap(Some(TimeDelta::minutes(12))), "0:12:00");
        assert_eq!(format_gap(Some(TimeDelta::seconds(3725))), "1:02:05");
        assert_eq!(format_gap(Some(TimeDelta::seconds(-5))), "-0:00:05");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1536), "1.50 KiB");
        assert_eq!(format_bytes(1024 * 1024 * 2), "2.00 MiB");
        assert_eq!(format_bytes(1024 * 1024 * 1024), "1.00 GiB");
    }

    #[test]
    fn test_parse_ffmpeg_time() {
        assert_eq!(parse_ffmpeg_time("00:00:00"), Some(0.0));
        assert_eq!(parse_ffmpeg_time("01:02:03"), Some(3723.0));
        assert_eq!(parse_ffmpeg_time("00:00:01.25"), Some(1.25));
        assert_eq!(parse_ffmpeg_time("00:00"), None);
        assert_eq!(parse_ffmpeg_time("aa:bb:cc"), None);
    }

    #[test]
    fn test_get_filename_safe() {
        assert_eq!(
            get_filename_safe(Path::new("/path/to/group01.mp4")).unwrap(),
            "group01.mp4"
        );
        assert!(get_filename_safe(Path::new("/")).is_err());
        assert!(get_filename_safe(Path::new("")).is_err());
    }

    #[test]
    fn test_calculate_size_reduction() {
        assert_eq!(calculate_size_reduction(100, 50), 50);
        assert_eq!(calculate_size_reduction(1000, 999), 1);
        assert_eq!(calculate_size_reduction(0, 100), 0);
        assert_eq!(calculate_size_reduction(100, 150), 0);
    }
}
