use assert_cmd::Command;
use predicates::str::contains;
use std::error::Error;
use std::fs::{self, File};
use std::path::Path;
use std::time::{Duration, SystemTime};
use tempfile::tempdir;

// Helper function to get the path to the compiled binary
fn vbvid_cmd() -> Command {
    let mut cmd = Command::cargo_bin("vbvid").expect("Failed to find vbvid binary");
    cmd.env_remove("VBVID_QUALITY_STANDARD")
        .env_remove("VBVID_QUALITY_HIGH_RES");
    cmd
}

fn write_clip(dir: &Path, name: &str, offset_secs: u64) -> Result<(), Box<dyn Error>> {
    let path = dir.join(name);
    fs::write(&path, "clip")?;
    let base = SystemTime::UNIX_EPOCH + Duration::from_secs(1_677_312_000);
    File::options()
        .write(true)
        .open(&path)?
        .set_modified(base + Duration::from_secs(offset_secs))?;
    Ok(())
}

#[test]
fn test_non_existent_target_fails() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let missing = dir.path().join("surely/not/here");

    vbvid_cmd()
        .arg(&missing)
        .arg("--no-log")
        .assert()
        .failure()
        .stderr(contains("Invalid target directory"));

    Ok(())
}

#[test]
fn test_empty_directory_succeeds() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;

    vbvid_cmd()
        .arg(dir.path())
        .arg("--no-log")
        .assert()
        .success()
        .stdout(contains("No clips to group"));

    Ok(())
}

#[test]
fn test_grouping_moves_clips_and_writes_log() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    write_clip(dir.path(), "GX010001.MP4", 0)?;
    write_clip(dir.path(), "GX010002.MP4", 120)?;
    write_clip(dir.path(), "GX020001.MP4", 3600)?;

    vbvid_cmd().arg(dir.path()).assert().success();

    assert!(dir.path().join("group01/GX010001.MP4").exists());
    assert!(dir.path().join("group01/GX010002.MP4").exists());
    assert!(dir.path().join("group02/GX020001.MP4").exists());
    assert!(!dir.path().join("GX010001.MP4").exists());

    let logs: Vec<_> = fs::read_dir(dir.path().join(".logs"))?
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(logs.len(), 1);
    assert!(logs[0].starts_with("vbvid_run_"));

    Ok(())
}

#[test]
fn test_dry_run_leaves_directory_untouched() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    write_clip(dir.path(), "a.mp4", 0)?;
    write_clip(dir.path(), "b.mp4", 1800)?;

    vbvid_cmd()
        .arg(dir.path())
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(contains("would move 2 clips into 2 groups"));

    assert!(dir.path().join("a.mp4").exists());
    assert!(dir.path().join("b.mp4").exists());
    assert!(!dir.path().join("group01").exists());
    assert!(!dir.path().join(".logs").exists());

    Ok(())
}

#[test]
fn test_progress_json_emits_events() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    write_clip(dir.path(), "a.mp4", 0)?;

    vbvid_cmd()
        .arg(dir.path())
        .arg("--no-log")
        .arg("--progress-json")
        .assert()
        .success()
        .stdout(contains(r#""type":"stage_detected""#))
        .stdout(contains(r#""type":"group_materialized""#));

    Ok(())
}

#[test]
fn test_invalid_arguments_are_rejected() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;

    vbvid_cmd()
        .arg(dir.path())
        .arg("--quality-standard")
        .arg("60")
        .assert()
        .failure()
        .stderr(contains("quality-standard"));

    vbvid_cmd()
        .arg(dir.path())
        .arg("--dest")
        .arg(dir.path().join("out"))
        .assert()
        .failure()
        .stderr(contains("--recode-only"));

    vbvid_cmd()
        .arg(dir.path())
        .arg("--recode-only")
        .arg("--all")
        .assert()
        .failure();

    vbvid_cmd()
        .arg(dir.path())
        .arg("--dry-run")
        .arg("--recode-only")
        .assert()
        .failure()
        .stderr(contains("cannot be used with"));

    Ok(())
}
