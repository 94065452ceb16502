// vbvid-core/tests/concat_tests.rs

mod common;

use common::{MockFfmpegSpawner, create_clip};
use std::fs;
use tempfile::tempdir;
use vbvid_core::concat::{join_clips, join_groups};
use vbvid_core::reporting::NullReporter;
use vbvid_core::{CoreConfig, CoreError, ItemOutcome, PipelineLayout, find_source_files};

#[test]
fn test_manifest_follows_timestamp_order() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let group = dir.path().join("group01");
    fs::create_dir(&group)?;
    create_clip(&group, "b.mp4", 0);
    create_clip(&group, "a.mp4", 45);

    let spawner = MockFfmpegSpawner::new();
    let clips = find_source_files(&group, &["mp4"]);
    let output = dir.path().join(".joined/group01.mp4");

    join_clips(&spawner, &clips, &output)?;

    let manifests = spawner.manifests();
    assert_eq!(manifests.len(), 1);
    let expected = format!(
        "file '{}'\nfile '{}'\n",
        group.join("b.mp4").display(),
        group.join("a.mp4").display()
    );
    assert_eq!(manifests[0], expected);

    assert!(output.is_file());
    // Manifest and partial output are gone; only the merged file remains.
    let leftovers: Vec<_> = fs::read_dir(dir.path().join(".joined"))?
        .map(|e| e.map(|e| e.file_name()))
        .collect::<Result<_, _>>()?;
    assert_eq!(leftovers, vec![std::ffi::OsString::from("group01.mp4")]);
    Ok(())
}

#[test]
fn test_failed_join_leaves_no_output() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let group = dir.path().join("group01");
    fs::create_dir(&group)?;
    create_clip(&group, "a.mp4", 0);

    let spawner = MockFfmpegSpawner::new();
    spawner.fail_when_args_contain("concat", 1);
    let output = dir.path().join(".joined/group01.mp4");

    let result = join_clips(&spawner, &find_source_files(&group, &["mp4"]), &output);

    match result {
        Err(CoreError::ExternalToolFailure {
            tool,
            exit_code,
            stderr,
        }) => {
            assert_eq!(tool, "ffmpeg (concat)");
            assert_eq!(exit_code, Some(1));
            assert!(stderr.contains("mock failure"));
        }
        other => panic!("Expected ExternalToolFailure, got {other:?}"),
    }
    assert!(!output.exists());
    assert_eq!(fs::read_dir(dir.path().join(".joined"))?.count(), 0);
    Ok(())
}

#[test]
fn test_join_groups_continues_after_failure() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    for (name, offset) in [("group01", 0), ("group02", 3600), ("group03", 7200)] {
        let group = dir.path().join(name);
        fs::create_dir(&group)?;
        create_clip(&group, &format!("{name}_clip.mp4"), offset);
    }
    fs::create_dir(dir.path().join("group04"))?;

    let spawner = MockFfmpegSpawner::new();
    spawner.fail_when_args_contain(".group02.", 1);
    let layout = PipelineLayout::new(&CoreConfig::new(dir.path().to_path_buf()));
    let groups = layout.group_dirs()?;

    let report = join_groups(
        &spawner,
        &layout,
        &groups,
        &["mp4".to_string()],
        &NullReporter,
    );

    assert_eq!(report.completed_count(), 2);
    assert_eq!(report.failed_count(), 1);
    assert_eq!(report.skipped_count(), 1);
    assert!(matches!(&report.items[1], ItemOutcome::Failed { input, .. } if input.ends_with("group02")));
    assert!(matches!(&report.items[3], ItemOutcome::Skipped { reason, .. } if reason == "no clips"));

    assert!(dir.path().join(".joined/group01.mp4").is_file());
    assert!(!dir.path().join(".joined/group02.mp4").exists());
    assert!(dir.path().join(".joined/group03.mp4").is_file());
    Ok(())
}
