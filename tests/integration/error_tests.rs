use std::fs;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::Context;
use dupecheck::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use dupecheck::error::{ExitCode, StructuredError};
use dupecheck::scanner::{FileEntry, ScanError, Walker, WalkerConfig};
use tempfile::tempdir;

use super::fixtures::{setup_fixture_tree, write_file};

#[test]
fn test_missing_root_is_fatal() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope");

    let err = DuplicateFinder::with_defaults()
        .find_duplicates(&missing)
        .unwrap_err();

    assert!(matches!(err, FinderError::Scan(ScanError::NotFound(ref p)) if *p == missing));
}

#[test]
fn test_file_root_is_fatal() {
    let dir = tempdir().unwrap();
    let file = write_file(dir.path(), "plain.txt", b"not a directory");

    let err = DuplicateFinder::with_defaults()
        .find_duplicates(&file)
        .unwrap_err();

    assert!(matches!(err, FinderError::Scan(ScanError::NotADirectory(_))));
}

#[test]
fn test_root_error_maps_to_general_exit_code() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("gone");

    let err = DuplicateFinder::with_defaults()
        .find_duplicates(&missing)
        .context("Failed to scan")
        .unwrap_err();

    assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
    let structured = StructuredError::new(&err, ExitCode::for_error(&err));
    assert_eq!(structured.code, "DC001");
    assert!(structured.message.contains("Path not found"));
}

#[test]
fn test_preset_shutdown_interrupts_scan() {
    let dir = setup_fixture_tree();
    let flag = Arc::new(AtomicBool::new(true));

    let err = DuplicateFinder::new(FinderConfig::default().with_shutdown_flag(flag))
        .find_duplicates(dir.path())
        .unwrap_err();

    assert!(matches!(err, FinderError::Interrupted));
    let wrapped = anyhow::Error::new(err).context("Failed to scan");
    assert_eq!(ExitCode::for_error(&wrapped), ExitCode::Interrupted);
    assert_eq!(ExitCode::for_error(&wrapped).as_i32(), 130);
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_dropped() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let readable_a = write_file(dir.path(), "a.txt", b"shared bytes");
    let readable_b = write_file(dir.path(), "b.txt", b"shared bytes");
    let locked = write_file(dir.path(), "c.txt", b"shared bytes");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Privileged users can read regardless of mode bits.
    if fs::read(&locked).is_ok() {
        return;
    }

    let result = DuplicateFinder::with_defaults().find_duplicates(dir.path());
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
    let (groups, summary) = result.unwrap();

    assert_eq!(groups.len(), 1);
    let mut files = groups[0].files.clone();
    files.sort();
    assert_eq!(files, vec![readable_a, readable_b]);
    assert_eq!(summary.failed_files, 1);
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_is_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let outside_a = write_file(dir.path(), "a.txt", b"outside pair");
    let outside_b = write_file(dir.path(), "other/b.txt", b"outside pair");
    write_file(dir.path(), "sub/hidden.txt", b"outside pair");
    let sub = dir.path().join("sub");
    fs::set_permissions(&sub, fs::Permissions::from_mode(0o000)).unwrap();

    // Privileged users can list the directory regardless of mode bits.
    if fs::read_dir(&sub).is_ok() {
        fs::set_permissions(&sub, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let walked: Vec<_> = Walker::new(dir.path(), WalkerConfig::default()).walk().collect();
    let result = DuplicateFinder::with_defaults().find_duplicates(dir.path());
    fs::set_permissions(&sub, fs::Permissions::from_mode(0o755)).unwrap();

    assert!(walked
        .iter()
        .any(|r| matches!(r, Err(ScanError::PermissionDenied(p)) if *p == sub)));

    let (groups, summary) = result.unwrap();
    assert_eq!(groups.len(), 1);
    let mut files = groups[0].files.clone();
    files.sort();
    assert_eq!(files, vec![outside_a, outside_b]);
    assert_eq!(summary.total_files, 2);
    assert!(summary.skipped_entries >= 1);
}

#[test]
fn test_file_removed_before_hashing_is_dropped() {
    let dir = tempdir().unwrap();
    let kept_a = write_file(dir.path(), "a.txt", b"same same");
    let kept_b = write_file(dir.path(), "b.txt", b"same same");
    let gone = write_file(dir.path(), "c.txt", b"same same");

    let files = vec![
        FileEntry::new(kept_a, 9, 0),
        FileEntry::new(kept_b, 9, 0),
        FileEntry::new(gone.clone(), 9, 0),
    ];
    fs::remove_file(&gone).unwrap();

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates_from_files(files)
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert!(!groups[0].contains(&gone));
    assert_eq!(summary.failed_files, 1);
}
