use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use dupecheck::duplicates::{scan, DuplicateFinder, FinderConfig};
use dupecheck::scanner::ExtensionFilter;
use tempfile::tempdir;

use super::fixtures::{group_paths, setup_fixture_tree, write_file};

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::with_defaults();

    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.duplicate_groups, 0);
    assert_eq!(summary.reclaimable_space, 0);
}

#[test]
fn test_no_duplicates_distinct_sizes() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "a.txt", b"a");
    write_file(dir.path(), "b.txt", b"bb");
    write_file(dir.path(), "c.txt", b"ccc");

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.size_candidates, 0);
}

#[test]
fn test_simple_duplicate_in_two_directories() {
    let dir = tempdir().unwrap();
    let first = write_file(dir.path(), "a/f.txt", b"hello world");
    let second = write_file(dir.path(), "b/f.txt", b"hello world");

    let groups = scan(dir.path(), None).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].size, 11);
    assert_eq!(group_paths(&groups), vec![vec![first, second]]);
}

#[test]
fn test_same_size_different_content() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "one.bin", b"123456789");
    write_file(dir.path(), "two.bin", b"987654321");

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.size_candidates, 2);
    assert_eq!(summary.quick_candidates, 0);
}

#[test]
fn test_same_head_different_tail() {
    let dir = tempdir().unwrap();
    let mut left = vec![b'a'; 20_000];
    let mut right = left.clone();
    left[19_999] = b'x';
    right[19_999] = b'y';
    write_file(dir.path(), "left.bin", &left);
    write_file(dir.path(), "right.bin", &right);

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.quick_candidates, 2);
    assert_eq!(summary.confirmed_files, 0);
}

#[test]
fn test_empty_files_are_duplicates() {
    let dir = tempdir().unwrap();
    let first = write_file(dir.path(), "empty1", b"");
    let second = write_file(dir.path(), "empty2", b"");

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].size, 0);
    assert_eq!(group_paths(&groups), vec![vec![first, second]]);
    assert_eq!(summary.failed_files, 0);
    assert_eq!(summary.reclaimable_space, 0);
}

#[test]
fn test_multiple_independent_groups() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "pair1", b"pair content");
    write_file(dir.path(), "pair2", b"pair content");
    write_file(dir.path(), "tri1", b"triple content!");
    write_file(dir.path(), "sub/tri2", b"triple content!");
    write_file(dir.path(), "sub/deeper/tri3", b"triple content!");
    write_file(dir.path(), "loner", b"nobody else has this");

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    let mut counts: Vec<usize> = groups.iter().map(|g| g.len()).collect();
    counts.sort_unstable();
    assert_eq!(counts, vec![2, 3]);
    assert_eq!(summary.duplicate_groups, 2);
    assert_eq!(summary.duplicate_files, 3);
    assert_eq!(summary.reclaimable_space, 12 + 2 * 15);
}

#[test]
fn test_filtered_scan_excludes_other_extensions() {
    let dir = tempdir().unwrap();
    let photo_a = write_file(dir.path(), "a.jpg", b"same bytes");
    let photo_b = write_file(dir.path(), "b.PNG", b"same bytes");
    let text = write_file(dir.path(), "c.txt", b"same bytes");

    let filter = Arc::new(ExtensionFilter::images());
    let (groups, summary) = DuplicateFinder::new(FinderConfig::default().with_include(filter))
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(summary.total_files, 2);
    assert_eq!(group_paths(&groups), vec![vec![photo_a, photo_b]]);
    assert!(!groups[0].contains(&text));
}

#[test]
fn test_fixture_tree() {
    let dir = setup_fixture_tree();
    let root = dir.path();

    let (groups, summary) = DuplicateFinder::with_defaults().find_duplicates(root).unwrap();

    let expected: Vec<Vec<PathBuf>> = vec![
        vec![root.join("edge_cases/empty.txt"), root.join("edge_cases/empty_dup.txt")],
        vec![root.join("edge_cases/small.txt"), root.join("edge_cases/small_dup.txt")],
        vec![
            root.join("identical/file1.txt"),
            root.join("identical/file1_copy.txt"),
            root.join("identical/nested/file1_dup.txt"),
        ],
    ];
    assert_eq!(group_paths(&groups), expected);
    assert_eq!(summary.total_files, 10);
    assert_eq!(summary.duplicate_files, 4);
}

#[test]
fn test_counters_are_monotonic() {
    let dir = setup_fixture_tree();

    let (_, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(summary.total_files >= summary.size_candidates);
    assert!(summary.size_candidates >= summary.quick_candidates);
    assert!(summary.quick_candidates >= summary.confirmed_files);
}

#[test]
fn test_groups_are_disjoint() {
    let dir = setup_fixture_tree();
    let groups = scan(dir.path(), None).unwrap();

    let mut seen = HashSet::new();
    for group in &groups {
        assert!(group.len() >= 2);
        for file in &group.files {
            assert!(seen.insert(file.clone()), "{} in two groups", file.display());
        }
    }
}

#[test]
fn test_scan_is_idempotent() {
    let dir = setup_fixture_tree();

    let first = scan(dir.path(), None).unwrap();
    let second = scan(dir.path(), None).unwrap();

    assert_eq!(group_paths(&first), group_paths(&second));
}

#[test]
fn test_worker_count_does_not_change_result() {
    let dir = setup_fixture_tree();

    let single = DuplicateFinder::new(FinderConfig::default().with_workers(1).with_queue_capacity(1))
        .find_duplicates(dir.path())
        .unwrap()
        .0;
    let many = DuplicateFinder::new(FinderConfig::default().with_workers(8))
        .find_duplicates(dir.path())
        .unwrap()
        .0;

    assert_eq!(group_paths(&single), group_paths(&many));
}

#[test]
fn test_match_mtime_separates_copies() {
    let dir = tempdir().unwrap();
    let old = write_file(dir.path(), "old.txt", b"same content");
    let new = write_file(dir.path(), "new.txt", b"same content");
    filetime::set_file_mtime(&old, filetime::FileTime::from_unix_time(1_000_000, 0)).unwrap();
    filetime::set_file_mtime(&new, filetime::FileTime::from_unix_time(2_000_000, 0)).unwrap();

    let ignoring = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap()
        .0;
    assert_eq!(ignoring.len(), 1);

    let matching = DuplicateFinder::new(FinderConfig::default().with_match_mtime(true))
        .find_duplicates(dir.path())
        .unwrap()
        .0;
    assert!(matching.is_empty());
}

#[cfg(unix)]
#[test]
fn test_symlinks_are_not_followed() {
    let dir = tempdir().unwrap();
    let target = write_file(dir.path(), "real.txt", b"linked content");
    std::os::unix::fs::symlink(&target, dir.path().join("link.txt")).unwrap();

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 1);
}

#[test]
fn test_hidden_files_are_scanned() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), ".hidden", b"dot file");
    write_file(dir.path(), ".config/visible", b"dot file");

    let groups = scan(dir.path(), None).unwrap();

    assert_eq!(groups.len(), 1);
}
