use std::path::Path;
use std::sync::Arc;

use dupecheck::duplicates::{scan, DuplicateFinder, FinderConfig};
use dupecheck::scanner::{ExtensionFilter, IncludeFilter, Walker, WalkerConfig};
use tempfile::tempdir;

use super::fixtures::{group_paths, write_file};

#[test]
fn test_walker_respects_extension_filter() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "keep.md", b"one");
    write_file(dir.path(), "nested/keep.MD", b"two");
    write_file(dir.path(), "drop.txt", b"three");
    write_file(dir.path(), "noext", b"four");

    let config = WalkerConfig::default().with_include(Arc::new(ExtensionFilter::new([".md"])));
    let walker = Walker::new(dir.path(), config);
    let mut names: Vec<String> = walker
        .walk()
        .map(|r| r.unwrap().path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    names.sort();

    assert_eq!(names, vec!["keep.MD", "keep.md"]);
}

#[test]
fn test_excluded_duplicates_never_grouped() {
    let dir = tempdir().unwrap();
    let a = write_file(dir.path(), "a.raw", b"raw sensor dump");
    let b = write_file(dir.path(), "b.raw", b"raw sensor dump");
    write_file(dir.path(), "c.txt", b"raw sensor dump");
    write_file(dir.path(), "d.txt", b"raw sensor dump");

    let groups = scan(
        dir.path(),
        Some(Arc::new(ExtensionFilter::new(["raw"]))),
    )
    .unwrap();

    assert_eq!(group_paths(&groups), vec![vec![a, b]]);
}

#[test]
fn test_closure_filter() {
    let dir = tempdir().unwrap();
    let big_a = write_file(dir.path(), "big_a", &[7u8; 64]);
    let big_b = write_file(dir.path(), "big_b", &[7u8; 64]);
    write_file(dir.path(), "skip_a", &[7u8; 64]);
    write_file(dir.path(), "skip_b", &[7u8; 64]);

    let filter: Arc<dyn IncludeFilter> = Arc::new(|path: &Path| {
        path.file_name()
            .is_some_and(|n| n.to_string_lossy().starts_with("big"))
    });
    let (groups, summary) = DuplicateFinder::new(FinderConfig::default().with_include(filter))
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(summary.total_files, 2);
    assert_eq!(group_paths(&groups), vec![vec![big_a, big_b]]);
}

#[test]
fn test_only_images_filter() {
    let dir = tempdir().unwrap();
    for name in ["a.jpg", "b.jpeg", "c.heic", "d.webp", "e.tiff", "f.txt"] {
        write_file(dir.path(), name, b"pixels");
    }

    let (groups, summary) = DuplicateFinder::new(
        FinderConfig::default().with_include(Arc::new(ExtensionFilter::images())),
    )
    .find_duplicates(dir.path())
    .unwrap();

    assert_eq!(summary.total_files, 4);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 4);
}

#[test]
fn test_dot_named_image_is_included() {
    let dir = tempdir().unwrap();
    let hidden = write_file(dir.path(), ".png", b"png bytes");
    let visible = write_file(dir.path(), "cover.png", b"png bytes");
    write_file(dir.path(), ".bashrc", b"png bytes");

    let groups = scan(dir.path(), Some(Arc::new(ExtensionFilter::images()))).unwrap();

    assert_eq!(group_paths(&groups), vec![vec![hidden, visible]]);
}
