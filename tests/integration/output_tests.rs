use dupecheck::duplicates::DuplicateFinder;
use dupecheck::error::ExitCode;
use dupecheck::output::{analyze_directories, ConsoleReport, JsonOutput};

use super::fixtures::setup_fixture_tree;

#[test]
fn test_console_report_for_fixture_tree() {
    let dir = setup_fixture_tree();
    let root = dir.path();
    let (groups, _) = DuplicateFinder::with_defaults().find_duplicates(root).unwrap();

    let text = ConsoleReport::new(&groups).render();

    let identical = root.join("identical").display().to_string();
    let nested = root.join("identical/nested").display().to_string();
    let edge = root.join("edge_cases").display().to_string();
    assert!(text.contains(&format!("├─ {}   2 duplicates", identical)));
    assert!(text.contains(&format!("├─ {}   2 duplicates", nested)));
    assert!(text.contains(&format!("├─ {}   2 duplicates", edge)));
    assert!(text.contains("Total: 6 duplicate files could save "));
    assert!(text.contains("(3 copies, "));
    assert!(!text.contains("unique"));
    assert!(!text.contains("similar"));
}

#[test]
fn test_directory_stats_order() {
    let dir = setup_fixture_tree();
    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    let dirs = analyze_directories(&groups);

    for pair in dirs.windows(2) {
        assert!(
            pair[0].wasted > pair[1].wasted
                || (pair[0].wasted == pair[1].wasted && pair[0].path < pair[1].path)
        );
    }
}

#[test]
fn test_json_report_for_fixture_tree() {
    let dir = setup_fixture_tree();
    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    let mut buffer = Vec::new();
    JsonOutput::new(&groups, &summary, ExitCode::Success)
        .write_to(&mut buffer, true)
        .unwrap();
    let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();

    let duplicates = value["duplicates"].as_array().unwrap();
    assert_eq!(duplicates.len(), 3);
    assert_eq!(duplicates[0]["files"].as_array().unwrap().len(), 3);
    assert_eq!(duplicates[0]["hash"].as_str().unwrap().len(), 16);
    assert_eq!(value["summary"]["total_files"], 10);
    assert_eq!(value["summary"]["duplicate_files"], 4);
    assert_eq!(value["summary"]["exit_code"], 0);
}
