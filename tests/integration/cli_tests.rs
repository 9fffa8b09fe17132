use clap::Parser;
use dupecheck::cli::Cli;
use dupecheck::error::ExitCode;
use dupecheck::run_app;
use tempfile::tempdir;

use super::fixtures::{setup_fixture_tree, write_file};

fn parse(args: &[&str]) -> Cli {
    let mut argv = vec!["dupecheck", "--no-progress"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
}

#[test]
fn test_run_app_text_report() {
    let dir = setup_fixture_tree();
    let root = dir.path().to_string_lossy().into_owned();

    let code = run_app(parse(&["-q", &root])).unwrap();
    assert_eq!(code, ExitCode::Success);
}

#[test]
fn test_run_app_json_report() {
    let dir = setup_fixture_tree();
    let root = dir.path().to_string_lossy().into_owned();

    let code = run_app(parse(&["-o", "json", &root])).unwrap();
    assert_eq!(code, ExitCode::Success);
}

#[test]
fn test_run_app_no_duplicates_is_success() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "only.txt", b"alone");
    let root = dir.path().to_string_lossy().into_owned();

    assert_eq!(run_app(parse(&["-q", &root])).unwrap(), ExitCode::Success);
}

#[test]
fn test_run_app_missing_root_is_general_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing").to_string_lossy().into_owned();

    let err = run_app(parse(&["-q", &missing])).unwrap_err();
    assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
    assert!(format!("{:#}", err).contains("Path not found"));
}

#[test]
fn test_run_app_missing_config_is_error() {
    let dir = tempdir().unwrap();
    let root = dir.path().to_string_lossy().into_owned();
    let config = dir.path().join("absent.toml").to_string_lossy().into_owned();

    let err = run_app(parse(&["-q", "--config", &config, &root])).unwrap_err();
    assert!(format!("{:#}", err).contains("Config file not found"));
}
