use dupecheck::cli::OutputFormat;
use dupecheck::config::{Config, ENV_PREFIX};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    // Use figment directly without Env to avoid interference from other tests
    let figment = Figment::from(Serialized::defaults(Config::default()));
    let config: Config = figment.extract().unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.queue_capacity, 256);
    assert_eq!(config.output, OutputFormat::Text);
}

#[test]
fn test_config_load_from_env() {
    std::env::set_var("DUPECHECK_TEST_ENV_WORKERS", "12");
    std::env::set_var("DUPECHECK_TEST_ENV_MATCH_MTIME", "true");

    let figment = Figment::from(Serialized::defaults(Config::default()))
        .merge(Env::prefixed("DUPECHECK_TEST_ENV_"));
    let config: Config = figment.extract().unwrap();

    assert_eq!(config.workers, Some(12));
    assert!(config.match_mtime);

    std::env::remove_var("DUPECHECK_TEST_ENV_WORKERS");
    std::env::remove_var("DUPECHECK_TEST_ENV_MATCH_MTIME");
}

#[test]
fn test_config_from_toml_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        "workers = 3\nqueue_capacity = 64\nextensions = [\"raw\", \"dng\"]\noutput = \"json\"\nprogress = false\n",
    )
    .unwrap();

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .extract()
        .unwrap();

    assert_eq!(config.workers, Some(3));
    assert_eq!(config.queue_capacity, 64);
    assert_eq!(config.extensions, vec!["raw", "dng"]);
    assert_eq!(config.output, OutputFormat::Json);
    assert!(!config.progress);
    assert!(!config.only_images);
}

#[test]
fn test_env_overrides_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "workers = 3\n").unwrap();
    std::env::set_var("DUPECHECK_TEST_LAYER_WORKERS", "9");

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("DUPECHECK_TEST_LAYER_"))
        .extract()
        .unwrap();

    assert_eq!(config.workers, Some(9));
    std::env::remove_var("DUPECHECK_TEST_LAYER_WORKERS");
}

#[test]
fn test_load_explicit_invalid_file_is_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "workers = \"lots\"\n").unwrap();

    let err = Config::load(Some(&path)).unwrap_err();
    assert!(format!("{:#}", err).contains("Invalid config file"));
}

#[test]
fn test_load_explicit_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dupecheck.toml");
    fs::write(&path, "only_images = true\nqueue_capacity = 17\n").unwrap();

    let config = Config::load(Some(&path)).unwrap();
    assert!(config.only_images);
    assert_eq!(config.queue_capacity, 17);
    assert!(config.include_filter().is_some());
}

#[test]
fn test_env_prefix() {
    assert_eq!(ENV_PREFIX, "DUPECHECK_");
    assert!(Config::config_path().map_or(true, |p| p.ends_with("config.toml")));
}
