use super::data::{path_display, Config, ConfigKey};
use super::io::ConfigError;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_load_nonexistent_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nonexistent_config.toml");

    let config = Config::load_from_path(&config_path).expect("Failed to load config");

    assert_eq!(config, Config::default());
}

#[test]
fn test_config_persistence_lifecycle() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nested").join("config.toml");

    let mut config = Config::default();
    config.set(ConfigKey::Endpoint, " http://assistant.local:5000/ ");
    config.set(ConfigKey::DataDir, "/tmp/hikmat-data");
    config.save_to_path(&config_path).expect("Failed to save config");

    let loaded = Config::load_from_path(&config_path).expect("Failed to load config");
    assert_eq!(loaded.endpoint.as_deref(), Some("http://assistant.local:5000/"));
    assert_eq!(loaded.data_dir, Some(PathBuf::from("/tmp/hikmat-data")));

    let mut loaded = loaded;
    loaded.unset(ConfigKey::Endpoint);
    loaded.save_to_path(&config_path).expect("Failed to save config");

    let reloaded = Config::load_from_path(&config_path).expect("Failed to load config");
    assert_eq!(reloaded.endpoint, None);
    assert!(reloaded.data_dir.is_some());
}

#[test]
fn test_invalid_toml_reports_parse_error_with_path() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, "endpoint = [unterminated").unwrap();

    let err = Config::load_from_path(&config_path).expect_err("parse should fail");
    let config_err = err
        .downcast_ref::<ConfigError>()
        .expect("error should be a ConfigError");
    assert!(matches!(config_err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("Failed to parse config"));
}

#[test]
fn config_keys_parse_by_cli_name() {
    assert_eq!(ConfigKey::parse("endpoint"), Some(ConfigKey::Endpoint));
    assert_eq!(ConfigKey::parse("data-dir"), Some(ConfigKey::DataDir));
    assert_eq!(ConfigKey::parse("theme"), None);
}

#[test]
fn path_display_keeps_paths_outside_home() {
    assert_eq!(path_display("/definitely/not/home"), "/definitely/not/home");
}
