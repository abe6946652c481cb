use depresso_settings::{Config, ConfigError, Environment, SettingsError};
use tempfile::TempDir;

#[test]
fn test_toml_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = Config::new();
    config.environment = Environment::Production;
    config.api_key = Some("token".to_string());
    config.upload.chunk_size = 512 * 1024;
    config.save_to_file(&path).unwrap();

    let loaded = Config::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_json_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{"environment": "development", "chat": {"connect_timeout_ms": 250, "reconnect_delay_ms": 100}}"#,
    )
    .unwrap();

    let loaded = Config::load_from_file(&path).unwrap();
    assert_eq!(loaded.chat.connect_timeout_ms, 250);
    assert_eq!(loaded.api_key, None);
}

#[test]
fn test_unknown_extension_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "environment: production").unwrap();

    let err = Config::load_from_file(&path).unwrap_err();
    assert!(matches!(
        err,
        SettingsError::Invalid(ConfigError::UnsupportedFormat(ext)) if ext == "yaml"
    ));

    assert!(Config::new().save_to_file(&path).is_err());
}

#[test]
fn test_invalid_file_fails_validation() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[upload]\nmax_file_size = 0\nallowed_image_types = []\nallowed_video_types = []\nchunk_size = 1\n").unwrap();

    assert!(matches!(
        Config::load_from_file(&path),
        Err(SettingsError::Invalid(ConfigError::ValueOutOfRange { .. }))
    ));
}

#[test]
fn test_missing_file_is_load_error() {
    let dir = TempDir::new().unwrap();
    let result = Config::load_or_default(Some(&dir.path().join("absent.toml")));
    assert!(matches!(result, Err(SettingsError::Read { .. })));
}
