//! Integration-level unit tests for the SettingsEngine public API.
//!
//! These tests exercise the SettingsEngine through its public trait interface,
//! validating default loading, value persistence, and reset behavior.

use serde_json::json;
use tempfile::TempDir;
use video_pocket::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use video_pocket::types::errors::SettingsError;
use video_pocket::types::settings::{AppSettings, DEFAULT_BUFFER_SIZE};

/// Helper: create a SettingsEngine backed by a temp directory that lives for the
/// duration of the test (the caller holds the `TempDir` handle).
fn engine_in_temp(dir: &TempDir) -> SettingsEngine {
    let path = dir
        .path()
        .join("settings.json")
        .to_string_lossy()
        .to_string();
    SettingsEngine::new(Some(path))
}

/// Without a config file, `load()` returns the built-in defaults.
#[test]
fn test_load_defaults_when_no_config_file_exists() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);

    let settings = engine.load().unwrap();
    assert_eq!(settings, AppSettings::default());
    assert_eq!(settings.downloads.buffer_size, DEFAULT_BUFFER_SIZE);
    assert_eq!(settings.playback.load_timeout_secs, 15);
    assert_eq!(settings.thumbnails.youtube_base_url, "https://img.youtube.com");
}

/// A value set on one engine is visible to a fresh engine reading the same file.
#[test]
fn test_set_value_persists_changes() {
    let dir = TempDir::new().unwrap();

    {
        let mut engine = engine_in_temp(&dir);
        engine.load().unwrap();
        engine.set_value("downloads.buffer_size", json!(65536)).unwrap();
        engine.set_value("downloads.output_dir", json!("/media/videos")).unwrap();
    }

    let mut engine = engine_in_temp(&dir);
    let settings = engine.load().unwrap();
    assert_eq!(settings.downloads.buffer_size, 65536);
    assert_eq!(settings.downloads.output_dir.as_deref(), Some("/media/videos"));
}

#[test]
fn test_unknown_key_is_rejected() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);

    let err = engine.set_value("downloads.turbo", json!(true)).unwrap_err();
    assert!(matches!(err, SettingsError::InvalidKey(_)));

    let err = engine.set_value("nope.buffer_size", json!(1)).unwrap_err();
    assert!(matches!(err, SettingsError::InvalidKey(_)));
}

/// A value of the wrong type is rejected and the settings stay unchanged.
#[test]
fn test_wrong_type_is_rejected() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);

    let err = engine
        .set_value("playback.load_timeout_secs", json!("soon"))
        .unwrap_err();
    assert!(matches!(err, SettingsError::InvalidValue(_)));
    assert_eq!(engine.get_settings().playback.load_timeout_secs, 15);
}

#[test]
fn test_reset_restores_defaults() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);
    engine.set_value("playback.load_timeout_secs", json!(60)).unwrap();

    engine.reset().unwrap();
    assert_eq!(engine.get_settings(), &AppSettings::default());

    let mut reread = engine_in_temp(&dir);
    assert_eq!(reread.load().unwrap(), AppSettings::default());
}

/// A malformed file is reported instead of silently replaced.
#[test]
fn test_malformed_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("settings.json"), "{ not json").unwrap();

    let mut engine = engine_in_temp(&dir);
    let err = engine.load().unwrap_err();
    assert!(matches!(err, SettingsError::SerializationError(_)));
}

/// Values that would stall or break the download pipeline are refused.
#[test]
fn test_out_of_range_values_are_rejected() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);

    let err = engine
        .set_value("downloads.export_poll_interval_ms", json!(0))
        .unwrap_err();
    assert!(matches!(err, SettingsError::InvalidValue(_)));

    let err = engine
        .set_value("downloads.indeterminate_progress_cap", json!(1.5))
        .unwrap_err();
    assert!(matches!(err, SettingsError::InvalidValue(_)));
    assert_eq!(engine.get_settings(), &AppSettings::default());
    assert!(!dir.path().join("settings.json").exists());
}

/// A whole section can be replaced through its bare name.
#[test]
fn test_set_whole_section() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);

    engine.set_value("playback", json!({"load_timeout_secs": 30})).unwrap();
    assert_eq!(engine.get_settings().playback.load_timeout_secs, 30);
    assert_eq!(engine.config_path(), dir.path().join("settings.json"));
}
