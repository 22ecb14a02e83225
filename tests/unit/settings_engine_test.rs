//! Unit tests for the SettingsEngine: file load/save and dot-path updates.

use std::fs;

use msgmark::services::settings_engine::{SettingsEngine, SettingsEngineTrait, CONFIG_FILE_NAME};
use msgmark::types::errors::SettingsError;
use msgmark::types::settings::BotSettings;
use serde_json::json;
use tempfile::TempDir;

fn engine_in(tmp: &TempDir) -> SettingsEngine {
    let path = tmp.path().join(CONFIG_FILE_NAME).to_string_lossy().to_string();
    SettingsEngine::new(Some(path))
}

#[test]
fn test_load_defaults_when_no_file() {
    let tmp = TempDir::new().unwrap();
    let mut engine = engine_in(&tmp);
    assert_eq!(engine.load().unwrap(), BotSettings::default());
}

#[test]
fn test_default_values() {
    let defaults = BotSettings::default();
    assert_eq!(defaults.general.locale, "en");
    assert!(defaults.general.locales_dir.is_none());
    assert_eq!(defaults.storage.database_path, "bookmarks.db");
    assert_eq!(defaults.listing.page_size, 10);
    assert_eq!(defaults.logging.filter, "info");
    assert_eq!(defaults.rpc.max_requests_per_second, 200);
}

#[test]
fn test_set_value_persists() {
    let tmp = TempDir::new().unwrap();
    let mut engine = engine_in(&tmp);
    engine.load().unwrap();
    engine.set_value("listing.page_size", json!(5)).unwrap();
    engine.set_value("general.locale", json!("pl")).unwrap();

    let mut reloaded = engine_in(&tmp);
    let settings = reloaded.load().unwrap();
    assert_eq!(settings.listing.page_size, 5);
    assert_eq!(settings.general.locale, "pl");
}

#[test]
fn test_update_value_does_not_touch_disk() {
    let tmp = TempDir::new().unwrap();
    let mut engine = engine_in(&tmp);
    engine.update_value("logging.filter", json!("debug")).unwrap();

    assert_eq!(engine.get_settings().logging.filter, "debug");
    assert!(!tmp.path().join(CONFIG_FILE_NAME).exists());
}

#[test]
fn test_partial_file_fills_missing_sections() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(CONFIG_FILE_NAME),
        r#"{"storage": {"database_path": "/srv/bm.db"}}"#,
    )
    .unwrap();

    let mut engine = engine_in(&tmp);
    let settings = engine.load().unwrap();
    assert_eq!(settings.storage.database_path, "/srv/bm.db");
    assert_eq!(settings.listing, BotSettings::default().listing);
}

#[test]
fn test_load_malformed_json() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(CONFIG_FILE_NAME), "{ invalid json }").unwrap();

    let mut engine = engine_in(&tmp);
    assert!(matches!(engine.load(), Err(SettingsError::SerializationError(_))));
}

#[test]
fn test_load_rejects_zero_page_size() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(CONFIG_FILE_NAME),
        r#"{"listing": {"page_size": 0}}"#,
    )
    .unwrap();

    let mut engine = engine_in(&tmp);
    assert!(matches!(engine.load(), Err(SettingsError::InvalidValue(_))));
}

#[test]
fn test_set_value_errors() {
    let tmp = TempDir::new().unwrap();
    let mut engine = engine_in(&tmp);

    assert!(matches!(engine.set_value("", json!(1)), Err(SettingsError::InvalidKey(_))));
    assert!(matches!(
        engine.set_value("listing.nope", json!(1)),
        Err(SettingsError::InvalidKey(_))
    ));
    assert!(matches!(
        engine.set_value("listing.page_size", json!("ten")),
        Err(SettingsError::InvalidValue(_))
    ));
    assert!(matches!(
        engine.set_value("general.locale", json!("de")),
        Err(SettingsError::InvalidValue(_))
    ));
    assert_eq!(*engine.get_settings(), BotSettings::default());
}

#[test]
fn test_get_config_path() {
    let engine = SettingsEngine::new(Some("/tmp/msgmark-test.json".to_string()));
    assert_eq!(engine.get_config_path(), "/tmp/msgmark-test.json");
}
