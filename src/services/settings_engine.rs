// msgmark Settings Engine
// Loads bot settings from a JSON file, applies environment overrides,
// and updates individual values by dot-notation key.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::services::localization_engine::SUPPORTED_LOCALES;
use crate::types::errors::SettingsError;
use crate::types::settings::BotSettings;

/// Name of the settings file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "msgmark.json";

pub const ENV_CONFIG_DIR: &str = "MSGMARK_CONFIG_DIR";
pub const ENV_DATABASE_PATH: &str = "MSGMARK_DATABASE_PATH";
pub const ENV_LOCALE: &str = "MSGMARK_LOCALE";
pub const ENV_LOG: &str = "MSGMARK_LOG";

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<BotSettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &BotSettings;
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError>;
    fn get_config_path(&self) -> &str;
}

/// Settings engine implementation that persists settings as JSON on disk.
pub struct SettingsEngine {
    config_path: String,
    settings: BotSettings,
}

impl SettingsEngine {
    /// Creates a new SettingsEngine.
    ///
    /// If `path_override` is `Some`, uses that path for the config file.
    /// Otherwise uses `msgmark.json` under `$MSGMARK_CONFIG_DIR`, or the working directory.
    pub fn new(path_override: Option<String>) -> Self {
        let config_path = match path_override {
            Some(p) => p,
            None => default_config_dir()
                .join(CONFIG_FILE_NAME)
                .to_string_lossy()
                .to_string(),
        };

        Self {
            config_path,
            settings: BotSettings::default(),
        }
    }

    /// Applies a change to the in-memory settings without persisting it.
    pub fn update_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError> {
        let updated = with_value(&self.settings, key, value)?;
        validate(&updated)?;
        self.settings = updated;
        Ok(())
    }

    /// Applies `MSGMARK_*` environment overrides to the in-memory settings.
    pub fn apply_env_overrides(&mut self) {
        apply_overrides(&mut self.settings, |name| std::env::var(name).ok());
    }
}

fn default_config_dir() -> PathBuf {
    match std::env::var_os(ENV_CONFIG_DIR) {
        Some(dir) => PathBuf::from(dir),
        None => PathBuf::from("."),
    }
}

/// Overrides settings from a variable lookup. Empty values are ignored.
pub fn apply_overrides<F>(settings: &mut BotSettings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(path) = var(ENV_DATABASE_PATH) {
        debug!(path = %path, "database path overridden from environment");
        settings.storage.database_path = path;
    }
    if let Some(locale) = var(ENV_LOCALE) {
        if SUPPORTED_LOCALES.contains(&locale.as_str()) {
            settings.general.locale = locale;
        }
    }
    if let Some(filter) = var(ENV_LOG) {
        settings.logging.filter = filter;
    }
}

/// Returns a copy of `settings` with the value at the dot-notation `key` replaced.
///
/// The key must already exist. The result is validated by deserializing back
/// into `BotSettings`.
fn with_value(
    settings: &BotSettings,
    key: &str,
    value: serde_json::Value,
) -> Result<BotSettings, SettingsError> {
    if key.is_empty() {
        return Err(SettingsError::InvalidKey("Key cannot be empty".to_string()));
    }

    let mut json_value = serde_json::to_value(settings).map_err(|e| {
        SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
    })?;

    let (parents, last) = match key.rsplit_once('.') {
        Some((parents, last)) => (Some(parents), last),
        None => (None, key),
    };

    let mut current = &mut json_value;
    for part in parents.into_iter().flat_map(|p| p.split('.')) {
        current = current.get_mut(part).ok_or_else(|| {
            SettingsError::InvalidKey(format!("Key '{}' not found in settings", key))
        })?;
    }

    match current {
        serde_json::Value::Object(map) if map.contains_key(last) => {
            map.insert(last.to_string(), value);
        }
        serde_json::Value::Object(_) => {
            return Err(SettingsError::InvalidKey(format!(
                "Key '{}' not found in settings",
                key
            )));
        }
        _ => {
            return Err(SettingsError::InvalidKey(format!(
                "Cannot navigate to key '{}': intermediate value is not an object",
                key
            )));
        }
    }

    serde_json::from_value(json_value).map_err(|e| {
        SettingsError::InvalidValue(format!("Invalid value for key '{}': {}", key, e))
    })
}

/// Checks constraints serde cannot express.
fn validate(settings: &BotSettings) -> Result<(), SettingsError> {
    if settings.listing.page_size < 1 {
        return Err(SettingsError::InvalidValue(format!(
            "listing.page_size must be at least 1, got {}",
            settings.listing.page_size
        )));
    }
    if !SUPPORTED_LOCALES.contains(&settings.general.locale.as_str()) {
        return Err(SettingsError::InvalidValue(format!(
            "general.locale must be one of {:?}, got '{}'",
            SUPPORTED_LOCALES, settings.general.locale
        )));
    }
    if settings.rpc.max_requests_per_second == 0 {
        return Err(SettingsError::InvalidValue(
            "rpc.max_requests_per_second must be at least 1".to_string(),
        ));
    }
    Ok(())
}

impl SettingsEngineTrait for SettingsEngine {
    /// Loads settings from the JSON config file.
    ///
    /// If the file does not exist, returns default settings.
    /// If the file exists but is malformed, returns a serialization error.
    fn load(&mut self) -> Result<BotSettings, SettingsError> {
        let path = Path::new(&self.config_path);

        if !path.exists() {
            debug!(path = %self.config_path, "no settings file, using defaults");
            self.settings = BotSettings::default();
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| SettingsError::IoError(format!("Failed to read config file: {}", e)))?;

        let settings: BotSettings = serde_json::from_str(&content).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to parse config file: {}", e))
        })?;
        validate(&settings)?;

        self.settings = settings;
        Ok(self.settings.clone())
    }

    /// Saves the current settings to the JSON config file.
    ///
    /// Creates parent directories if they don't exist.
    fn save(&self) -> Result<(), SettingsError> {
        let path = Path::new(&self.config_path);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SettingsError::IoError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;

        fs::write(path, json)
            .map_err(|e| SettingsError::IoError(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    fn get_settings(&self) -> &BotSettings {
        &self.settings
    }

    /// Updates an individual setting by dot-notation key path and saves to disk.
    ///
    /// # Examples
    /// - `"listing.page_size"` → updates `settings.listing.page_size`
    /// - `"storage.database_path"` → updates `settings.storage.database_path`
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError> {
        self.update_value(key, value)?;
        self.save()
    }

    fn get_config_path(&self) -> &str {
        &self.config_path
    }
}
