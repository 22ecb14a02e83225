use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde_json::Value;

use crate::types::errors::LocaleError;

/// Supported locales.
pub const SUPPORTED_LOCALES: &[&str] = &["en", "pl"];

/// Default locale when the requested one is not supported.
const DEFAULT_LOCALE: &str = "en";

const BUILTIN_EN: &str = include_str!("../../locales/en.json");
const BUILTIN_PL: &str = include_str!("../../locales/pl.json");

/// Trait defining the localization engine interface.
pub trait LocalizationEngineTrait {
    fn initialize(&mut self) -> Result<(), LocaleError>;
    fn set_locale(&mut self, lang: &str) -> Result<(), LocaleError>;
    fn get_locale(&self) -> &str;
    fn t(&self, key: &str, params: Option<&HashMap<String, String>>) -> String;
    fn plural(&self, key: &str, count: u64, params: Option<&HashMap<String, String>>) -> String;
    fn get_available_locales(&self) -> Vec<String>;
}

/// Localization engine for user-facing status messages in English and Polish.
pub struct LocalizationEngine {
    /// Default locale (e.g., "en" or "pl").
    current_locale: String,
    /// Loaded locale data: maps locale name to its parsed JSON value.
    locales: HashMap<String, Value>,
    /// Directory with locale JSON files; `None` means built-in translations.
    locales_dir: Option<PathBuf>,
}

impl LocalizationEngine {
    /// Creates a new LocalizationEngine reading from the given locales directory.
    pub fn new(locales_dir: impl Into<PathBuf>) -> Self {
        Self {
            current_locale: DEFAULT_LOCALE.to_string(),
            locales: HashMap::new(),
            locales_dir: Some(locales_dir.into()),
        }
    }

    /// Creates a LocalizationEngine that uses the translations compiled into the binary.
    pub fn builtin() -> Self {
        Self {
            current_locale: DEFAULT_LOCALE.to_string(),
            locales: HashMap::new(),
            locales_dir: None,
        }
    }

    /// Looks up a nested key in a JSON value using dot notation.
    /// For example, "delete.success" looks up `value["delete"]["success"]`.
    fn lookup_key<'a>(data: &'a Value, key: &str) -> Option<&'a Value> {
        let mut current = data;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    /// Replaces `{param_name}` placeholders in a string with values from the params map.
    fn interpolate(template: &str, params: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in params {
            let placeholder = format!("{{{}}}", key);
            result = result.replace(&placeholder, value);
        }
        result
    }

    /// Determines the Polish plural form for a given count.
    /// Returns one of: "one", "few", "many".
    fn polish_plural_form(count: u64) -> &'static str {
        let mod10 = count % 10;
        let mod100 = count % 100;

        if count == 1 {
            "one"
        } else if (2..=4).contains(&mod10) && !(12..=14).contains(&mod100) {
            "few"
        } else {
            "many"
        }
    }

    /// Determines the English plural form for a given count.
    /// Returns one of: "one", "other".
    fn english_plural_form(count: u64) -> &'static str {
        if count == 1 {
            "one"
        } else {
            "other"
        }
    }

    fn plural_form(locale: &str, count: u64) -> &'static str {
        match locale {
            "pl" => Self::polish_plural_form(count),
            _ => Self::english_plural_form(count),
        }
    }

    /// Resolves a requested locale to a loaded one, falling back to the default locale.
    fn resolve<'a>(&'a self, lang: Option<&'a str>) -> &'a str {
        match lang {
            Some(l) if self.locales.contains_key(l) => l,
            _ => &self.current_locale,
        }
    }

    /// Like [`LocalizationEngineTrait::t`], but in the given locale when it is loaded.
    pub fn t_in(
        &self,
        lang: Option<&str>,
        key: &str,
        params: Option<&HashMap<String, String>>,
    ) -> String {
        let locale = self.resolve(lang);
        let text = match self
            .locales
            .get(locale)
            .and_then(|data| Self::lookup_key(data, key))
            .and_then(Value::as_str)
        {
            Some(s) => s,
            None => return key.to_string(),
        };

        match params {
            Some(p) => Self::interpolate(text, p),
            None => text.to_string(),
        }
    }

    /// Like [`LocalizationEngineTrait::plural`], but in the given locale when it is loaded.
    ///
    /// A `{count}` parameter is added automatically. Falls back to the `_other`
    /// form, then to the base key.
    pub fn plural_in(
        &self,
        lang: Option<&str>,
        key: &str,
        count: u64,
        params: Option<&HashMap<String, String>>,
    ) -> String {
        let locale = self.resolve(lang);
        let plural_key = format!("{}_{}", key, Self::plural_form(locale, count));

        let mut merged_params = params.cloned().unwrap_or_default();
        merged_params
            .entry("count".to_string())
            .or_insert_with(|| count.to_string());

        let result = self.t_in(Some(locale), &plural_key, Some(&merged_params));
        if result != plural_key {
            return result;
        }

        let other_key = format!("{}_other", key);
        let other_result = self.t_in(Some(locale), &other_key, Some(&merged_params));
        if other_result == other_key {
            return key.to_string();
        }
        other_result
    }

    fn load_builtin(&mut self) -> Result<(), LocaleError> {
        for (locale, raw) in [("en", BUILTIN_EN), ("pl", BUILTIN_PL)] {
            let data: Value = serde_json::from_str(raw).map_err(|e| {
                LocaleError::FileNotFound(format!("built-in {}.json: {}", locale, e))
            })?;
            self.locales.insert(locale.to_string(), data);
        }
        Ok(())
    }
}

impl LocalizationEngineTrait for LocalizationEngine {
    /// Loads all locale JSON files from the locales directory, or the built-in ones.
    fn initialize(&mut self) -> Result<(), LocaleError> {
        let dir = match self.locales_dir.clone() {
            Some(dir) => dir,
            None => return self.load_builtin(),
        };

        if !dir.exists() {
            return Err(LocaleError::FileNotFound(
                dir.to_string_lossy().to_string(),
            ));
        }

        for locale in SUPPORTED_LOCALES {
            let file_path = dir.join(format!("{}.json", locale));
            if file_path.exists() {
                let content = fs::read_to_string(&file_path).map_err(|e| {
                    LocaleError::FileNotFound(format!(
                        "{}: {}",
                        file_path.to_string_lossy(),
                        e
                    ))
                })?;
                let data: Value = serde_json::from_str(&content).map_err(|e| {
                    LocaleError::FileNotFound(format!(
                        "Failed to parse {}: {}",
                        file_path.to_string_lossy(),
                        e
                    ))
                })?;
                self.locales.insert(locale.to_string(), data);
            }
        }

        // At least one locale must be loaded
        if self.locales.is_empty() {
            return Err(LocaleError::FileNotFound(
                "No locale files found".to_string(),
            ));
        }

        Ok(())
    }

    /// Switches the default locale. Returns an error if the locale is not supported
    /// or not loaded.
    fn set_locale(&mut self, lang: &str) -> Result<(), LocaleError> {
        if !SUPPORTED_LOCALES.contains(&lang) {
            return Err(LocaleError::UnsupportedLocale(lang.to_string()));
        }
        if !self.locales.contains_key(lang) {
            return Err(LocaleError::FileNotFound(format!(
                "Locale '{}' not loaded",
                lang
            )));
        }
        self.current_locale = lang.to_string();
        Ok(())
    }

    fn get_locale(&self) -> &str {
        &self.current_locale
    }

    /// Looks up a translation key in the default locale. Returns the key itself
    /// if the translation is not found.
    fn t(&self, key: &str, params: Option<&HashMap<String, String>>) -> String {
        self.t_in(None, key, params)
    }

    /// Looks up a pluralized translation key in the default locale. The base key
    /// is appended with "_one", "_few", "_many" or "_other" per the locale's rules.
    fn plural(&self, key: &str, count: u64, params: Option<&HashMap<String, String>>) -> String {
        self.plural_in(None, key, count, params)
    }

    /// Returns a list of all available (loaded) locales.
    fn get_available_locales(&self) -> Vec<String> {
        let mut locales: Vec<String> = self.locales.keys().cloned().collect();
        locales.sort();
        locales
    }
}
