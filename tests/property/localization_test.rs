//! Property-based tests for locale completeness.
//!
//! The English and Polish locale files must cover the same keys. Plural keys
//! are grouped by base: English needs `_one`/`_other`, Polish needs
//! `_one`/`_few`/`_many`/`_other`. Any count must resolve to a real
//! translation in both languages.

use msgmark::services::localization_engine::{LocalizationEngine, LocalizationEngineTrait};
use proptest::prelude::*;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

const PLURAL_SUFFIXES: &[&str] = &["_one", "_few", "_many", "_other"];

fn load_locale(path: &str) -> Value {
    let content = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read locale file {}: {}", path, e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse locale file {}: {}", path, e))
}

/// Flatten a nested JSON object into dot-notation keys.
fn flatten_keys(value: &Value, prefix: &str, keys: &mut BTreeSet<String>) {
    if let Value::Object(map) = value {
        for (k, v) in map {
            let full_key = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{}.{}", prefix, k)
            };
            match v {
                Value::Object(_) => flatten_keys(v, &full_key, keys),
                _ => {
                    keys.insert(full_key);
                }
            }
        }
    }
}

/// Splits `save.attachments_few` into (`save.attachments`, `_few`).
fn split_plural(key: &str) -> Option<(String, &'static str)> {
    PLURAL_SUFFIXES
        .iter()
        .find(|suffix| key.ends_with(*suffix))
        .map(|suffix| (key[..key.len() - suffix.len()].to_string(), *suffix))
}

struct Keys {
    regular: BTreeSet<String>,
    plural: BTreeMap<String, BTreeSet<&'static str>>,
}

fn keys_of(path: &str) -> Keys {
    let mut all = BTreeSet::new();
    flatten_keys(&load_locale(path), "", &mut all);

    let mut keys = Keys {
        regular: BTreeSet::new(),
        plural: BTreeMap::new(),
    };
    for key in all {
        match split_plural(&key) {
            Some((base, suffix)) => {
                keys.plural.entry(base).or_default().insert(suffix);
            }
            None => {
                keys.regular.insert(key);
            }
        }
    }
    keys
}

#[test]
fn regular_keys_match() {
    let en = keys_of("locales/en.json");
    let pl = keys_of("locales/pl.json");
    assert_eq!(en.regular, pl.regular);
}

#[test]
fn plural_groups_match_and_are_complete() {
    let en = keys_of("locales/en.json");
    let pl = keys_of("locales/pl.json");

    assert_eq!(
        en.plural.keys().collect::<Vec<_>>(),
        pl.plural.keys().collect::<Vec<_>>()
    );
    for (base, suffixes) in &en.plural {
        assert!(suffixes.contains("_one") && suffixes.contains("_other"), "en {} has {:?}", base, suffixes);
    }
    for (base, suffixes) in &pl.plural {
        for required in PLURAL_SUFFIXES {
            assert!(suffixes.contains(required), "pl {} is missing {}", base, required);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn every_count_resolves_to_a_translation(count in 0u64..10_000) {
        let mut engine = LocalizationEngine::new("locales");
        engine.initialize().expect("locales directory should load");

        for base in keys_of("locales/en.json").plural.keys() {
            for locale in ["en", "pl"] {
                let text = engine.plural_in(Some(locale), base, count, None);
                prop_assert_ne!(&text, base);
                prop_assert!(text.contains(&count.to_string()), "{} / {}: {}", locale, base, text);
            }
        }
    }
}
