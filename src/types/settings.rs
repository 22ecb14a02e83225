use serde::{Deserialize, Serialize};

/// Top-level bot settings container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct BotSettings {
    #[serde(default)]
    pub general: GeneralSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub listing: ListingSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub rpc: RpcSettings,
}

/// General bot settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralSettings {
    /// Default locale for status messages ("en" or "pl").
    pub locale: String,
    /// Directory with locale JSON files. Built-in translations are used when unset.
    pub locales_dir: Option<String>,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            locale: "en".to_string(),
            locales_dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageSettings {
    /// SQLite database file. The special value `:memory:` keeps everything in RAM.
    pub database_path: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database_path: "bookmarks.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListingSettings {
    pub page_size: i64,
}

impl Default for ListingSettings {
    fn default() -> Self {
        Self { page_size: 10 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directive, e.g. "info" or "msgmark=debug".
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcSettings {
    pub max_requests_per_second: u32,
}

impl Default for RpcSettings {
    fn default() -> Self {
        Self {
            max_requests_per_second: 200,
        }
    }
}
