use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A message as handed over by the chat gateway layer.
///
/// Snowflake IDs are carried as `i64` and accepted as JSON numbers or numeric
/// strings; embeds and components stay as raw JSON trees because the store
/// treats them as opaque payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceMessage {
    #[serde(deserialize_with = "snowflake::deserialize")]
    pub id: i64,
    #[serde(deserialize_with = "snowflake::deserialize")]
    pub channel_id: i64,
    /// Absent for direct messages.
    #[serde(default, deserialize_with = "option_snowflake::deserialize")]
    pub guild_id: Option<i64>,
    pub author: SourceAuthor,
    #[serde(default)]
    pub content: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub attachments: Vec<SourceAttachment>,
    #[serde(default)]
    pub embeds: Vec<Value>,
    #[serde(default)]
    pub components: Vec<Value>,
    #[serde(default)]
    pub flags: i64,
}

/// Wire form of a snowflake: gateways send large IDs as strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawSnowflake {
    Number(i64),
    Text(String),
}

impl RawSnowflake {
    fn into_i64<E: serde::de::Error>(self) -> Result<i64, E> {
        match self {
            RawSnowflake::Number(n) => Ok(n),
            RawSnowflake::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("invalid snowflake '{}'", s))),
        }
    }
}

pub mod snowflake {
    use super::RawSnowflake;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        RawSnowflake::deserialize(deserializer)?.into_i64()
    }
}

pub mod option_snowflake {
    use super::RawSnowflake;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<RawSnowflake>::deserialize(deserializer)?
            .map(RawSnowflake::into_i64)
            .transpose()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceAuthor {
    pub display_name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceAttachment {
    #[serde(deserialize_with = "snowflake::deserialize")]
    pub id: i64,
    pub url: String,
    pub filename: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub size: u64,
}
