use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::message::SourceAttachment;

/// Message flag bit marking a message laid out with Components v2.
pub const COMPONENTS_V2_FLAG: i64 = 0x8000;

/// Represents a saved bookmark row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookmarkRecord {
    pub id: i64,
    pub owner_id: i64,
    pub source_message_id: i64,
    pub source_channel_id: i64,
    /// `0` for messages saved from direct messages.
    pub source_guild_id: i64,
    pub text_content: Option<String>,
    /// JSON list of embed objects, opaque to the store.
    pub embed_payload: Option<String>,
    pub author_display_name: String,
    pub author_avatar_url: Option<String>,
    pub source_timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    /// JSON list of [`AttachmentInfo`]; `None` when the message had no attachments.
    pub attachments_payload: Option<String>,
    /// JSON component tree, present only for messages that carried components.
    pub components_payload: Option<String>,
    pub message_flags: i64,
}

impl BookmarkRecord {
    /// Whether the source message was flagged as a Components v2 message.
    pub fn is_components_v2(&self) -> bool {
        self.message_flags & COMPONENTS_V2_FLAG != 0
    }
}

/// Snapshot of one attachment, computed once at save time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachmentInfo {
    pub id: i64,
    pub url: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub is_image: bool,
}

impl AttachmentInfo {
    pub fn from_source(attachment: &SourceAttachment) -> Self {
        let is_image = attachment
            .content_type
            .as_deref()
            .map(|ct| ct.starts_with("image/"))
            .unwrap_or(false);

        Self {
            id: attachment.id,
            url: attachment.url.clone(),
            filename: attachment.filename.clone(),
            content_type: attachment.content_type.clone(),
            width: attachment.width,
            height: attachment.height,
            size: attachment.size,
            is_image,
        }
    }
}

/// The arguments of a store insert that do not come straight from the message.
///
/// Produced by [`crate::services::message_capture::capture`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CapturedPayloads {
    pub embed_payload: Option<String>,
    pub components_payload: Option<String>,
    pub message_flags: i64,
    pub guild_id: i64,
}

/// One page of a user's bookmarks plus pagination metadata.
#[derive(Debug, Clone, Serialize)]
pub struct BookmarkPage {
    pub page: i64,
    pub total_pages: i64,
    pub total_count: i64,
    pub page_size: i64,
    pub records: Vec<BookmarkRecord>,
}

/// Compact row used by list views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookmarkListEntry {
    pub id: i64,
    pub author_display_name: String,
    pub source_timestamp: DateTime<Utc>,
    /// Message text cut to list length; `None` when the message had no text.
    pub preview: Option<String>,
    pub image_count: usize,
    pub file_count: usize,
}

/// Result of a successful save.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveReceipt {
    pub bookmark_id: i64,
    pub is_components_v2: bool,
    pub attachment_count: usize,
}
