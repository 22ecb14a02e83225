use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Display-ready view of a bookmark, rebuilt on every request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresentationModel {
    pub bookmark_id: i64,
    pub title: String,
    /// Message text merged with any Components v2 text.
    pub body: Option<String>,
    pub author: AuthorInfo,
    pub source_timestamp: DateTime<Utc>,
    pub hero_image: Option<HeroImage>,
    /// Images left over after hero selection, in encounter order.
    pub image_urls: Vec<String>,
    pub secondary_embeds: Vec<SecondaryEmbed>,
    pub is_components_v2: bool,
    /// Present when a component tree was decoded (fully or via the legacy path).
    pub components: Option<ComponentSummary>,
    pub attachments: Option<AttachmentSummary>,
    pub video_links: Vec<String>,
    pub link: LinkData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorInfo {
    pub display_name: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeroImage {
    pub url: String,
    /// Chosen because it looked like a GIF rather than by position.
    pub is_gif: bool,
}

/// An embed shown below the main card.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SecondaryEmbed {
    /// An embed from the source message, passed through untouched.
    Original { data: Value },
    /// An image-only card for an extra image.
    Image { url: String },
}

/// Which component extractor produced the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionPath {
    Full,
    Legacy,
}

/// Structural metadata about a Components v2 tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentSummary {
    pub extraction: ExtractionPath,
    pub has_buttons: bool,
    pub has_select_menus: bool,
    pub has_text_displays: bool,
    pub has_media_galleries: bool,
    pub has_files: bool,
    /// Type names in depth-first order.
    pub component_types: Vec<String>,
    /// One indented line per node, depth-first.
    pub layout: Vec<String>,
}

impl ComponentSummary {
    pub fn new(extraction: ExtractionPath) -> Self {
        Self {
            extraction,
            has_buttons: false,
            has_select_menus: false,
            has_text_displays: false,
            has_media_galleries: false,
            has_files: false,
            component_types: Vec::new(),
            layout: Vec::new(),
        }
    }

    /// First `max_lines` layout lines, plus the number of lines left out.
    pub fn layout_preview(&self, max_lines: usize) -> (&[String], usize) {
        let shown = self.layout.len().min(max_lines);
        (&self.layout[..shown], self.layout.len() - shown)
    }
}

/// Attachment counts by kind. Each attachment is counted exactly once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AttachmentSummary {
    pub images: usize,
    pub videos: usize,
    pub others: usize,
}

impl AttachmentSummary {
    pub fn total(&self) -> usize {
        self.images + self.videos + self.others
    }
}

/// Location of the source message, used to build a jump link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LinkData {
    pub guild_id: i64,
    pub channel_id: i64,
    pub message_id: i64,
}

impl LinkData {
    pub fn jump_url(&self) -> String {
        if self.guild_id == 0 {
            format!(
                "https://discord.com/channels/@me/{}/{}",
                self.channel_id, self.message_id
            )
        } else {
            format!(
                "https://discord.com/channels/{}/{}/{}",
                self.guild_id, self.channel_id, self.message_id
            )
        }
    }
}
