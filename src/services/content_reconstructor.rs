//! Content Reconstructor for msgmark.
//!
//! Turns a stored [`BookmarkRecord`] back into a [`PresentationModel`]:
//! merges Components v2 text into the message body, gathers images from
//! component galleries and attachments, picks a hero image and lays out the
//! remaining images as secondary embeds.
//!
//! Reconstruction is pure and never fails. A payload that cannot be decoded is
//! treated as absent and reported in [`Reconstruction::issues`] so the caller
//! can log it in one place.

use serde_json::Value;
use url::Url;

use crate::types::bookmark::{AttachmentInfo, BookmarkRecord};
use crate::types::component::ComponentNode;
use crate::types::errors::PayloadError;
use crate::types::presentation::{
    AttachmentSummary, AuthorInfo, ComponentSummary, ExtractionPath, HeroImage, LinkData,
    PresentationModel, SecondaryEmbed,
};

/// Hosts whose images are treated as animated.
const GIF_HOSTS: &[&str] = &[
    "tenor.com",
    "giphy.com",
    "gfycat.com",
    "imgur.com",
    "media.discordapp.net",
    "cdn.discordapp.com",
];

const VIDEO_EXTENSIONS: &[&str] = &[".mp4", ".mov", ".webm", ".avi", ".mkv"];

/// Longest Text Display excerpt shown in a layout trace line.
const TRACE_TEXT_LIMIT: usize = 50;

/// Output of [`reconstruct`].
#[derive(Debug, Clone)]
pub struct Reconstruction {
    pub model: PresentationModel,
    /// Payloads that failed to decode and were treated as absent.
    pub issues: Vec<PayloadError>,
}

/// How an attachment is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Image,
    Video,
    Other,
}

/// Text, images and structure pulled out of a component tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentExtract {
    pub text_parts: Vec<String>,
    pub image_urls: Vec<String>,
    pub summary: ComponentSummary,
}

impl ComponentExtract {
    fn new(extraction: ExtractionPath) -> Self {
        Self {
            text_parts: Vec::new(),
            image_urls: Vec::new(),
            summary: ComponentSummary::new(extraction),
        }
    }

    /// All Text Display contents, one per line.
    pub fn text(&self) -> String {
        self.text_parts.join("\n")
    }
}

/// Rebuilds the presentation model for a bookmark.
pub fn reconstruct(record: &BookmarkRecord) -> Reconstruction {
    let mut issues = Vec::new();
    let is_components_v2 = record.is_components_v2();
    let mut image_urls: Vec<String> = Vec::new();
    let mut body = record.text_content.clone().filter(|t| !t.is_empty());
    let mut components = None;

    if is_components_v2 {
        if let Some(payload) = record.components_payload.as_deref() {
            let (extract, issue) = extract_components(payload);
            issues.extend(issue);
            body = merge_body(record.text_content.as_deref(), &extract.text());
            image_urls.extend(extract.image_urls);
            components = Some(extract.summary);
        }
    }

    let mut attachments = None;
    let mut video_links = Vec::new();
    if let Some(payload) = record.attachments_payload.as_deref() {
        match parse_attachments(payload) {
            Ok(list) => {
                let mut summary = AttachmentSummary::default();
                for attachment in &list {
                    match classify_attachment(attachment) {
                        AttachmentKind::Image => {
                            summary.images += 1;
                            image_urls.push(attachment.url.clone());
                        }
                        AttachmentKind::Video => {
                            summary.videos += 1;
                            video_links.push(attachment.url.clone());
                        }
                        AttachmentKind::Other => summary.others += 1,
                    }
                }
                if !list.is_empty() {
                    attachments = Some(summary);
                }
            }
            Err(e) => issues.push(e),
        }
    }

    let embeds = match record.embed_payload.as_deref() {
        Some(payload) => parse_embeds(payload).unwrap_or_else(|e| {
            issues.push(e);
            Vec::new()
        }),
        None => Vec::new(),
    };

    let hero_image = if image_urls.is_empty() {
        gif_from_embeds(&embeds).map(|url| HeroImage { url, is_gif: true })
    } else {
        select_hero(&mut image_urls)
    };

    let mut secondary_embeds: Vec<SecondaryEmbed> = embeds
        .into_iter()
        .map(|data| SecondaryEmbed::Original { data })
        .collect();
    secondary_embeds.extend(
        image_urls
            .iter()
            .map(|url| SecondaryEmbed::Image { url: url.clone() }),
    );

    let model = PresentationModel {
        bookmark_id: record.id,
        title: format!("Bookmark #{}", record.id),
        body,
        author: AuthorInfo {
            display_name: record.author_display_name.clone(),
            avatar_url: record.author_avatar_url.clone(),
        },
        source_timestamp: record.source_timestamp,
        hero_image,
        image_urls,
        secondary_embeds,
        is_components_v2,
        components,
        attachments,
        video_links,
        link: LinkData {
            guild_id: record.source_guild_id,
            channel_id: record.source_channel_id,
            message_id: record.source_message_id,
        },
    };

    Reconstruction { model, issues }
}

/// Decodes a component tree, falling back to the legacy extractor when the
/// payload does not match the component schema.
pub fn extract_components(payload: &str) -> (ComponentExtract, Option<PayloadError>) {
    match ComponentNode::parse_list(payload) {
        Ok(nodes) => {
            let mut extract = ComponentExtract::new(ExtractionPath::Full);
            for node in &nodes {
                visit_node(node, 0, &mut extract);
            }
            (extract, None)
        }
        Err(e) => (extract_components_legacy(payload), Some(e)),
    }
}

fn visit_node(node: &ComponentNode, depth: usize, out: &mut ComponentExtract) {
    let indent = "  ".repeat(depth);
    out.summary.component_types.push(node.type_name());
    let layout = &mut out.summary.layout;

    match node {
        ComponentNode::Button { label, url } => {
            out.summary.has_buttons = true;
            layout.push(format!(
                "{}Button: {}",
                indent,
                label.as_deref().unwrap_or("No label")
            ));
            if let Some(url) = url {
                layout.push(format!("{}  URL: {}", indent, url));
            }
        }
        ComponentNode::SelectMenu { placeholder } => {
            out.summary.has_select_menus = true;
            layout.push(format!(
                "{}Select Menu: {}",
                indent,
                placeholder.as_deref().unwrap_or("No placeholder")
            ));
        }
        ComponentNode::TextDisplay { content } => {
            out.summary.has_text_displays = true;
            if !content.is_empty() {
                layout.push(format!(
                    "{}Text Display: {}",
                    indent,
                    ellipsize(content, TRACE_TEXT_LIMIT, TRACE_TEXT_LIMIT)
                ));
                out.text_parts.push(content.clone());
            }
        }
        ComponentNode::MediaGallery { urls } => {
            out.summary.has_media_galleries = true;
            layout.push(format!("{}Media Gallery", indent));
            for url in urls {
                layout.push(format!("{}  Media: {}", indent, url));
                out.image_urls.push(url.clone());
            }
        }
        ComponentNode::File { .. } => {
            out.summary.has_files = true;
            layout.push(format!("{}File", indent));
        }
        ComponentNode::Container { kind, children } => {
            layout.push(format!("{}{}", indent, kind.name()));
            for child in children {
                visit_node(child, depth + 1, out);
            }
        }
        ComponentNode::Inert(kind) => {
            layout.push(format!("{}{}", indent, kind.name()));
        }
        ComponentNode::Unknown(tag) => {
            layout.push(format!("{}Unknown({})", indent, tag));
        }
    }
}

/// Best-effort extractor for payloads the full decoder rejects.
///
/// Understands only root (17) and legacy section (9) containers, Text Display
/// (10) content and File (12) media items. Never fails; structural flags stay unset.
pub fn extract_components_legacy(payload: &str) -> ComponentExtract {
    let mut extract = ComponentExtract::new(ExtractionPath::Legacy);
    if let Ok(Value::Array(nodes)) = serde_json::from_str::<Value>(payload) {
        for node in &nodes {
            visit_legacy(node, &mut extract);
        }
    }
    extract
}

fn visit_legacy(node: &Value, out: &mut ComponentExtract) {
    match node.get("type").and_then(Value::as_i64) {
        Some(17) | Some(9) => {
            let children = node.get("components").and_then(Value::as_array);
            for child in children.into_iter().flatten() {
                visit_legacy(child, out);
            }
        }
        Some(10) => {
            if let Some(text) = node.get("content").and_then(Value::as_str) {
                if !text.is_empty() {
                    out.text_parts.push(text.to_string());
                }
            }
        }
        Some(12) => {
            let items = node.get("items").and_then(Value::as_array);
            for item in items.into_iter().flatten() {
                if let Some(url) = item.pointer("/media/url").and_then(Value::as_str) {
                    if !url.is_empty() {
                        out.image_urls.push(url.to_string());
                    }
                }
            }
        }
        _ => {}
    }
}

/// Joins message text and component text with a blank line when both are present.
pub fn merge_body(text: Option<&str>, component_text: &str) -> Option<String> {
    let text = text.filter(|t| !t.is_empty());
    match (text, component_text.is_empty()) {
        (Some(t), false) => Some(format!("{}\n\n{}", t, component_text)),
        (Some(t), true) => Some(t.to_string()),
        (None, false) => Some(component_text.to_string()),
        (None, true) => None,
    }
}

pub fn parse_attachments(payload: &str) -> Result<Vec<AttachmentInfo>, PayloadError> {
    serde_json::from_str(payload).map_err(|e| PayloadError::Attachments(e.to_string()))
}

pub fn parse_embeds(payload: &str) -> Result<Vec<Value>, PayloadError> {
    serde_json::from_str(payload).map_err(|e| PayloadError::Embeds(e.to_string()))
}

pub fn classify_attachment(attachment: &AttachmentInfo) -> AttachmentKind {
    if attachment.is_image {
        return AttachmentKind::Image;
    }
    let filename = attachment.filename.to_lowercase();
    if VIDEO_EXTENSIONS.iter().any(|ext| filename.ends_with(ext)) {
        AttachmentKind::Video
    } else {
        AttachmentKind::Other
    }
}

/// Whether a URL looks like an animated image.
pub fn is_gif_url(url: &str) -> bool {
    gif_rank(url).is_some()
}

/// 0 for a `.gif` file, 1 for a known GIF host, `None` otherwise.
fn gif_rank(url: &str) -> Option<u8> {
    if url.is_empty() {
        return None;
    }
    let lower = url.to_lowercase();
    // The whole URL must end in `.gif`; a query string disqualifies it.
    if lower.ends_with(".gif") {
        return Some(0);
    }

    let parsed = Url::parse(&lower).ok()?;
    let host = parsed.host_str()?;
    if GIF_HOSTS.iter().any(|domain| host.contains(domain)) {
        Some(1)
    } else {
        None
    }
}

/// Removes and returns the hero image: the best GIF match, else the first image.
///
/// A GIF hero takes every copy of its URL out of the list; a fallback hero
/// removes only the first entry.
pub fn select_hero(image_urls: &mut Vec<String>) -> Option<HeroImage> {
    let best_gif = image_urls
        .iter()
        .enumerate()
        .filter_map(|(idx, url)| gif_rank(url).map(|rank| (rank, idx)))
        .min();

    match best_gif {
        Some((_, idx)) => {
            let url = image_urls[idx].clone();
            image_urls.retain(|u| u != &url);
            Some(HeroImage { url, is_gif: true })
        }
        None if !image_urls.is_empty() => Some(HeroImage {
            url: image_urls.remove(0),
            is_gif: false,
        }),
        None => None,
    }
}

/// First GIF among the embeds' `image.url` / `thumbnail.url` fields.
pub fn gif_from_embeds(embeds: &[Value]) -> Option<String> {
    embeds
        .iter()
        .flat_map(|embed| {
            ["/image/url", "/thumbnail/url"]
                .into_iter()
                .filter_map(move |ptr| embed.pointer(ptr).and_then(Value::as_str))
        })
        .find(|url| is_gif_url(url))
        .map(str::to_string)
}

/// Cuts `text` to `keep_chars` characters plus "..." when it is longer than `max_chars`.
pub fn ellipsize(text: &str, max_chars: usize, keep_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let kept: String = text.chars().take(keep_chars).collect();
        format!("{}...", kept)
    } else {
        text.to_string()
    }
}
