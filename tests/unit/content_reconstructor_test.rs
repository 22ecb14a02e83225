//! Unit tests for reconstructing presentation models from stored bookmark rows.

use chrono::{TimeZone, Utc};
use rstest::rstest;
use serde_json::json;

use msgmark::services::content_reconstructor::{extract_components, reconstruct, select_hero};
use msgmark::types::bookmark::{BookmarkRecord, COMPONENTS_V2_FLAG};
use msgmark::types::errors::PayloadError;
use msgmark::types::presentation::{ExtractionPath, SecondaryEmbed};

fn record() -> BookmarkRecord {
    let ts = Utc.with_ymd_and_hms(2024, 3, 2, 8, 0, 0).unwrap();
    BookmarkRecord {
        id: 5,
        owner_id: 1,
        source_message_id: 300,
        source_channel_id: 200,
        source_guild_id: 100,
        text_content: Some("plain text".to_string()),
        embed_payload: None,
        author_display_name: "Zosia".to_string(),
        author_avatar_url: None,
        source_timestamp: ts,
        created_at: ts,
        attachments_payload: None,
        components_payload: None,
        message_flags: 0,
    }
}

fn attachment(id: i64, filename: &str, content_type: Option<&str>) -> serde_json::Value {
    json!({
        "id": id,
        "url": format!("https://cdn.example/{}", filename),
        "filename": filename,
        "content_type": content_type,
        "size": 100,
        "is_image": content_type.map(|c| c.starts_with("image/")).unwrap_or(false),
    })
}

#[test]
fn test_plain_message() {
    let result = reconstruct(&record());
    let model = result.model;

    assert!(result.issues.is_empty());
    assert_eq!(model.bookmark_id, 5);
    assert_eq!(model.title, "Bookmark #5");
    assert_eq!(model.body.as_deref(), Some("plain text"));
    assert_eq!(model.author.display_name, "Zosia");
    assert!(model.hero_image.is_none());
    assert!(model.secondary_embeds.is_empty());
    assert!(!model.is_components_v2);
    assert!(model.components.is_none());
    assert!(model.attachments.is_none());
    assert_eq!(model.link.jump_url(), "https://discord.com/channels/100/200/300");
}

#[test]
fn test_direct_message_link() {
    let mut rec = record();
    rec.source_guild_id = 0;
    let model = reconstruct(&rec).model;
    assert_eq!(model.link.jump_url(), "https://discord.com/channels/@me/200/300");
}

#[test]
fn test_container_with_text_and_gallery() {
    let payload = json!([{
        "type": 14,
        "components": [
            {"type": 10, "content": "hi"},
            {"type": 11, "items": [{"media": {"url": "https://x/y.png"}}]}
        ]
    }])
    .to_string();

    let (extract, issue) = extract_components(&payload);
    assert!(issue.is_none());
    assert_eq!(extract.text(), "hi");
    assert_eq!(extract.image_urls, vec!["https://x/y.png".to_string()]);
    assert!(extract.summary.has_text_displays);
    assert!(extract.summary.has_media_galleries);
    assert!(!extract.summary.has_buttons);
    assert_eq!(extract.summary.extraction, ExtractionPath::Full);
}

#[test]
fn test_layout_trace_is_indented_depth_first() {
    let payload = json!([{
        "type": 17,
        "components": [
            {"type": 10, "content": "title"},
            {"type": 1, "components": [
                {"type": 2, "label": "Open", "url": "https://example.com"},
                {"type": 3}
            ]},
            {"type": 99}
        ]
    }])
    .to_string();

    let (extract, _) = extract_components(&payload);
    assert_eq!(
        extract.summary.layout,
        vec![
            "ComponentsV2Root",
            "  Text Display: title",
            "  ActionRow",
            "    Button: Open",
            "      URL: https://example.com",
            "    Select Menu: No placeholder",
            "  Unknown(99)",
        ]
    );
    assert!(extract.summary.has_buttons);
    assert!(extract.summary.has_select_menus);
    assert_eq!(extract.summary.component_types.len(), 6);
}

#[test]
fn test_components_v2_body_is_merged() {
    let mut rec = record();
    rec.message_flags = COMPONENTS_V2_FLAG;
    rec.components_payload = Some(
        json!([{"type": 17, "components": [
            {"type": 10, "content": "first"},
            {"type": 10, "content": "second"}
        ]}])
        .to_string(),
    );

    let model = reconstruct(&rec).model;
    assert!(model.is_components_v2);
    assert_eq!(model.body.as_deref(), Some("plain text\n\nfirst\nsecond"));
    assert!(model.components.unwrap().has_text_displays);
}

#[test]
fn test_components_ignored_without_flag() {
    let mut rec = record();
    rec.components_payload = Some(json!([{"type": 10, "content": "hidden"}]).to_string());

    let model = reconstruct(&rec).model;
    assert_eq!(model.body.as_deref(), Some("plain text"));
    assert!(model.components.is_none());
}

#[test]
fn test_malformed_components_fall_back_to_text() {
    let mut rec = record();
    rec.message_flags = COMPONENTS_V2_FLAG;
    rec.components_payload = Some("{not json".to_string());

    let result = reconstruct(&rec);
    assert_eq!(result.model.body.as_deref(), Some("plain text"));
    assert_eq!(result.issues.len(), 1);
    assert!(matches!(result.issues[0], PayloadError::Components(_)));
    assert_eq!(
        result.model.components.as_ref().map(|c| c.extraction),
        Some(ExtractionPath::Legacy)
    );
}

#[test]
fn test_schema_mismatch_uses_legacy_extractor() {
    let mut rec = record();
    rec.text_content = None;
    rec.message_flags = COMPONENTS_V2_FLAG;
    // `type` as a string is rejected by the full decoder
    rec.components_payload = Some(
        r#"[{"type":17,"components":[{"type":10,"content":"kept"},{"type":"x"}]}]"#.to_string(),
    );

    let result = reconstruct(&rec);
    assert_eq!(result.issues.len(), 1);
    assert_eq!(result.model.body.as_deref(), Some("kept"));
}

#[test]
fn test_gif_priority_over_position() {
    let mut images = vec![
        "https://cdn.discordapp.com/a.png".to_string(),
        "https://tenor.com/b.gif".to_string(),
    ];
    let hero = select_hero(&mut images).unwrap();
    assert_eq!(hero.url, "https://tenor.com/b.gif");
    assert!(hero.is_gif);
    assert_eq!(images, vec!["https://cdn.discordapp.com/a.png".to_string()]);
}

#[test]
fn test_gif_hero_removes_every_copy() {
    let mut images = vec![
        "https://x/a.gif".to_string(),
        "https://x/b.png".to_string(),
        "https://x/a.gif".to_string(),
    ];
    let hero = select_hero(&mut images).unwrap();
    assert_eq!(hero.url, "https://x/a.gif");
    assert!(hero.is_gif);
    assert_eq!(images, vec!["https://x/b.png".to_string()]);
}

#[test]
fn test_repeated_gif_is_not_shown_as_secondary_card() {
    let mut rec = record();
    rec.attachments_payload = Some(
        json!([
            attachment(1, "party.gif", Some("image/gif")),
            attachment(2, "b.png", Some("image/png")),
            attachment(3, "party.gif", Some("image/gif")),
        ])
        .to_string(),
    );

    let model = reconstruct(&rec).model;
    assert_eq!(model.hero_image.unwrap().url, "https://cdn.example/party.gif");
    assert_eq!(
        model.secondary_embeds,
        vec![SecondaryEmbed::Image { url: "https://cdn.example/b.png".to_string() }]
    );
}

#[test]
fn test_gif_with_query_string_is_not_a_gif_file() {
    let mut images = vec![
        "https://example.com/a.gif?x=1".to_string(),
        "https://example.com/b.png".to_string(),
    ];
    let hero = select_hero(&mut images).unwrap();
    assert_eq!(hero.url, "https://example.com/a.gif?x=1");
    assert!(!hero.is_gif);
}

#[test]
fn test_attachments_are_classified() {
    let mut rec = record();
    rec.attachments_payload = Some(
        json!([
            attachment(1, "a.png", Some("image/png")),
            attachment(2, "clip.mp4", Some("video/mp4")),
            attachment(3, "doc.pdf", Some("application/pdf")),
            attachment(4, "b.jpg", Some("image/jpeg")),
        ])
        .to_string(),
    );

    let model = reconstruct(&rec).model;
    let summary = model.attachments.unwrap();
    assert_eq!((summary.images, summary.videos, summary.others), (2, 1, 1));
    assert_eq!(summary.total(), 4);
    assert_eq!(model.video_links, vec!["https://cdn.example/clip.mp4".to_string()]);

    let hero = model.hero_image.unwrap();
    assert_eq!(hero.url, "https://cdn.example/a.png");
    assert!(!hero.is_gif);
    assert_eq!(model.image_urls, vec!["https://cdn.example/b.jpg".to_string()]);
    assert_eq!(
        model.secondary_embeds,
        vec![SecondaryEmbed::Image { url: "https://cdn.example/b.jpg".to_string() }]
    );
}

#[test]
fn test_component_images_come_before_attachments() {
    let mut rec = record();
    rec.message_flags = COMPONENTS_V2_FLAG;
    rec.components_payload = Some(
        json!([{"type": 11, "items": [{"media": {"url": "https://x/gallery.png"}}]}]).to_string(),
    );
    rec.attachments_payload = Some(json!([attachment(1, "a.png", Some("image/png"))]).to_string());

    let model = reconstruct(&rec).model;
    assert_eq!(model.hero_image.unwrap().url, "https://x/gallery.png");
    assert_eq!(model.image_urls, vec!["https://cdn.example/a.png".to_string()]);
}

#[test]
fn test_embed_gif_used_when_no_images() {
    let mut rec = record();
    rec.embed_payload = Some(
        json!([
            {"title": "no media"},
            {"thumbnail": {"url": "https://media.giphy.com/media/abc/giphy.gif"}}
        ])
        .to_string(),
    );

    let model = reconstruct(&rec).model;
    let hero = model.hero_image.unwrap();
    assert_eq!(hero.url, "https://media.giphy.com/media/abc/giphy.gif");
    assert!(hero.is_gif);
    assert_eq!(model.secondary_embeds.len(), 2);
    assert!(matches!(model.secondary_embeds[0], SecondaryEmbed::Original { .. }));
}

#[test]
fn test_original_embeds_precede_image_cards() {
    let mut rec = record();
    rec.embed_payload = Some(json!([{"title": "link preview"}]).to_string());
    rec.attachments_payload = Some(
        json!([
            attachment(1, "a.png", Some("image/png")),
            attachment(2, "b.png", Some("image/png")),
        ])
        .to_string(),
    );

    let model = reconstruct(&rec).model;
    assert_eq!(
        model.secondary_embeds,
        vec![
            SecondaryEmbed::Original { data: json!({"title": "link preview"}) },
            SecondaryEmbed::Image { url: "https://cdn.example/b.png".to_string() },
        ]
    );
}

#[rstest]
#[case::attachments(None, Some("[{]"), "attachments_payload")]
#[case::embeds(Some("nope"), None, "embed_payload")]
fn test_malformed_payloads_are_reported(
    #[case] embeds: Option<&str>,
    #[case] attachments: Option<&str>,
    #[case] field: &str,
) {
    let mut rec = record();
    rec.embed_payload = embeds.map(str::to_string);
    rec.attachments_payload = attachments.map(str::to_string);

    let result = reconstruct(&rec);
    assert_eq!(result.issues.len(), 1);
    assert_eq!(result.issues[0].field(), field);
    assert_eq!(result.model.body.as_deref(), Some("plain text"));
    assert!(result.model.hero_image.is_none());
}
