//! Property-based tests for bookmark save/view/delete.
//!
//! For arbitrary message text, authors and attachment sets, saving a message
//! and viewing it back yields the same text, author and attachment count, and
//! nobody but the owner can see it.

use chrono::{TimeZone, Utc};
use msgmark::app::App;
use msgmark::types::errors::BookmarkError;
use msgmark::types::message::{SourceAttachment, SourceAuthor, SourceMessage};
use proptest::prelude::*;

fn arb_attachment() -> impl Strategy<Value = SourceAttachment> {
    (
        1i64..1_000_000,
        "[a-z]{1,12}",
        prop_oneof![Just("png"), Just("gif"), Just("mp4"), Just("txt"), Just("zip")],
        any::<bool>(),
    )
        .prop_map(|(id, stem, ext, typed)| {
            let content_type = match (typed, ext) {
                (false, _) => None,
                (true, "png") => Some("image/png".to_string()),
                (true, "gif") => Some("image/gif".to_string()),
                (true, "mp4") => Some("video/mp4".to_string()),
                (true, _) => Some("application/octet-stream".to_string()),
            };
            SourceAttachment {
                id,
                url: format!("https://files.example/{}.{}", stem, ext),
                filename: format!("{}.{}", stem, ext),
                content_type,
                width: None,
                height: None,
                size: 1,
            }
        })
}

fn arb_message() -> impl Strategy<Value = SourceMessage> {
    (
        any::<i64>(),
        "\\PC{1,200}",
        "[A-Za-z][A-Za-z0-9_ ]{0,20}",
        proptest::option::of(1i64..i64::MAX),
        proptest::collection::vec(arb_attachment(), 0..6),
    )
        .prop_map(|(id, content, name, guild_id, attachments)| SourceMessage {
            id,
            channel_id: 42,
            guild_id,
            author: SourceAuthor {
                display_name: name,
                avatar_url: None,
            },
            content: Some(content),
            timestamp: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
            attachments,
            embeds: Vec::new(),
            components: Vec::new(),
            flags: 0,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    #[test]
    fn save_then_view_preserves_message(msg in arb_message(), owner in 1i64..1000) {
        let app = App::in_memory().expect("in-memory app");
        let receipt = app.save(owner, &msg).expect("save should succeed");
        prop_assert_eq!(receipt.attachment_count, msg.attachments.len());

        let model = app.view_detail(owner, receipt.bookmark_id).expect("owner can view");
        prop_assert_eq!(model.body.as_deref(), msg.content.as_deref());
        prop_assert_eq!(&model.author.display_name, &msg.author.display_name);

        let counted = model.attachments.map(|a| a.total()).unwrap_or(0);
        prop_assert_eq!(counted, msg.attachments.len());

        // Every image shows up exactly once: as hero or in the remaining list.
        let images = msg
            .attachments
            .iter()
            .filter(|a| a.content_type.as_deref().map(|c| c.starts_with("image/")).unwrap_or(false))
            .count();
        let shown = model.image_urls.len() + usize::from(model.hero_image.is_some());
        prop_assert_eq!(shown, images);

        prop_assert_eq!(model.link.guild_id, msg.guild_id.unwrap_or(0));
    }

    #[test]
    fn other_owners_never_see_bookmark(msg in arb_message(), owner in 1i64..1000, offset in 1i64..1000) {
        let app = App::in_memory().expect("in-memory app");
        let id = app.save(owner, &msg).expect("save").bookmark_id;
        let stranger = owner + offset;

        prop_assert_eq!(app.view_detail(stranger, id), Err(BookmarkError::NotFound(id)));
        prop_assert_eq!(app.list_page(stranger, 1).expect("list").total_count, 0);
        prop_assert_eq!(app.delete(stranger, id), Err(BookmarkError::Unauthorized(id)));
        prop_assert!(app.view_detail(owner, id).is_ok());
    }
}
