//! List-view summaries for bookmark pages.

use crate::services::content_reconstructor::{ellipsize, parse_attachments};
use crate::types::bookmark::{BookmarkListEntry, BookmarkRecord};
use crate::types::errors::PayloadError;

const PREVIEW_LIMIT: usize = 100;
const PREVIEW_KEEP: usize = 97;

/// Number of pages needed for `total` rows.
pub fn total_pages(total: i64, page_size: i64) -> i64 {
    if total <= 0 || page_size <= 0 {
        return 0;
    }
    (total - 1) / page_size + 1
}

/// Builds the list row for a record. Attachment counts are zero if the payload is malformed.
pub fn list_entry(record: &BookmarkRecord) -> (BookmarkListEntry, Option<PayloadError>) {
    let mut issue = None;
    let (image_count, file_count) = match record.attachments_payload.as_deref() {
        Some(payload) => match parse_attachments(payload) {
            Ok(list) => {
                let images = list.iter().filter(|a| a.is_image).count();
                (images, list.len() - images)
            }
            Err(e) => {
                issue = Some(e);
                (0, 0)
            }
        },
        None => (0, 0),
    };

    let preview = record
        .text_content
        .as_deref()
        .filter(|t| !t.is_empty())
        .map(|t| ellipsize(t, PREVIEW_LIMIT, PREVIEW_KEEP));

    let entry = BookmarkListEntry {
        id: record.id,
        author_display_name: record.author_display_name.clone(),
        source_timestamp: record.source_timestamp,
        preview,
        image_count,
        file_count,
    };
    (entry, issue)
}
