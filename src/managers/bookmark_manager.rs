//! Bookmark store for msgmark.
//!
//! Implements `BookmarkManagerTrait`: create, paginated listing, owner-scoped
//! lookup and delete, backed by SQLite via `rusqlite`. Every operation opens
//! its own connection from the shared [`Database`].

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, OptionalExtension};
use tracing::{debug, instrument};

use crate::database::Database;
use crate::types::bookmark::{AttachmentInfo, BookmarkRecord, CapturedPayloads};
use crate::types::errors::BookmarkError;
use crate::types::message::SourceMessage;

/// Page size used when callers do not configure one.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

const SELECT_COLUMNS: &str = "id, owner_id, source_message_id, source_channel_id, source_guild_id, \
     text_content, embed_payload, author_display_name, author_avatar_url, source_timestamp, \
     created_at, attachments_payload, components_payload, message_flags";

/// Trait defining bookmark store operations.
pub trait BookmarkManagerTrait {
    /// Inserts a bookmark for `owner_id` and returns its new ID.
    fn create(
        &self,
        owner_id: i64,
        message: &SourceMessage,
        payloads: &CapturedPayloads,
    ) -> Result<i64, BookmarkError>;
    /// Paginated listing, newest first. Returns (records, total_count).
    fn read_page(
        &self,
        owner_id: i64,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<BookmarkRecord>, i64), BookmarkError>;
    /// Returns the bookmark only if it exists and belongs to `owner_id`.
    fn read_by_id(&self, id: i64, owner_id: i64) -> Result<Option<BookmarkRecord>, BookmarkError>;
    /// Hard-deletes a bookmark owned by `owner_id`.
    fn delete(&self, id: i64, owner_id: i64) -> Result<(), BookmarkError>;
}

/// Bookmark store backed by the shared database handle.
pub struct BookmarkManager {
    db: Arc<Database>,
}

impl BookmarkManager {
    /// Creates a new `BookmarkManager` using the provided database.
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Serializes attachment snapshots. An empty list is stored as NULL.
    pub fn attachments_payload(message: &SourceMessage) -> Result<Option<String>, BookmarkError> {
        if message.attachments.is_empty() {
            return Ok(None);
        }
        let infos: Vec<AttachmentInfo> = message
            .attachments
            .iter()
            .map(AttachmentInfo::from_source)
            .collect();
        serde_json::to_string(&infos)
            .map(Some)
            .map_err(|e| BookmarkError::DatabaseError(format!("attachment encoding failed: {}", e)))
    }

    /// Offset of the first row on `page`, with `page` clamped to at least 1.
    ///
    /// `None` when the offset does not fit in an `i64`; such a page is past the end.
    pub fn page_offset(page: i64, page_size: i64) -> Option<i64> {
        (page.max(1) - 1).checked_mul(page_size)
    }

    fn format_timestamp(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    fn parse_timestamp(idx: usize, raw: String) -> rusqlite::Result<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
            })
    }

    /// Reads a single `BookmarkRecord` row into a struct.
    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<BookmarkRecord> {
        Ok(BookmarkRecord {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            source_message_id: row.get(2)?,
            source_channel_id: row.get(3)?,
            source_guild_id: row.get(4)?,
            text_content: row.get(5)?,
            embed_payload: row.get(6)?,
            author_display_name: row.get(7)?,
            author_avatar_url: row.get(8)?,
            source_timestamp: Self::parse_timestamp(9, row.get(9)?)?,
            created_at: Self::parse_timestamp(10, row.get(10)?)?,
            attachments_payload: row.get(11)?,
            components_payload: row.get(12)?,
            message_flags: row.get(13)?,
        })
    }
}

impl BookmarkManagerTrait for BookmarkManager {
    #[instrument(skip(self, message, payloads), level = "debug")]
    fn create(
        &self,
        owner_id: i64,
        message: &SourceMessage,
        payloads: &CapturedPayloads,
    ) -> Result<i64, BookmarkError> {
        let attachments = Self::attachments_payload(message)?;
        let created_at = Self::format_timestamp(&Utc::now());
        let source_timestamp = Self::format_timestamp(&message.timestamp);

        let conn = self.db.connect()?;
        conn.execute(
            "INSERT INTO bookmarks (owner_id, source_message_id, source_channel_id, source_guild_id, \
             text_content, embed_payload, author_display_name, author_avatar_url, source_timestamp, \
             created_at, attachments_payload, components_payload, message_flags) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                owner_id,
                message.id,
                message.channel_id,
                payloads.guild_id,
                message.content,
                payloads.embed_payload,
                message.author.display_name,
                message.author.avatar_url,
                source_timestamp,
                created_at,
                attachments,
                payloads.components_payload,
                payloads.message_flags,
            ],
        )?;

        let id = conn.last_insert_rowid();
        debug!(id, "bookmark created");
        Ok(id)
    }

    #[instrument(skip(self), level = "debug")]
    fn read_page(
        &self,
        owner_id: i64,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<BookmarkRecord>, i64), BookmarkError> {
        let page_size = if page_size < 1 { DEFAULT_PAGE_SIZE } else { page_size };

        let conn = self.db.connect()?;
        let total: i64 = conn.query_row(
            "SELECT COUNT(*) FROM bookmarks WHERE owner_id = ?1",
            params![owner_id],
            |row| row.get(0),
        )?;

        let offset = match Self::page_offset(page, page_size) {
            Some(offset) => offset,
            None => {
                debug!(page, total, "page offset out of range");
                return Ok((Vec::new(), total));
            }
        };

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM bookmarks WHERE owner_id = ?1 \
             ORDER BY created_at DESC, id DESC LIMIT ?2 OFFSET ?3",
            SELECT_COLUMNS
        ))?;
        let rows = stmt.query_map(params![owner_id, page_size, offset], Self::row_to_record)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        debug!(returned = results.len(), total, "bookmark page read");
        Ok((results, total))
    }

    #[instrument(skip(self), level = "debug")]
    fn read_by_id(&self, id: i64, owner_id: i64) -> Result<Option<BookmarkRecord>, BookmarkError> {
        let conn = self.db.connect()?;
        let record = conn
            .query_row(
                &format!(
                    "SELECT {} FROM bookmarks WHERE id = ?1 AND owner_id = ?2",
                    SELECT_COLUMNS
                ),
                params![id, owner_id],
                Self::row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    #[instrument(skip(self), level = "debug")]
    fn delete(&self, id: i64, owner_id: i64) -> Result<(), BookmarkError> {
        let conn = self.db.connect()?;
        let stored_owner: Option<i64> = conn
            .query_row(
                "SELECT owner_id FROM bookmarks WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;

        match stored_owner {
            None => return Err(BookmarkError::NotFound(id)),
            Some(owner) if owner != owner_id => return Err(BookmarkError::Unauthorized(id)),
            Some(_) => {}
        }

        let affected = conn.execute(
            "DELETE FROM bookmarks WHERE id = ?1 AND owner_id = ?2",
            params![id, owner_id],
        )?;

        // Lost a race with another delete of the same row
        if affected == 0 {
            return Err(BookmarkError::NotFound(id));
        }
        debug!(id, "bookmark deleted");
        Ok(())
    }
}
