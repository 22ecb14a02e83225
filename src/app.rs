//! App Core for msgmark.
//!
//! Central struct holding the database, settings and localization, and the
//! command-layer operations built on top of the bookmark store.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::database::Database;
use crate::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use crate::services::bookmark_listing;
use crate::services::content_reconstructor;
use crate::services::localization_engine::{LocalizationEngine, LocalizationEngineTrait};
use crate::services::message_capture;
use crate::types::bookmark::{BookmarkListEntry, BookmarkPage, SaveReceipt};
use crate::types::errors::{BookmarkError, PayloadError, StorageError};
use crate::types::message::SourceMessage;
use crate::types::presentation::PresentationModel;
use crate::types::settings::BotSettings;

/// Central application struct.
///
/// `BookmarkManager` is created per call from the shared `Database` handle,
/// so `App` can be shared across threads behind an `Arc`.
pub struct App {
    pub db: Arc<Database>,
    pub settings: BotSettings,
    pub localization_engine: LocalizationEngine,
}

impl App {
    /// Opens storage and loads translations.
    ///
    /// A storage failure is fatal. A broken locales directory only falls back
    /// to the built-in translations.
    pub fn new(settings: BotSettings) -> Result<Self, StorageError> {
        let db = Arc::new(Database::from_setting(&settings.storage.database_path)?);
        let localization_engine = Self::load_locales(&settings);

        info!(
            database = %settings.storage.database_path,
            locale = %localization_engine.get_locale(),
            "msgmark initialised"
        );

        Ok(Self {
            db,
            settings,
            localization_engine,
        })
    }

    /// In-memory app with default settings, for tests and one-off tools.
    pub fn in_memory() -> Result<Self, StorageError> {
        let mut settings = BotSettings::default();
        settings.storage.database_path = crate::database::IN_MEMORY_PATH.to_string();
        Self::new(settings)
    }

    fn load_locales(settings: &BotSettings) -> LocalizationEngine {
        let mut engine = match &settings.general.locales_dir {
            Some(dir) => LocalizationEngine::new(dir),
            None => LocalizationEngine::builtin(),
        };
        if let Err(e) = engine.initialize() {
            warn!(error = %e, "falling back to built-in translations");
            engine = LocalizationEngine::builtin();
            if let Err(e) = engine.initialize() {
                error!(error = %e, "built-in translations failed to load");
            }
        }
        if let Err(e) = engine.set_locale(&settings.general.locale) {
            warn!(error = %e, "keeping default locale");
        }
        engine
    }

    pub fn bookmarks(&self) -> BookmarkManager {
        BookmarkManager::new(self.db.clone())
    }

    fn page_size(&self) -> i64 {
        self.settings.listing.page_size.max(1)
    }

    /// Saves a message as a bookmark for `owner_id`.
    pub fn save(&self, owner_id: i64, message: &SourceMessage) -> Result<SaveReceipt, BookmarkError> {
        let payloads = message_capture::capture(message).map_err(|e| {
            BookmarkError::DatabaseError(format!("Failed to encode message payloads: {}", e))
        })?;
        let bookmark_id = self.bookmarks().create(owner_id, message, &payloads)?;

        info!(bookmark_id, owner_id, "bookmark saved");
        Ok(SaveReceipt {
            bookmark_id,
            is_components_v2: message_capture::is_components_v2(message),
            attachment_count: message.attachments.len(),
        })
    }

    /// Returns one page of the owner's bookmarks, newest first.
    ///
    /// Pages below 1 are treated as page 1. A page past the end is empty but
    /// still reports the total count.
    pub fn list_page(&self, owner_id: i64, page: i64) -> Result<BookmarkPage, BookmarkError> {
        let page = page.max(1);
        let page_size = self.page_size();
        let (records, total_count) = self.bookmarks().read_page(owner_id, page, page_size)?;

        Ok(BookmarkPage {
            page,
            total_pages: bookmark_listing::total_pages(total_count, page_size),
            total_count,
            page_size,
            records,
        })
    }

    /// List-view rows for a page. Malformed attachment payloads are logged and counted as zero.
    pub fn list_entries(&self, page: &BookmarkPage) -> Vec<BookmarkListEntry> {
        page.records
            .iter()
            .map(|record| {
                let (entry, issue) = bookmark_listing::list_entry(record);
                if let Some(issue) = issue {
                    log_payload_issue(record.id, &issue);
                }
                entry
            })
            .collect()
    }

    /// Rebuilds the detail view of a bookmark.
    ///
    /// Absent and foreign bookmarks both yield `NotFound`.
    pub fn view_detail(&self, owner_id: i64, bookmark_id: i64) -> Result<PresentationModel, BookmarkError> {
        let record = self
            .bookmarks()
            .read_by_id(bookmark_id, owner_id)?
            .ok_or(BookmarkError::NotFound(bookmark_id))?;

        let reconstruction = content_reconstructor::reconstruct(&record);
        for issue in &reconstruction.issues {
            log_payload_issue(record.id, issue);
        }
        Ok(reconstruction.model)
    }

    pub fn delete(&self, owner_id: i64, bookmark_id: i64) -> Result<(), BookmarkError> {
        self.bookmarks().delete(bookmark_id, owner_id)?;
        info!(bookmark_id, owner_id, "bookmark deleted");
        Ok(())
    }

    /// Translates `key` in `locale`, or the default locale.
    pub fn text(&self, locale: Option<&str>, key: &str, params: &[(&str, String)]) -> String {
        let params: HashMap<String, String> = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        self.localization_engine.t_in(locale, key, Some(&params))
    }

    /// Plural form of `key` for `count` in `locale`.
    pub fn plural_text(&self, locale: Option<&str>, key: &str, count: u64) -> String {
        self.localization_engine.plural_in(locale, key, count, None)
    }

    /// Short user-facing message for a failed operation.
    ///
    /// Storage details are logged here and never shown.
    pub fn status_message(&self, err: &BookmarkError, locale: Option<&str>) -> String {
        match err {
            BookmarkError::NotFound(_) => self.text(locale, "errors.not_found", &[]),
            BookmarkError::Unauthorized(_) => self.text(locale, "errors.not_authorized", &[]),
            BookmarkError::DatabaseError(detail) => {
                error!(error = %detail, "bookmark storage failure");
                self.text(locale, "errors.storage", &[])
            }
        }
    }
}

fn log_payload_issue(bookmark_id: i64, issue: &PayloadError) {
    warn!(bookmark_id, field = issue.field(), error = %issue, "stored payload could not be decoded");
}
