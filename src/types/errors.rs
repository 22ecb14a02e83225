use std::fmt;

// === BookmarkError ===

/// Errors related to bookmark store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookmarkError {
    /// No bookmark with the given ID is visible to the caller.
    ///
    /// Read paths use this both for missing rows and for rows owned by
    /// someone else, so the two cases cannot be told apart.
    NotFound(i64),
    /// The bookmark exists but belongs to another user (delete only).
    Unauthorized(i64),
    /// Database operation failed.
    DatabaseError(String),
}

impl fmt::Display for BookmarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookmarkError::NotFound(id) => write!(f, "Bookmark not found: {}", id),
            BookmarkError::Unauthorized(id) => {
                write!(f, "Not authorized to modify bookmark: {}", id)
            }
            BookmarkError::DatabaseError(msg) => {
                write!(f, "Bookmark database error: {}", msg)
            }
        }
    }
}

impl std::error::Error for BookmarkError {}

impl From<rusqlite::Error> for BookmarkError {
    fn from(e: rusqlite::Error) -> Self {
        BookmarkError::DatabaseError(e.to_string())
    }
}

impl From<StorageError> for BookmarkError {
    fn from(e: StorageError) -> Self {
        BookmarkError::DatabaseError(e.to_string())
    }
}

// === StorageError ===

/// Errors raised while opening the database or bringing its schema up to date.
///
/// These are fatal at startup: the bot must not serve requests without storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The database could not be opened or connected to.
    Unavailable(String),
    /// A schema migration step failed.
    Migration(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Unavailable(msg) => write!(f, "Storage unavailable: {}", msg),
            StorageError::Migration(msg) => write!(f, "Schema migration failed: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

// === PayloadError ===

/// A serialized payload column could not be decoded.
///
/// Never fatal: the affected field is treated as absent and the condition is logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    /// `attachments_payload` is not a valid attachment list.
    Attachments(String),
    /// `embed_payload` is not a valid embed list.
    Embeds(String),
    /// `components_payload` is not a valid component tree.
    Components(String),
}

impl PayloadError {
    /// Name of the column the error originated from.
    pub fn field(&self) -> &'static str {
        match self {
            PayloadError::Attachments(_) => "attachments_payload",
            PayloadError::Embeds(_) => "embed_payload",
            PayloadError::Components(_) => "components_payload",
        }
    }
}

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadError::Attachments(msg) => write!(f, "Malformed attachments payload: {}", msg),
            PayloadError::Embeds(msg) => write!(f, "Malformed embed payload: {}", msg),
            PayloadError::Components(msg) => write!(f, "Malformed components payload: {}", msg),
        }
    }
}

impl std::error::Error for PayloadError {}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    IoError(String),
    /// Failed to serialize or deserialize settings.
    SerializationError(String),
    /// The provided settings key is invalid.
    InvalidKey(String),
    /// The provided settings value is invalid.
    InvalidValue(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::IoError(msg) => write!(f, "Settings I/O error: {}", msg),
            SettingsError::SerializationError(msg) => {
                write!(f, "Settings serialization error: {}", msg)
            }
            SettingsError::InvalidKey(key) => write!(f, "Invalid settings key: {}", key),
            SettingsError::InvalidValue(msg) => {
                write!(f, "Invalid settings value: {}", msg)
            }
        }
    }
}

impl std::error::Error for SettingsError {}

// === LocaleError ===

/// Errors related to localization engine operations.
#[derive(Debug)]
pub enum LocaleError {
    /// The requested locale is not supported.
    UnsupportedLocale(String),
    /// A translation key is missing from the locale file.
    MissingKey(String),
    /// A locale file could not be found or parsed.
    FileNotFound(String),
}

impl fmt::Display for LocaleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocaleError::UnsupportedLocale(lang) => write!(f, "Unsupported locale: {}", lang),
            LocaleError::MissingKey(key) => write!(f, "Missing translation key: {}", key),
            LocaleError::FileNotFound(path) => write!(f, "Locale file not found: {}", path),
        }
    }
}

impl std::error::Error for LocaleError {}
