//! SQLite connection management for msgmark.
//!
//! Provides the [`Database`] struct. It does not hold a working connection:
//! every store operation opens its own short-lived `rusqlite::Connection`
//! through [`Database::connect`] and drops it when done.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use rusqlite::{Connection, OpenFlags};
use tracing::{debug, info};
use uuid::Uuid;

use super::migrations;
use crate::types::errors::StorageError;

/// Value of `storage.database_path` that selects an in-memory database.
pub const IN_MEMORY_PATH: &str = ":memory:";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
enum Location {
    File(PathBuf),
    /// URI of a named shared-cache in-memory database.
    Memory(String),
}

/// Handle to the bookmark database.
///
/// Cheap to share behind an `Arc`; connections are created per operation.
pub struct Database {
    location: Location,
    /// Keeps a named in-memory database alive between operations. Never queried.
    _anchor: Option<Mutex<Connection>>,
}

impl Database {
    /// Opens (or creates) a SQLite database at the given file path and brings its schema up to date.
    ///
    /// # Errors
    /// Returns `StorageError` if the file cannot be opened or a migration fails.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = Self {
            location: Location::File(path.as_ref().to_path_buf()),
            _anchor: None,
        };
        db.ensure_schema()?;
        info!(path = %path.as_ref().display(), "opened bookmark database");
        Ok(db)
    }

    /// Opens a private in-memory database and runs migrations.
    ///
    /// Each call gets its own uniquely named database, discarded when the
    /// `Database` is dropped.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let uri = format!("file:msgmark-{}?mode=memory&cache=shared", Uuid::new_v4());
        let anchor = Self::open_uri(&uri)?;
        let db = Self {
            location: Location::Memory(uri),
            _anchor: Some(Mutex::new(anchor)),
        };
        db.ensure_schema()?;
        debug!("opened in-memory bookmark database");
        Ok(db)
    }

    /// Opens the database named by a `storage.database_path` setting.
    pub fn from_setting(path: &str) -> Result<Self, StorageError> {
        if path == IN_MEMORY_PATH {
            Self::open_in_memory()
        } else {
            Self::open(path)
        }
    }

    /// Creates the schema if absent and applies pending migrations.
    ///
    /// Idempotent and safe to call on every startup. Existing rows are never touched.
    pub fn ensure_schema(&self) -> Result<(), StorageError> {
        let conn = self.connect()?;
        migrations::run_all(&conn).map_err(|e| StorageError::Migration(e.to_string()))
    }

    /// Opens a fresh connection for a single operation.
    pub fn connect(&self) -> Result<Connection, StorageError> {
        let conn = match &self.location {
            Location::File(path) => {
                Connection::open(path).map_err(|e| StorageError::Unavailable(e.to_string()))?
            }
            Location::Memory(uri) => Self::open_uri(uri)?,
        };
        conn.busy_timeout(BUSY_TIMEOUT)
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(conn)
    }

    /// Returns `true` for in-memory databases.
    pub fn is_in_memory(&self) -> bool {
        matches!(self.location, Location::Memory(_))
    }

    fn open_uri(uri: &str) -> Result<Connection, StorageError> {
        Connection::open_with_flags(
            uri,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| StorageError::Unavailable(e.to_string()))
    }
}
