//! Schema migrations for the bookmark database.
//!
//! Uses a `schema_version` table to track which migrations have been applied.
//! Migrations form an ordered list; each step runs in its own transaction,
//! exactly once, and is recorded with a timestamp.

use rusqlite::Connection;
use tracing::info;

/// Current schema version. Bump this when adding a new migration.
pub const CURRENT_SCHEMA_VERSION: i32 = 3;

struct Migration {
    version: i32,
    description: &'static str,
    apply: fn(&Connection) -> Result<(), rusqlite::Error>,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Initial schema: bookmarks table",
        apply: migration_v1,
    },
    Migration {
        version: 2,
        description: "Add attachments_payload to bookmarks",
        apply: migration_v2,
    },
    Migration {
        version: 3,
        description: "Add components_payload and message_flags to bookmarks",
        apply: migration_v3,
    },
];

/// Returns the current schema version from the database (0 if table doesn't exist).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .unwrap_or(0)
}

/// Runs all pending schema migrations against the provided connection.
///
/// Safe to call on every startup.
///
/// # Errors
/// Returns `rusqlite::Error` if any SQL statement fails.
pub fn run_all(conn: &Connection) -> Result<(), rusqlite::Error> {
    // Not versioned
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         CREATE TABLE IF NOT EXISTS schema_version (
             version INTEGER PRIMARY KEY,
             applied_at INTEGER NOT NULL,
             description TEXT NOT NULL
         );",
    )?;

    let current = get_schema_version(conn);

    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        let tx = conn.unchecked_transaction()?;
        (migration.apply)(&tx)?;
        record_version(&tx, migration.version, migration.description)?;
        tx.commit()?;
        info!(
            version = migration.version,
            "applied schema migration: {}", migration.description
        );
    }

    Ok(())
}

fn record_version(conn: &Connection, version: i32, description: &str) -> Result<(), rusqlite::Error> {
    let now = chrono::Utc::now().timestamp();
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at, description) VALUES (?1, ?2, ?3)",
        rusqlite::params![version, now, description],
    )?;
    Ok(())
}

/// Adds a column, treating "already there" as success.
///
/// A table created outside the version ledger may already carry the column.
fn add_column(conn: &Connection, table: &str, column_def: &str) -> Result<(), rusqlite::Error> {
    match conn.execute_batch(&format!("ALTER TABLE {} ADD COLUMN {};", table, column_def)) {
        Ok(()) => Ok(()),
        Err(e) if e.to_string().contains("duplicate column name") => Ok(()),
        Err(e) => Err(e),
    }
}

/// V1: Create the bookmarks table.
fn migration_v1(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS bookmarks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id INTEGER NOT NULL,
            source_message_id INTEGER NOT NULL,
            source_channel_id INTEGER NOT NULL,
            source_guild_id INTEGER NOT NULL,
            text_content TEXT,
            embed_payload TEXT,
            author_display_name TEXT NOT NULL,
            author_avatar_url TEXT,
            source_timestamp TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_bookmarks_owner_created ON bookmarks(owner_id, created_at);
        ",
    )
}

/// V2: Attachment snapshots.
fn migration_v2(conn: &Connection) -> Result<(), rusqlite::Error> {
    add_column(conn, "bookmarks", "attachments_payload TEXT")
}

/// V3: Components v2 tree and message flags.
fn migration_v3(conn: &Connection) -> Result<(), rusqlite::Error> {
    add_column(conn, "bookmarks", "components_payload TEXT")?;
    add_column(conn, "bookmarks", "message_flags INTEGER NOT NULL DEFAULT 0")
}
