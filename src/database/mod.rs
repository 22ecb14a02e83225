//! msgmark database layer.
//!
//! Provides SQLite connection management and schema migrations.
//!
//! # Usage
//!
//! ```no_run
//! use msgmark::database::Database;
//!
//! // Open a persistent database
//! let db = Database::open("bookmarks.db").expect("failed to open database");
//!
//! // Or use an in-memory database for testing
//! let db = Database::open_in_memory().expect("failed to open in-memory database");
//!
//! // Each operation takes its own connection
//! let conn = db.connect().expect("failed to connect");
//! ```

pub mod connection;
pub mod migrations;

pub use connection::{Database, IN_MEMORY_PATH};
