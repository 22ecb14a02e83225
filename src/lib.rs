//! msgmark: personal message bookmarks for a chat bot.
//!
//! Saves chat messages (text, attachments, embeds and Components v2 layouts)
//! per user in SQLite and rebuilds a display-ready view of each bookmark on demand.
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod app;
pub mod database;
pub mod logging;
pub mod managers;
pub mod rpc_handler;
pub mod services;
pub mod types;
