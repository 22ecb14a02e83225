// msgmark shared type definitions
// Each submodule defines types used across the bot core.

pub mod bookmark;
pub mod component;
pub mod errors;
pub mod message;
pub mod presentation;
pub mod settings;
