// msgmark services
// Services turn stored rows into something presentable: capture, reconstruction,
// listing summaries, settings and localization.

pub mod bookmark_listing;
pub mod content_reconstructor;
pub mod localization_engine;
pub mod message_capture;
pub mod settings_engine;
