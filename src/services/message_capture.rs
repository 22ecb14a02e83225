//! Message capture for msgmark.
//!
//! Extracts the opaque parts of a source message (embeds, component tree,
//! flags, guild) into the form the bookmark store persists.

use serde_json::Value;

use crate::types::bookmark::{CapturedPayloads, COMPONENTS_V2_FLAG};
use crate::types::message::SourceMessage;

/// Builds the store payloads for a message.
///
/// Empty embed and component lists are stored as `None`. Direct messages get guild `0`.
pub fn capture(message: &SourceMessage) -> Result<CapturedPayloads, serde_json::Error> {
    Ok(CapturedPayloads {
        embed_payload: encode_list(&message.embeds)?,
        components_payload: encode_list(&message.components)?,
        message_flags: message.flags,
        guild_id: message.guild_id.unwrap_or(0),
    })
}

/// Whether the message carries a Components v2 layout.
pub fn is_components_v2(message: &SourceMessage) -> bool {
    message.flags & COMPONENTS_V2_FLAG != 0
}

fn encode_list(items: &[Value]) -> Result<Option<String>, serde_json::Error> {
    if items.is_empty() {
        Ok(None)
    } else {
        serde_json::to_string(items).map(Some)
    }
}
