//! RPC method handler for the msgmark JSON-RPC protocol.
//!
//! Kept apart from `rpc_server.rs` so it can be unit-tested without stdio.
//! `handle_method` dispatches a method call to the [`App`] and turns failures
//! into localized status messages.

use serde_json::{json, Value};

use crate::app::App;
use crate::types::bookmark::{BookmarkPage, SaveReceipt};
use crate::types::message::SourceMessage;

/// Component layout lines returned with a bookmark view.
const LAYOUT_PREVIEW_LINES: usize = 10;

/// Dispatch a JSON-RPC method call.
///
/// Every method accepts an optional `locale` param selecting the language of
/// its status messages. Returns `Ok(Value)` on success or `Err(String)` with a
/// message fit for the end user.
pub fn handle_method(app: &App, method: &str, params: &Value) -> Result<Value, String> {
    let locale = params.get("locale").and_then(|v| v.as_str());
    let invalid = |reason: &str| app.text(locale, "errors.invalid_params", &[("reason", reason.to_string())]);

    match method {
        "ping" => Ok(json!({"pong": true, "version": env!("CARGO_PKG_VERSION")})),

        "bookmark.save" => {
            let owner_id = param_i64(params, "owner_id").ok_or_else(|| invalid("missing owner_id"))?;
            let raw = params.get("message").cloned().ok_or_else(|| invalid("missing message"))?;
            let message: SourceMessage = serde_json::from_value(raw)
                .map_err(|e| invalid(&format!("bad message: {}", e)))?;

            let receipt = app
                .save(owner_id, &message)
                .map_err(|e| app.status_message(&e, locale))?;
            Ok(json!({
                "id": receipt.bookmark_id,
                "is_components_v2": receipt.is_components_v2,
                "attachment_count": receipt.attachment_count,
                "message": save_message(app, locale, &receipt),
            }))
        }

        "bookmark.list" => {
            let owner_id = param_i64(params, "owner_id").ok_or_else(|| invalid("missing owner_id"))?;
            let page = match params.get("page") {
                None | Some(Value::Null) => 1,
                Some(_) => param_i64(params, "page").ok_or_else(|| invalid("page must be an integer"))?,
            };

            let page = app
                .list_page(owner_id, page)
                .map_err(|e| app.status_message(&e, locale))?;
            Ok(list_response(app, locale, &page))
        }

        "bookmark.view" => {
            let owner_id = param_i64(params, "owner_id").ok_or_else(|| invalid("missing owner_id"))?;
            let id = param_i64(params, "id").ok_or_else(|| invalid("missing id"))?;

            let model = app
                .view_detail(owner_id, id)
                .map_err(|e| app.status_message(&e, locale))?;
            let jump_url = model.link.jump_url();
            let mut value = serde_json::to_value(&model).map_err(|e| e.to_string())?;
            if let Value::Object(map) = &mut value {
                map.insert("jump_url".to_string(), json!(jump_url));
                if let Some(summary) = &model.components {
                    let (lines, omitted) = summary.layout_preview(LAYOUT_PREVIEW_LINES);
                    map.insert(
                        "layout_preview".to_string(),
                        json!({"lines": lines, "omitted": omitted}),
                    );
                }
            }
            Ok(value)
        }

        "bookmark.delete" => {
            let owner_id = param_i64(params, "owner_id").ok_or_else(|| invalid("missing owner_id"))?;
            let id = param_i64(params, "id").ok_or_else(|| invalid("missing id"))?;

            app.delete(owner_id, id)
                .map_err(|e| app.status_message(&e, locale))?;
            Ok(json!({
                "ok": true,
                "message": app.text(locale, "delete.success", &[("id", id.to_string())]),
            }))
        }

        _ => Err(app.text(locale, "errors.unknown_method", &[("method", method.to_string())])),
    }
}

/// Reads an integer param. Snowflake IDs may arrive as JSON strings.
fn param_i64(params: &Value, key: &str) -> Option<i64> {
    match params.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn save_message(app: &App, locale: Option<&str>, receipt: &SaveReceipt) -> String {
    let mut lines = vec![app.text(locale, "save.success", &[("id", receipt.bookmark_id.to_string())])];
    if receipt.attachment_count > 0 {
        lines.push(app.plural_text(locale, "save.attachments", receipt.attachment_count as u64));
    }
    if receipt.is_components_v2 {
        lines.push(app.text(locale, "save.components_v2", &[]));
    }
    lines.join("\n")
}

fn list_response(app: &App, locale: Option<&str>, page: &BookmarkPage) -> Value {
    let no_content = app.text(locale, "list.no_content", &[]);
    let entries: Vec<Value> = app
        .list_entries(page)
        .into_iter()
        .map(|entry| {
            json!({
                "id": entry.id,
                "author": entry.author_display_name,
                "source_timestamp": entry.source_timestamp,
                "preview": entry.preview.unwrap_or_else(|| no_content.clone()),
                "image_count": entry.image_count,
                "file_count": entry.file_count,
            })
        })
        .collect();

    let message = if page.total_count == 0 {
        app.text(locale, "list.empty", &[])
    } else {
        app.text(
            locale,
            "list.header",
            &[
                ("page", page.page.to_string()),
                ("total_pages", page.total_pages.to_string()),
                ("total", page.total_count.to_string()),
            ],
        )
    };

    json!({
        "page": page.page,
        "total_pages": page.total_pages,
        "total_count": page.total_count,
        "page_size": page.page_size,
        "entries": entries,
        "message": message,
    })
}
