//! msgmark RPC Server: JSON-RPC over stdin/stdout for the bot's command layer.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"bookmark.save", "params":{"owner_id":1,"message":{...}}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}

use std::sync::Arc;
use std::time::Instant;

use msgmark::app::App;
use msgmark::logging::init_logging;
use msgmark::rpc_handler::handle_method;
use msgmark::services::settings_engine::{SettingsEngine, SettingsEngineTrait};

use serde_json::{json, Value};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Fixed-window rate limiter over all requests.
struct RateLimiter {
    window_start: Instant,
    request_count: u32,
    max_per_second: u32,
}

impl RateLimiter {
    fn new(max_per_second: u32) -> Self {
        Self { window_start: Instant::now(), request_count: 0, max_per_second }
    }

    /// Returns true if the request is allowed, false if rate-limited.
    fn check(&mut self) -> bool {
        if self.window_start.elapsed().as_secs() >= 1 {
            self.window_start = Instant::now();
            self.request_count = 0;
        }
        self.request_count += 1;
        self.request_count <= self.max_per_second
    }
}

async fn write_line(stdout: &mut io::Stdout, value: &Value) -> io::Result<()> {
    let mut line = value.to_string();
    line.push('\n');
    stdout.write_all(line.as_bytes()).await?;
    stdout.flush().await
}

#[tokio::main]
async fn main() {
    let mut settings_engine = SettingsEngine::new(None);
    let settings_result = settings_engine.load();
    settings_engine.apply_env_overrides();
    let settings = settings_engine.get_settings().clone();

    init_logging(&settings.logging.filter);
    if let Err(e) = settings_result {
        warn!(error = %e, path = settings_engine.get_config_path(), "using default settings");
    }

    let app = match App::new(settings.clone()) {
        Ok(app) => Arc::new(app),
        Err(e) => {
            error!(error = %e, "failed to open bookmark storage");
            std::process::exit(1);
        }
    };

    let mut stdout = io::stdout();
    let ready = json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")});
    if write_line(&mut stdout, &ready).await.is_err() {
        return;
    }
    info!("rpc server ready");

    // One writer owns stdout so response lines never interleave.
    let (tx, mut rx) = mpsc::unbounded_channel::<Value>();
    let writer = tokio::spawn(async move {
        while let Some(response) = rx.recv().await {
            if let Err(e) = write_line(&mut stdout, &response).await {
                error!(error = %e, "failed to write response");
                break;
            }
        }
    });

    let mut rate_limiter = RateLimiter::new(settings.rpc.max_requests_per_second);
    let mut lines = BufReader::new(io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(l)) => l,
            Ok(None) => break,
            Err(e) => {
                error!(error = %e, "failed to read stdin");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                let _ = tx.send(json!({"id": null, "error": format!("parse error: {}", e)}));
                continue;
            }
        };

        let id = req.get("id").cloned().unwrap_or(Value::Null);
        if !rate_limiter.check() {
            warn!("rate limit exceeded");
            let _ = tx.send(json!({"id": id, "error": "rate limit exceeded"}));
            continue;
        }

        let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("").to_string();
        let params = req.get("params").cloned().unwrap_or(json!({}));
        let app = app.clone();
        let tx = tx.clone();

        tokio::spawn(async move {
            // SQLite calls block, so they run on the blocking pool.
            let result = tokio::task::spawn_blocking(move || handle_method(&app, &method, &params)).await;
            let response = match result {
                Ok(Ok(val)) => json!({"id": id, "result": val}),
                Ok(Err(err)) => json!({"id": id, "error": err}),
                Err(e) => {
                    error!(error = %e, "request handler panicked");
                    json!({"id": id, "error": "internal error"})
                }
            };
            let _ = tx.send(response);
        });
    }

    // In-flight requests hold sender clones; the writer drains until they finish.
    drop(tx);
    let _ = writer.await;
    info!("stdin closed, shutting down");
}
