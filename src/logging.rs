//! Tracing setup for the msgmark binaries.
//!
//! Logs go to stderr; stdout carries the RPC protocol.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber.
///
/// `RUST_LOG` takes precedence over `filter`. An invalid `filter` falls back to `info`.
/// Calling this more than once is harmless; later calls are ignored.
pub fn init_logging(filter: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .try_init();
}
