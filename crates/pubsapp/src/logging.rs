//! Logging setup for pubs front-ends.
//!
//! The library only emits `tracing` events; a binary decides where they go
//! by calling [`init_logging`] once at startup.
//!
//! # Environment Variables
//!
//! - `PUBS_LOG`: Filter directive (like `RUST_LOG`), e.g. `pubsapp=debug`
//! - `PUBS_LOG_FORMAT`: Output format for stderr: `compact` (default) or `json`

use std::env;
use std::io;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Log output format for stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    /// One JSON object per line
    Json,
}

impl LogFormat {
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "compact" => Some(LogFormat::Compact),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

/// Filter directive: `PUBS_LOG` wins, then `RUST_LOG`, then the default level.
fn filter_directive(verbose: bool) -> String {
    env::var("PUBS_LOG")
        .ok()
        .or_else(|| env::var("RUST_LOG").ok())
        .unwrap_or_else(|| if verbose { "debug" } else { "warn" }.to_string())
}

/// Install the global subscriber. Calling it twice is harmless: the second
/// call leaves the first subscriber in place.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_new(filter_directive(verbose))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let format = env::var("PUBS_LOG_FORMAT")
        .ok()
        .and_then(|s| LogFormat::parse_str(&s))
        .unwrap_or_default();

    let registry = Registry::default().with(filter);
    let _ = match format {
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_target(false).with_writer(io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(io::stderr))
            .try_init(),
    };
}
