//! Tracing setup for applications and tests.
//!
//! The library itself only emits `tracing` events. Hosts that do not install
//! their own subscriber can call [`init_tracing`]:
//!
//! ```bash
//! TYPELENS_LOG=debug my-app
//! TYPELENS_LOG=typelens::invoke=trace TYPELENS_LOG_FORMAT=json my-app
//! ```
//!
//! Nothing is installed unless `TYPELENS_LOG` (or `RUST_LOG`) is set.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Standard flat text lines (default).
    Text,
    /// Newline-delimited JSON objects.
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    /// Parse from the `TYPELENS_LOG_FORMAT` environment variable.
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("TYPELENS_LOG_FORMAT").unwrap_or_default())
    }
}

/// Build an `EnvFilter` from `TYPELENS_LOG`, falling back to `RUST_LOG`.
fn build_filter() -> Option<EnvFilter> {
    if let Ok(val) = std::env::var("TYPELENS_LOG") {
        Some(EnvFilter::builder().parse_lossy(val))
    } else if std::env::var("RUST_LOG").is_ok() {
        Some(EnvFilter::from_default_env())
    } else {
        None
    }
}

/// Initialise the global tracing subscriber, writing to stderr.
///
/// Returns `true` if this call installed the subscriber. Returns `false`
/// when no filter variable is set or a subscriber already exists.
pub fn init_tracing() -> bool {
    let Some(filter) = build_filter() else {
        return false;
    };

    match LogFormat::from_env() {
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);
            Registry::default().with(filter).with(json_layer).try_init().is_ok()
        }
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok(),
    }
}
