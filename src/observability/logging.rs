//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the global tracing subscriber
//! - Honor `RUST_LOG` when present, the configured level otherwise
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Request ID is a log field on every request-scoped event
//! - Log level configurable via config and environment

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// `default_level` seeds the filter for this crate and its HTTP middleware
/// when `RUST_LOG` is not set.
pub fn init(default_level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            format!("actions_cache_proxy={default_level},tower_http={default_level}").into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
