//! Actions cache proxy
//!
//! A local redirector in front of the GitHub Actions artifact cache, built
//! with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌───────────────────────────────────────────────┐
//!                        │                  CACHE PROXY                  │
//!                        │                                               │
//!   Build tool           │  ┌─────────┐      ┌────────────────────────┐ │
//!   ─────────────────────┼─▶│  http   │─────▶│    method dispatch     │ │
//!   HEAD/GET/POST /<key> │  │ server  │      │  HEAD → exists?        │ │
//!                        │  └─────────┘      │  POST → upload target  │ │
//!                        │                   │  else → download       │ │
//!                        │                   └──────────┬─────────────┘ │
//!                        │                              │               │
//!                        │                              ▼               │
//!   302 / 200 / 404      │                   ┌────────────────────────┐ │
//!   ◀────────────────────┼───────────────────│ cache::ArtifactCache-  │ │
//!                        │                   │ Client (token + URLs)  │ │
//!                        │                   └──────────┬─────────────┘ │
//!                        │                              │               │
//!                        │  ┌─────────────────────────┐ │               │
//!                        │  │ config · observability  │ │               │
//!                        │  │ lifecycle               │ │               │
//!                        │  └─────────────────────────┘ │               │
//!                        └──────────────────────────────┼───────────────┘
//!                                                       ▼
//!                             Remote artifact cache service (authenticated)
//! ```
//!
//! The proxy never relays artifact bytes: downloads and uploads both leave
//! as redirects to the remote store.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use actions_cache_proxy::cache::ArtifactCacheClient;
use actions_cache_proxy::config;
use actions_cache_proxy::http::HttpServer;
use actions_cache_proxy::lifecycle::{signals, Shutdown};
use actions_cache_proxy::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "actions-cache-proxy")]
#[command(about = "Local redirector for the GitHub Actions artifact cache")]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listener bind address, overriding the config file and environment.
    #[arg(short, long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = config::resolve_config(cli.config.as_deref(), cli.listen.as_deref())?;

    logging::init(&config.observability.log_level);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        "Configuration loaded"
    );
    if config.upstream.token.is_empty() {
        tracing::warn!("Upstream token is empty; the remote service will reject every call");
    }

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let backend = Arc::new(ArtifactCacheClient::new(&config.upstream)?);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    let server = HttpServer::new(backend);
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
