//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGTERM, SIGINT)
//! - Translate signals to the internal shutdown event
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Both signals mean the same thing here: stop accepting, drain, exit

/// Wait until the process receives SIGINT or SIGTERM.
#[cfg(unix)]
pub async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate =
        signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupt received, shutting down");
        }
        _ = terminate.recv() => {
            tracing::info!("Termination signal received, shutting down");
        }
    }
}

/// Wait until the process receives Ctrl+C.
#[cfg(not(unix))]
pub async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Interrupt received, shutting down");
}
