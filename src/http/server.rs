//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum router and wire up middleware (tracing, request ID)
//! - Dispatch each request on its method to one of the three cache
//!   operations: existence check (HEAD), upload redirect (POST), and
//!   download redirect (everything else)
//! - Map backend results onto the status/Location contract
//! - Serve until the shutdown signal fires
//!
//! # Design Decisions
//! - Every method on every path lands in the same dispatcher: the method
//!   picks the operation and the path carries the key, so there is no
//!   route table to fall through
//! - Artifact bytes never pass through this process; callers are
//!   redirected to the remote store in both directions

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::extract::State;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::routing::any;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::cache::{CacheBackend, CacheKey};
use crate::http::request::{RequestIdExt, RequestIdLayer};
use crate::http::response;
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn CacheBackend>,
}

/// HTTP server for the cache proxy.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new server in front of the given cache backend.
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        let state = AppState { backend };
        let router = Self::build_router(state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*key}", any(dispatch))
            .route("/", any(dispatch))
            .with_state(state)
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until `shutdown` fires, then drain and return.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "Cache proxy listening"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Route a request on its method and produce exactly one response.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request.request_id().unwrap_or("unknown").to_string();
    let method = request.method().clone();
    // The raw path, not the decoded one: keys travel byte-for-byte.
    let key = CacheKey::from_path(request.uri().path());

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        key = %key,
        "Dispatching request"
    );

    let (response, outcome) = if method == Method::HEAD {
        check_entry(state.backend.as_ref(), &key, &request_id).await
    } else if method == Method::POST {
        upload_redirect(state.backend.as_ref(), &key, &request_id).await
    } else {
        download_redirect(state.backend.as_ref(), &key, &request_id).await
    };

    metrics::record_request(
        method.as_str(),
        response.status().as_u16(),
        outcome,
        start_time,
    );
    tracing::info!(
        request_id = %request_id,
        method = %method,
        key = %key,
        status = response.status().as_u16(),
        outcome = outcome,
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "Request served"
    );

    response
}

/// HEAD: existence only. The entry's location is never exposed.
async fn check_entry(
    backend: &dyn CacheBackend,
    key: &CacheKey,
    request_id: &str,
) -> (Response, &'static str) {
    match backend.resolve(key, &[]).await {
        Ok(Some(entry)) => {
            tracing::debug!(
                request_id = %request_id,
                key = %key,
                matched_key = %entry.matched_key,
                "Entry exists"
            );
            (response::empty(StatusCode::OK), "hit")
        }
        Ok(None) => {
            tracing::debug!(
                request_id = %request_id,
                key = %key,
                "No matching entry"
            );
            (response::empty(StatusCode::NOT_FOUND), "miss")
        }
        Err(error) => fault(key, request_id, "resolve", &error),
    }
}

/// Default branch (GET and any unrecognized method): redirect the caller to
/// the entry's archive location.
async fn download_redirect(
    backend: &dyn CacheBackend,
    key: &CacheKey,
    request_id: &str,
) -> (Response, &'static str) {
    match backend.resolve(key, &[]).await {
        Ok(Some(entry)) => match response::redirect(&entry.archive_location) {
            Some(response) => {
                tracing::debug!(
                    request_id = %request_id,
                    key = %key,
                    matched_key = %entry.matched_key,
                    "Redirecting to archive"
                );
                (response, "hit")
            }
            None => fault(
                key,
                request_id,
                "resolve",
                &"archive location is not a valid header value",
            ),
        },
        Ok(None) => {
            tracing::debug!(
                request_id = %request_id,
                key = %key,
                "No matching entry"
            );
            (response::empty(StatusCode::NOT_FOUND), "miss")
        }
        Err(error) => fault(key, request_id, "resolve", &error),
    }
}

/// POST: hand back the upload target unconditionally. Whether the key is
/// already cached is the remote service's decision to make at upload time.
async fn upload_redirect(
    backend: &dyn CacheBackend,
    key: &CacheKey,
    request_id: &str,
) -> (Response, &'static str) {
    match backend.reserve_upload(key).await {
        Ok(target) => match response::redirect(&target) {
            Some(response) => {
                tracing::debug!(
                    request_id = %request_id,
                    key = %key,
                    "Redirecting to upload target"
                );
                (response, "upload")
            }
            None => fault(
                key,
                request_id,
                "reserve upload",
                &"upload target is not a valid header value",
            ),
        },
        Err(error) => fault(key, request_id, "reserve upload", &error),
    }
}

/// Answer a remote fault: 502 with an empty body. The cause is logged here
/// and never forwarded to the local caller.
fn fault(
    key: &CacheKey,
    request_id: &str,
    operation: &'static str,
    error: &dyn std::fmt::Display,
) -> (Response, &'static str) {
    tracing::error!(
        request_id = %request_id,
        key = %key,
        operation = operation,
        error = %error,
        "Cache operation failed"
    );
    (response::empty(StatusCode::BAD_GATEWAY), "fault")
}
