//! Shared utilities for the proxy's integration tests.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::net::TcpListener;

use actions_cache_proxy::cache::{BackendError, BackendResult, CacheBackend, CacheEntry, CacheKey};
use actions_cache_proxy::http::HttpServer;
use actions_cache_proxy::lifecycle::Shutdown;

/// In-memory stand-in for the remote cache service.
///
/// Keys map to archive locations; the fail flags inject remote faults on
/// a per-operation basis while the proxy keeps running.
pub struct FakeBackend {
    entries: Mutex<HashMap<String, String>>,
    fail_resolve: AtomicBool,
    fail_reserve: AtomicBool,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            fail_resolve: AtomicBool::new(false),
            fail_reserve: AtomicBool::new(false),
        }
    }

    pub fn insert(&self, key: &str, archive_location: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), archive_location.to_string());
    }

    #[allow(dead_code)]
    pub fn set_fail_resolve(&self, fail: bool) {
        self.fail_resolve.store(fail, Ordering::SeqCst);
    }

    #[allow(dead_code)]
    pub fn set_fail_reserve(&self, fail: bool) {
        self.fail_reserve.store(fail, Ordering::SeqCst);
    }
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheBackend for FakeBackend {
    async fn resolve(
        &self,
        key: &CacheKey,
        _restore_keys: &[String],
    ) -> BackendResult<Option<CacheEntry>> {
        if self.fail_resolve.load(Ordering::SeqCst) {
            return Err(BackendError::Status(500));
        }
        Ok(self
            .entries
            .lock()
            .unwrap()
            .get(key.as_str())
            .map(|location| CacheEntry {
                matched_key: key.as_str().to_string(),
                archive_location: location.clone(),
            }))
    }

    async fn reserve_upload(&self, key: &CacheKey) -> BackendResult<String> {
        if self.fail_reserve.load(Ordering::SeqCst) {
            return Err(BackendError::Status(500));
        }
        Ok(format!("https://store.example/caches/{}", key.as_str()))
    }
}

/// Start a proxy around `backend` on an ephemeral local port.
///
/// The returned `Shutdown` must stay alive for as long as the proxy should
/// keep serving; dropping it stops the server.
pub async fn spawn_proxy(backend: Arc<dyn CacheBackend>) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    let server = HttpServer::new(backend);
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// A local caller that observes redirects instead of following them.
pub fn no_redirect_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
