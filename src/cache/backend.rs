//! The capability boundary between the HTTP surface and the remote service.

use async_trait::async_trait;

use crate::cache::types::{BackendResult, CacheEntry, CacheKey};

/// Operations the HTTP surface needs from a cache artifact service.
///
/// Production wires this to [`crate::cache::ArtifactCacheClient`]; tests
/// substitute in-memory fakes so the router runs without network access.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Look up the most specific entry for `key`, falling back to
    /// `restore_keys` in order. Prefix matching happens remotely; the
    /// backend only relays the candidate list.
    ///
    /// `Ok(None)` is a clean miss. `Err` means the service could not give
    /// an answer at all.
    async fn resolve(
        &self,
        key: &CacheKey,
        restore_keys: &[String],
    ) -> BackendResult<Option<CacheEntry>>;

    /// Compose the upload target URL scoped to `key`.
    ///
    /// Never checks whether the key already has an entry; duplicate handling
    /// belongs to the remote service's own upload protocol.
    async fn reserve_upload(&self, key: &CacheKey) -> BackendResult<String>;
}
