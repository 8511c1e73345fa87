//! Authenticated client for the remote artifact cache service.
//!
//! # Responsibilities
//! - Compose service endpoints from the configured base URL
//! - Attach credentials and protocol headers to every remote call
//! - Map the service's status conventions onto hit / miss / fault
//!
//! # Design Decisions
//! - A miss (204, 404, or an entry without an archive location) is a normal
//!   result, never an error
//! - No retries and no client-side timeout; callers own both policies
//! - Raw remote error payloads are logged here and never returned upward

use async_trait::async_trait;
use reqwest::{header, StatusCode};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use url::Url;

use crate::cache::backend::CacheBackend;
use crate::cache::types::{BackendError, BackendResult, CacheEntry, CacheKey};
use crate::config::UpstreamConfig;

/// Resource prefix the service mounts its cache API under.
const API_ROOT: &str = "_apis/artifactcache/";

/// Accept header value carrying the service's API version.
const ACCEPT_JSON: &str = "application/json;api-version=6.0-preview.1";

/// User agent the service expects from cache clients.
const USER_AGENT: &str = "actions/cache";

/// Client for the remote artifact cache service.
///
/// Holds the only credential-bearing state in the process. The HTTP surface
/// sees redirect targets, never the token.
#[derive(Clone)]
pub struct ArtifactCacheClient {
    http: reqwest::Client,
    base_url: Url,
    token: String,
}

impl ArtifactCacheClient {
    /// Build a client from upstream configuration.
    pub fn new(config: &UpstreamConfig) -> BackendResult<Self> {
        let base_url = normalize_base_url(&config.base_url)?;
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base_url,
            token: config.token.clone(),
        })
    }

    /// Compose an absolute API URL for `resource`.
    fn api_url(&self, resource: &str) -> String {
        format!("{}{}{}", self.base_url, API_ROOT, resource)
    }
}

impl std::fmt::Debug for ArtifactCacheClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactCacheClient")
            .field("base_url", &self.base_url.as_str())
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Normalize the configured service URL.
///
/// The runtime hands out its `pipelines` endpoint; the cache API is served
/// from the matching `artifactcache` endpoint. A trailing separator is
/// ensured so resources append cleanly.
fn normalize_base_url(raw: &str) -> BackendResult<Url> {
    let mut rewritten = raw.replace("pipelines", "artifactcache");
    if !rewritten.ends_with('/') {
        rewritten.push('/');
    }
    Url::parse(&rewritten).map_err(|source| BackendError::InvalidBaseUrl {
        url: raw.to_string(),
        source,
    })
}

/// Version discriminator sent alongside resolve calls: the hex SHA-256 of
/// the primary key.
fn cache_version(key: &CacheKey) -> String {
    hex::encode(Sha256::digest(key.as_str().as_bytes()))
}

/// Strip the UTF-8 byte order mark some service responses prepend to their
/// JSON payload.
fn strip_bom(body: &[u8]) -> &[u8] {
    body.strip_prefix(b"\xef\xbb\xbf").unwrap_or(body)
}

/// Body of a successful resolve response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CacheQueryResponse {
    #[serde(default)]
    cache_key: Option<String>,
    #[serde(default)]
    archive_location: String,
}

#[async_trait]
impl CacheBackend for ArtifactCacheClient {
    async fn resolve(
        &self,
        key: &CacheKey,
        restore_keys: &[String],
    ) -> BackendResult<Option<CacheEntry>> {
        let mut keys = key.as_str().to_string();
        for restore_key in restore_keys {
            keys.push(',');
            keys.push_str(restore_key);
        }
        // Keys arrive percent-encoded from the local caller and are forwarded
        // byte-for-byte, so the query is composed without re-encoding.
        let url = self.api_url(&format!("cache?keys={}&version={}", keys, cache_version(key)));

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .header(header::USER_AGENT, USER_AGENT)
            .header(header::ACCEPT, ACCEPT_JSON)
            .header(header::ACCEPT_CHARSET, "utf-8")
            .send()
            .await?;

        match response.status() {
            StatusCode::NO_CONTENT | StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let body = response.bytes().await?;
                let payload: CacheQueryResponse = serde_json::from_slice(strip_bom(&body))?;
                if payload.archive_location.is_empty() {
                    tracing::debug!(key = %key, "Resolve response carried no archive location");
                    return Ok(None);
                }
                Ok(Some(CacheEntry {
                    matched_key: payload
                        .cache_key
                        .unwrap_or_else(|| key.as_str().to_string()),
                    archive_location: payload.archive_location,
                }))
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                tracing::warn!(
                    key = %key,
                    status = status.as_u16(),
                    body = %body,
                    "Cache service rejected resolve"
                );
                Err(BackendError::Status(status.as_u16()))
            }
        }
    }

    async fn reserve_upload(&self, key: &CacheKey) -> BackendResult<String> {
        Ok(self.api_url(&format!("caches/{}", key.as_str())))
    }
}
