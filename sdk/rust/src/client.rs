//! Typed wrapper over the proxy's HEAD/GET/POST surface.
//!
//! The proxy answers with statuses and redirects rather than bodies, so
//! this client never follows redirects itself; it surfaces the `Location`
//! targets for the caller to use directly against the remote store.

use reqwest::{header, redirect, Client, StatusCode};
use thiserror::Error;

/// Errors produced by the proxy client.
#[derive(Debug, Error)]
pub enum ProxyClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The proxy answered outside its documented status set. A 502 lands
    /// here: the remote service was unreachable or misbehaving.
    #[error("proxy returned unexpected status {0}")]
    UnexpectedStatus(u16),

    #[error("redirect response carried no usable Location header")]
    MissingLocation,
}

/// Client for a cache proxy listening at a fixed local address.
pub struct CacheProxyClient {
    client: Client,
    proxy_url: String,
}

impl CacheProxyClient {
    /// Create a client for the proxy at `proxy_url`
    /// (e.g. "http://127.0.0.1:12321").
    pub fn new(proxy_url: &str) -> Result<Self, ProxyClientError> {
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .build()?;
        Ok(Self {
            client,
            proxy_url: proxy_url.trim_end_matches('/').to_string(),
        })
    }

    fn key_url(&self, key: &str) -> String {
        format!("{}/{}", self.proxy_url, key)
    }

    /// Whether an entry exists for `key`.
    pub async fn entry_exists(&self, key: &str) -> Result<bool, ProxyClientError> {
        let response = self.client.head(self.key_url(key)).send().await?;
        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(ProxyClientError::UnexpectedStatus(status.as_u16())),
        }
    }

    /// The archive URL for `key`, or `None` on a miss.
    pub async fn archive_location(&self, key: &str) -> Result<Option<String>, ProxyClientError> {
        let response = self.client.get(self.key_url(key)).send().await?;
        match response.status() {
            StatusCode::FOUND => Ok(Some(location(&response)?)),
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(ProxyClientError::UnexpectedStatus(status.as_u16())),
        }
    }

    /// The upload target URL for `key`.
    pub async fn upload_target(&self, key: &str) -> Result<String, ProxyClientError> {
        let response = self.client.post(self.key_url(key)).send().await?;
        match response.status() {
            StatusCode::FOUND => location(&response),
            status => Err(ProxyClientError::UnexpectedStatus(status.as_u16())),
        }
    }
}

fn location(response: &reqwest::Response) -> Result<String, ProxyClientError> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .ok_or(ProxyClientError::MissingLocation)
}
