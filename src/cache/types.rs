//! Core types shared across the cache subsystem.

use thiserror::Error;

/// Cache key extracted from an inbound request path.
///
/// The key is the request path with exactly one leading separator stripped,
/// carried verbatim from there on: no percent-decoding, no case folding, no
/// segmentation. An empty key is a legal value that simply never matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Build a key from a raw request path.
    pub fn from_path(path: &str) -> Self {
        Self(path.strip_prefix('/').unwrap_or(path).to_string())
    }

    /// The key exactly as it will be sent to the remote service.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The remote service's description of a located artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// The precise key the service matched (the primary key or one of the
    /// restore keys).
    pub matched_key: String,

    /// Absolute, time-limited URL the artifact can be fetched from.
    pub archive_location: String,
}

/// Errors surfaced by a cache backend.
///
/// A clean miss is not an error; resolve operations report it as `Ok(None)`.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The remote service could not be reached or the exchange died mid-flight.
    #[error("cache service request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote service answered with a status that is neither a success
    /// nor one of its miss conventions.
    #[error("cache service responded with status {0}")]
    Status(u16),

    /// The remote service answered success with a payload that could not
    /// be decoded.
    #[error("cache service sent an undecodable payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured base URL cannot be used to compose service endpoints.
    #[error("invalid cache service URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        source: url::ParseError,
    },
}

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_strips_exactly_one_leading_separator() {
        assert_eq!(CacheKey::from_path("/abc").as_str(), "abc");
        assert_eq!(CacheKey::from_path("//abc").as_str(), "/abc");
        assert_eq!(CacheKey::from_path("abc").as_str(), "abc");
    }

    #[test]
    fn key_is_carried_verbatim() {
        let key = CacheKey::from_path("/deps/x86_64%2Bv2/cargo.tar");
        assert_eq!(key.as_str(), "deps/x86_64%2Bv2/cargo.tar");
    }

    #[test]
    fn empty_path_yields_empty_key() {
        assert_eq!(CacheKey::from_path("/").as_str(), "");
        assert_eq!(CacheKey::from_path("").as_str(), "");
    }

    #[test]
    fn test_error_display() {
        let error = BackendError::Status(503);
        assert_eq!(
            error.to_string(),
            "cache service responded with status 503"
        );
    }
}
