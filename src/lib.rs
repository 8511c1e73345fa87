//! Local HTTP proxy for a remote, authenticated build-artifact cache.
//!
//! Exposes an unauthenticated HEAD/GET/POST surface where the request path
//! is the cache key, and answers each request by consulting the remote
//! service: existence checks, download redirects, and upload-target
//! redirects. Credentials stay in this process; local callers only ever
//! see redirect URLs.

pub mod cache;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use cache::{ArtifactCacheClient, CacheBackend, CacheEntry, CacheKey};
pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
