//! Remote cache service subsystem.
//!
//! # Data Flow
//! ```text
//! HTTP surface (http::server)
//!     → backend.rs (CacheBackend capability)
//!     → client.rs (ArtifactCacheClient: credentials, endpoint composition,
//!       wire protocol)
//!     → remote artifact cache service
//! ```
//!
//! # Design Decisions
//! - The HTTP surface depends on the `CacheBackend` trait, never on the wire
//!   client, so its tests run against in-memory fakes
//! - A miss is `Ok(None)`; only transport and protocol failures are errors
//! - Credentials live in the client and nowhere else

pub mod backend;
pub mod client;
pub mod types;

pub use backend::CacheBackend;
pub use client::ArtifactCacheClient;
pub use types::{BackendError, BackendResult, CacheEntry, CacheKey};
