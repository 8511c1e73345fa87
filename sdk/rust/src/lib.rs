//! Client helpers for talking to a local cache proxy.

pub mod client;

pub use client::{CacheProxyClient, ProxyClientError};
