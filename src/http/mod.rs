//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, method dispatch)
//!     → request.rs (request ID stamping)
//!     → cache backend call
//!     → response.rs (status + Location shaping)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestIdExt, RequestIdLayer, X_REQUEST_ID};
pub use server::HttpServer;
