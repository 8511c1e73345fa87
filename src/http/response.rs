//! Response shaping for the proxy surface.
//!
//! # Responsibilities
//! - Build the empty-bodied status responses the surface is made of
//! - Build redirect responses pointing callers at remote URLs
//!
//! # Design Decisions
//! - Bodies stay empty: the status line and `Location` header are the whole
//!   contract, and nothing from the remote service leaks through
//! - A remote URL that cannot form a header value is reported to the caller
//!   as a fault, not a panic

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

/// An empty-bodied response with the given status.
pub fn empty(status: StatusCode) -> Response {
    status.into_response()
}

/// A `302 Found` redirect to `location`, or `None` when the URL cannot be
/// carried in a header.
pub fn redirect(location: &str) -> Option<Response> {
    let value = HeaderValue::from_str(location).ok()?;
    let mut response = StatusCode::FOUND.into_response();
    response.headers_mut().insert(header::LOCATION, value);
    Some(response)
}
