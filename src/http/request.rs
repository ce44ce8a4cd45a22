//! Request inspection.
//!
//! # Responsibilities
//! - Request ID header name shared by the middleware stack
//! - Extract routing-relevant information (host, path, query, scheme)
//!
//! # Design Decisions
//! - `Host` header first, URI authority second (HTTP/2 `:authority`)
//! - `X-Forwarded-Proto` only consulted when the listener trusts it

use axum::body::Body;
use axum::http::{header, HeaderMap, Request};

use crate::routing::{RawRequest, Scheme};

/// Request ID header set on every request and echoed on every response.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Forwarded scheme header from a TLS-terminating hop.
pub const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Build the engine input for a request.
pub fn raw_request(request: &Request<Body>, trust_forwarded_proto: bool) -> RawRequest {
    let uri = request.uri();

    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .or_else(|| uri.authority().map(|a| a.as_str().to_string()))
        .unwrap_or_default();

    let forwarded = if trust_forwarded_proto {
        forwarded_scheme(request.headers())
    } else {
        None
    };
    let scheme = forwarded
        .or_else(|| uri.scheme_str().and_then(Scheme::parse))
        .unwrap_or(Scheme::Http);

    RawRequest::new(host, uri.path(), uri.query(), scheme)
}

/// Request ID assigned by the middleware stack.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// First value of `X-Forwarded-Proto` (`https, http` → https).
fn forwarded_scheme(headers: &HeaderMap) -> Option<Scheme> {
    let value = headers.get(X_FORWARDED_PROTO)?.to_str().ok()?;
    let first = value.split(',').next()?.trim();
    Scheme::parse(first)
}
