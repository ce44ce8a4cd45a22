//! Header manipulation for forwarded requests.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers in both directions
//! - Add X-Forwarded-Host and X-Forwarded-Proto
//! - Attach the tenant header on rewrites
//!
//! # Design Decisions
//! - The original `Host` is kept so the renderer sees the tenant host
//! - Existing X-Forwarded-* values are replaced, not appended

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

use crate::routing::Scheme;

const HOP_BY_HOP: [HeaderName; 6] = [
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::UPGRADE,
];

/// Remove hop-by-hop headers, including any named by `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in named.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
    headers.remove("keep-alive");
    headers.remove("proxy-connection");
    headers.remove(header::TRANSFER_ENCODING);
}

/// Record the client-facing host and scheme for the renderer.
pub fn set_forwarded(headers: &mut HeaderMap, host: &str, scheme: Scheme) {
    if let Ok(value) = HeaderValue::from_str(host) {
        headers.insert("x-forwarded-host", value);
    }
    headers.insert(
        "x-forwarded-proto",
        HeaderValue::from_static(scheme.as_str()),
    );
}

/// Set the tenant marker header. Invalid names or values are skipped.
pub fn set_tenant(headers: &mut HeaderMap, name: &str, tenant: &str) {
    let (Ok(name), Ok(value)) = (
        HeaderName::from_bytes(name.as_bytes()),
        HeaderValue::from_str(tenant),
    ) else {
        tracing::warn!(header = %name, tenant = %tenant, "Skipping invalid tenant header");
        return;
    };
    headers.insert(name, value);
}
