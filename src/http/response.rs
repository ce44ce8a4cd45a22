//! Client-facing responses produced by the gateway itself.
//!
//! # Responsibilities
//! - Turn redirect decisions into 301/302 responses with `Location`
//! - Map upstream failures to appropriate HTTP status codes
//!
//! # Design Decisions
//! - Redirect bodies are empty
//! - Unreachable renderer results in 502 Bad Gateway

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::routing::RedirectStatus;

/// Redirect response for a decision target.
pub fn redirect(status: RedirectStatus, target_url: &str) -> Response {
    match HeaderValue::from_str(target_url) {
        Ok(location) => {
            let mut response = Response::new(Body::empty());
            *response.status_mut() = status.status_code();
            response.headers_mut().insert(header::LOCATION, location);
            response
        }
        Err(_) => {
            tracing::warn!(target_url = %target_url, "Redirect target is not a valid header value");
            (StatusCode::BAD_REQUEST, "Invalid host").into_response()
        }
    }
}

pub fn bad_gateway() -> Response {
    (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
}
