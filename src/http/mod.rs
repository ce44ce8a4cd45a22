//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (host, path, query, scheme)
//!     → routing engine (Pass | Redirect | Rewrite)
//!     → response.rs (redirects) or headers.rs + renderer (forwarding)
//!     → Send to client
//! ```

pub mod headers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{raw_request, X_REQUEST_ID};
pub use server::{AppState, GatewaySnapshot, HttpServer};
