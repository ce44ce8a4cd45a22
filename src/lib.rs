//! Host and locale routing front door for multi-tenant web applications.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod manifest;
pub mod observability;
pub mod routing;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{RawRequest, RoutingDecision, RoutingEngine};
