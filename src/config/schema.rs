//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration for the tenant gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, connection limits).
    pub listener: ListenerConfig,

    /// Downstream renderer that receives passed and rewritten requests.
    pub upstream: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Host/locale routing rules.
    pub routing: RoutingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Per-tenant manifest branding.
    pub branding: BrandingConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum concurrent in-flight requests (backpressure).
    pub max_connections: usize,

    /// Take the request scheme from `X-Forwarded-Proto` when present.
    pub trust_forwarded_proto: bool,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_connections: 10_000,
            trust_forwarded_proto: true,
        }
    }
}

/// Downstream renderer configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the renderer (e.g., "http://127.0.0.1:3000").
    pub url: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:3000".to_string(),
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Tenant and locale routing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Canonical apex domain. When unset, the root domain is derived from
    /// each request's host.
    pub main_domain: Option<String>,

    /// Subdomain labels permitted to route.
    pub allowed_tenants: Vec<String>,

    /// Two-letter locale codes recognized as a path prefix.
    pub supported_locales: Vec<String>,

    /// Locale inserted when a path carries none.
    pub default_locale: String,

    /// Tenant landing page, relative to the locale segment.
    pub login_path: String,

    /// Header carrying the tenant label on rewritten requests.
    pub tenant_header: String,

    /// Paths that skip host and locale handling.
    pub bypass: BypassConfig,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            main_domain: None,
            allowed_tenants: vec!["car".to_string(), "bike".to_string(), "bus".to_string()],
            supported_locales: vec!["fa".to_string(), "en".to_string()],
            default_locale: "fa".to_string(),
            login_path: "/login".to_string(),
            tenant_header: "x-subdomain".to_string(),
            bypass: BypassConfig::default(),
        }
    }
}

/// Static-asset and internal path patterns.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BypassConfig {
    /// Paths passed through verbatim.
    pub exact_paths: Vec<String>,

    /// Path prefixes passed through verbatim.
    pub prefixes: Vec<String>,

    /// Pass any path whose last segment has a file extension.
    pub file_extensions: bool,

    /// Prefixes forwarded without evaluating the engine at all.
    pub excluded_prefixes: Vec<String>,

    /// Paths forwarded without evaluating the engine at all.
    pub excluded_paths: Vec<String>,
}

impl Default for BypassConfig {
    fn default() -> Self {
        Self {
            exact_paths: vec!["/sw.js".to_string(), "/manifest.json".to_string()],
            prefixes: vec!["/_next/".to_string(), "/api/".to_string()],
            file_extensions: true,
            excluded_prefixes: vec!["/_next/static".to_string(), "/_next/image".to_string()],
            excluded_paths: vec!["/favicon.ico".to_string()],
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Manifest branding, keyed by tenant label.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BrandingConfig {
    /// Answer `GET /manifest.json` from the gateway instead of the renderer.
    pub serve_manifest: bool,

    pub tenants: BTreeMap<String, TenantBranding>,

    /// Used when the host carries no known tenant.
    pub fallback: TenantBranding,
}

/// Display metadata for one tenant.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct TenantBranding {
    pub name: String,
    pub short_name: String,
    pub theme_color: String,
}

impl TenantBranding {
    fn new(name: &str, short_name: &str, theme_color: &str) -> Self {
        Self {
            name: name.to_string(),
            short_name: short_name.to_string(),
            theme_color: theme_color.to_string(),
        }
    }
}

impl Default for BrandingConfig {
    fn default() -> Self {
        let mut tenants = BTreeMap::new();
        tenants.insert("car".to_string(), TenantBranding::new("Car Dashboard", "Car", "#007aff"));
        tenants.insert("bike".to_string(), TenantBranding::new("Bike App", "Bike", "#00c853"));
        tenants.insert(
            "bicycle".to_string(),
            TenantBranding::new("Bicycle Manager", "Bicycle", "#ff4081"),
        );

        Self {
            serve_manifest: true,
            tenants,
            fallback: TenantBranding::new("My Awesome PWA App", "PWA App", "#ffffff"),
        }
    }
}
