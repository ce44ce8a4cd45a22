//! Tenant-branded web app manifest.
//!
//! A static lookup from tenant label to display metadata, answered for
//! `GET /manifest.json` on any host.

use std::collections::HashMap;

use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::config::{BrandingConfig, TenantBranding};

/// Path served from the catalog instead of the renderer.
pub const MANIFEST_PATH: &str = "/manifest.json";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ManifestImage {
    pub src: &'static str,
    pub sizes: &'static str,
    #[serde(rename = "type")]
    pub mime_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_factor: Option<&'static str>,
}

const ICONS: [ManifestImage; 2] = [
    ManifestImage {
        src: "https://placehold.co/192x192/png",
        sizes: "192x192",
        mime_type: "image/png",
        form_factor: None,
    },
    ManifestImage {
        src: "https://placehold.co/512x512/png",
        sizes: "512x512",
        mime_type: "image/png",
        form_factor: None,
    },
];

const SCREENSHOTS: [ManifestImage; 2] = [
    ManifestImage {
        src: "https://placehold.co/1280x720/png",
        sizes: "1280x720",
        mime_type: "image/png",
        form_factor: Some("wide"),
    },
    ManifestImage {
        src: "https://placehold.co/375x667/png",
        sizes: "375x667",
        mime_type: "image/png",
        form_factor: None,
    },
];

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WebManifest {
    pub name: String,
    pub short_name: String,
    pub theme_color: String,
    pub icons: Vec<ManifestImage>,
    pub screenshots: Vec<ManifestImage>,
    pub start_url: &'static str,
    pub display: &'static str,
    pub orientation: &'static str,
    pub background_color: &'static str,
}

impl WebManifest {
    fn branded(branding: &TenantBranding) -> Self {
        Self {
            name: branding.name.clone(),
            short_name: branding.short_name.clone(),
            theme_color: branding.theme_color.clone(),
            icons: ICONS.to_vec(),
            screenshots: SCREENSHOTS.to_vec(),
            start_url: "/",
            display: "standalone",
            orientation: "portrait",
            background_color: "#FFFFFF",
        }
    }
}

/// Branding per tenant, with a generic fallback.
#[derive(Debug, Clone)]
pub struct ManifestCatalog {
    enabled: bool,
    tenants: HashMap<String, TenantBranding>,
    fallback: TenantBranding,
}

impl ManifestCatalog {
    pub fn from_config(config: &BrandingConfig) -> Self {
        Self {
            enabled: config.serve_manifest,
            tenants: config
                .tenants
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            fallback: config.fallback.clone(),
        }
    }

    /// Whether the gateway answers manifest requests itself.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Manifest for a tenant; unknown or absent tenants get the fallback.
    pub fn manifest_for(&self, tenant: Option<&str>) -> WebManifest {
        let branding = tenant
            .and_then(|t| self.tenants.get(t))
            .unwrap_or(&self.fallback);
        WebManifest::branded(branding)
    }

    pub fn respond(&self, tenant: Option<&str>) -> Response {
        let mut response = Json(self.manifest_for(tenant)).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/manifest+json"),
        );
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ManifestCatalog {
        ManifestCatalog::from_config(&BrandingConfig::default())
    }

    #[test]
    fn test_known_tenant() {
        let manifest = catalog().manifest_for(Some("car"));
        assert_eq!(manifest.name, "Car Dashboard");
        assert_eq!(manifest.short_name, "Car");
        assert_eq!(manifest.theme_color, "#007aff");
        assert_eq!(manifest.icons.len(), 2);
    }

    #[test]
    fn test_unknown_tenant_uses_fallback() {
        let catalog = catalog();
        assert_eq!(catalog.manifest_for(Some("bus")).name, "My Awesome PWA App");
        assert_eq!(catalog.manifest_for(None).short_name, "PWA App");
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(catalog().manifest_for(Some("bike"))).unwrap();
        assert_eq!(json["theme_color"], "#00c853");
        assert_eq!(json["display"], "standalone");
        assert_eq!(json["icons"][0]["type"], "image/png");
        assert_eq!(json["screenshots"][0]["form_factor"], "wide");
        assert!(json["screenshots"][1].get("form_factor").is_none());
    }
}
