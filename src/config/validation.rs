//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check locale and tenant lists are well-formed
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderName;
use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;
use crate::routing::locale::is_locale_code;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid bind address `{0}`")]
    BindAddress(String),

    #[error("invalid metrics address `{0}`")]
    MetricsAddress(String),

    #[error("upstream url `{0}` must be an absolute http url")]
    UpstreamUrl(String),

    #[error("timeout `{0}` must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("locale `{0}` must be two lowercase ascii letters")]
    LocaleCode(String),

    #[error("no supported locales configured")]
    NoLocales,

    #[error("default locale `{0}` is not a supported locale")]
    DefaultLocaleUnsupported(String),

    #[error("tenant `{0}` must be a single lowercase dns label other than `www`")]
    TenantLabel(String),

    #[error("main domain `{0}` must be a bare hostname without port or `www.`")]
    MainDomain(String),

    #[error("max connections must be greater than zero")]
    ZeroMaxConnections,

    #[error("login path `{0}` must be an absolute path below `/`")]
    LoginPath(String),

    #[error("tenant header `{0}` is not a valid header name")]
    TenantHeader(String),

    #[error("bypass pattern `{0}` must start with `/`")]
    BypassPattern(String),
}

/// Validate a parsed configuration, collecting every error.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.listener.max_connections == 0 {
        errors.push(ValidationError::ZeroMaxConnections);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    match Url::parse(&config.upstream.url) {
        Ok(url) if url.scheme() == "http" && url.has_host() => {}
        _ => errors.push(ValidationError::UpstreamUrl(config.upstream.url.clone())),
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("connect_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }

    let routing = &config.routing;

    if routing.supported_locales.is_empty() {
        errors.push(ValidationError::NoLocales);
    }
    for locale in &routing.supported_locales {
        if !is_locale_code(locale) {
            errors.push(ValidationError::LocaleCode(locale.clone()));
        }
    }
    if !routing.supported_locales.contains(&routing.default_locale) {
        errors.push(ValidationError::DefaultLocaleUnsupported(
            routing.default_locale.clone(),
        ));
    }

    for tenant in &routing.allowed_tenants {
        if !is_tenant_label(tenant) {
            errors.push(ValidationError::TenantLabel(tenant.clone()));
        }
    }

    if let Some(domain) = &routing.main_domain {
        if domain.is_empty()
            || domain.contains(':')
            || domain.contains('/')
            || domain.starts_with("www.")
            || domain.to_ascii_lowercase() != *domain
        {
            errors.push(ValidationError::MainDomain(domain.clone()));
        }
    }

    // `/` would make the login redirect land on the locale root again.
    if !routing.login_path.starts_with('/') || routing.login_path.trim_matches('/').is_empty() {
        errors.push(ValidationError::LoginPath(routing.login_path.clone()));
    }

    if HeaderName::from_bytes(routing.tenant_header.as_bytes()).is_err() {
        errors.push(ValidationError::TenantHeader(routing.tenant_header.clone()));
    }

    let bypass = &routing.bypass;
    for pattern in bypass
        .exact_paths
        .iter()
        .chain(&bypass.prefixes)
        .chain(&bypass.excluded_prefixes)
        .chain(&bypass.excluded_paths)
    {
        if !pattern.starts_with('/') {
            errors.push(ValidationError::BypassPattern(pattern.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_tenant_label(label: &str) -> bool {
    label != "www"
        && !label.is_empty()
        && label.len() <= 63
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}
