//! Routing decisions and the ordered rule table.
//!
//! # Rule Order
//! ```text
//! bypass            static asset / internal path       → Pass
//! www_canonical     www.<host>                          → 301 <host>
//! main_no_locale    apex, no locale                     → 302 /<default><path>
//! main_localized    apex, locale                        → Pass
//! tenant_disallowed tenant not on the allow-list        → 302 <root>/<default>
//! tenant_root       tenant, no locale, `/`              → 302 /<default><login>
//! tenant_path       tenant, no locale, deeper           → rewrite /<default>/<tenant><path>
//! locale_root       tenant, locale, `/xx` or `/xx/`     → 302 /<locale><login>
//! locale_path       tenant, locale, deeper              → rewrite /<locale>/<tenant><rest>
//! fallback          anything else                       → 302 <main>/<default>
//! ```
//!
//! Every redirect is checked against the current URL; a redirect to itself
//! becomes `Pass`.

use std::fmt;

use axum::http::StatusCode;
use serde::Serialize;
use url::Url;

use crate::routing::engine::RoutingEngine;
use crate::routing::host::ParsedHost;
use crate::routing::locale::LocaleContext;
use crate::routing::tenant::TenantContext;

/// Request scheme as seen by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }

    /// Parse `http`/`https`, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("https") {
            Some(Scheme::Https)
        } else if value.eq_ignore_ascii_case("http") {
            Some(Scheme::Http)
        } else {
            None
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The parts of an inbound request the engine consults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawRequest {
    pub host_header: String,
    pub path: String,
    /// Query string without `?`; `None` when absent or empty.
    pub query: Option<String>,
    pub scheme: Scheme,
}

impl RawRequest {
    pub fn new(
        host_header: impl Into<String>,
        path: impl Into<String>,
        query: Option<&str>,
        scheme: Scheme,
    ) -> Self {
        Self {
            host_header: host_header.into(),
            path: path.into(),
            query: query.filter(|q| !q.is_empty()).map(str::to_string),
            scheme,
        }
    }

    /// Build a request from an absolute `http(s)` URL.
    pub fn from_url(url: &str) -> Option<Self> {
        let url = Url::parse(url).ok()?;
        let scheme = Scheme::parse(url.scheme())?;
        let host = url.host_str()?;
        let host_header = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        Some(Self::new(host_header, url.path(), url.query(), scheme))
    }
}

/// Redirect status codes the engine emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RedirectStatus {
    /// 301, www canonicalization only.
    Permanent,
    /// 302.
    Found,
}

impl RedirectStatus {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RedirectStatus::Permanent => StatusCode::MOVED_PERMANENTLY,
            RedirectStatus::Found => StatusCode::FOUND,
        }
    }
}

/// Outcome of evaluating one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RoutingDecision {
    /// Forward unchanged.
    Pass,
    /// Send the client elsewhere.
    Redirect {
        status: RedirectStatus,
        target_url: String,
    },
    /// Forward to `internal_path`, tagged with the tenant.
    Rewrite {
        internal_path: String,
        tenant_header: String,
    },
}

impl RoutingDecision {
    pub fn outcome(&self) -> &'static str {
        match self {
            RoutingDecision::Pass => "pass",
            RoutingDecision::Redirect { .. } => "redirect",
            RoutingDecision::Rewrite { .. } => "rewrite",
        }
    }

    fn found(target_url: String) -> Self {
        RoutingDecision::Redirect {
            status: RedirectStatus::Found,
            target_url,
        }
    }
}

/// The rule that produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    Bypass,
    WwwCanonical,
    MainNoLocale,
    MainLocalized,
    TenantDisallowed,
    TenantRoot,
    TenantPath,
    LocaleRoot,
    LocalePath,
    Fallback,
}

impl Rule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rule::Bypass => "bypass",
            Rule::WwwCanonical => "www_canonical",
            Rule::MainNoLocale => "main_no_locale",
            Rule::MainLocalized => "main_localized",
            Rule::TenantDisallowed => "tenant_disallowed",
            Rule::TenantRoot => "tenant_root",
            Rule::TenantPath => "tenant_path",
            Rule::LocaleRoot => "locale_root",
            Rule::LocalePath => "locale_path",
            Rule::Fallback => "fallback",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Apply the rule table. Pure and total.
pub fn decide(
    raw: &RawRequest,
    host: &ParsedHost,
    tenant: &TenantContext,
    locale: &LocaleContext,
    engine: &RoutingEngine,
) -> (Rule, RoutingDecision) {
    if engine.bypass().is_bypassed(&raw.path) {
        return (Rule::Bypass, RoutingDecision::Pass);
    }

    let (rule, decision) = apply_rules(raw, host, tenant, locale, engine);

    // Loop guard: never send the client to the URL it is already on.
    if let RoutingDecision::Redirect { target_url, .. } = &decision {
        let current = absolute_url(
            raw.scheme,
            &host.authority_for(&host.hostname),
            &raw.path,
            raw.query.as_deref(),
        );
        if *target_url == current {
            return (rule, RoutingDecision::Pass);
        }
    }

    (rule, decision)
}

fn apply_rules(
    raw: &RawRequest,
    host: &ParsedHost,
    tenant: &TenantContext,
    locale: &LocaleContext,
    engine: &RoutingEngine,
) -> (Rule, RoutingDecision) {
    let query = raw.query.as_deref();
    let same_host = host.authority_for(&host.hostname);

    if let Some(bare) = host.hostname.strip_prefix("www.").filter(|b| !b.is_empty()) {
        let target = absolute_url(raw.scheme, &host.authority_for(bare), &raw.path, query);
        return (
            Rule::WwwCanonical,
            RoutingDecision::Redirect {
                status: RedirectStatus::Permanent,
                target_url: target,
            },
        );
    }

    if host.hostname.is_empty() {
        return fallback(raw, host, engine);
    }

    if tenant.is_main_domain {
        return match &locale.locale {
            None => {
                let path = with_locale(engine.default_locale(), &raw.path);
                let target = absolute_url(raw.scheme, &same_host, &path, query);
                (Rule::MainNoLocale, RoutingDecision::found(target))
            }
            Some(_) => (Rule::MainLocalized, RoutingDecision::Pass),
        };
    }

    let Some(label) = &tenant.tenant else {
        return fallback(raw, host, engine);
    };

    if !tenant.is_allowed {
        let path = with_locale(engine.default_locale(), "/");
        let target = absolute_url(raw.scheme, &host.authority_for(&host.root_domain), &path, None);
        return (Rule::TenantDisallowed, RoutingDecision::found(target));
    }

    let login = with_locale(&locale.effective, engine.login_path());
    let rewrite = |rest: &str| RoutingDecision::Rewrite {
        internal_path: format!("/{}/{}{}", locale.effective, label, rest),
        tenant_header: label.clone(),
    };

    match &locale.locale {
        None if raw.path == "/" => {
            let target = absolute_url(raw.scheme, &same_host, &login, query);
            (Rule::TenantRoot, RoutingDecision::found(target))
        }
        None => (Rule::TenantPath, rewrite(&raw.path)),
        Some(_) if matches!(locale.path_without_locale.as_str(), "" | "/") => {
            let target = absolute_url(raw.scheme, &same_host, &login, query);
            (Rule::LocaleRoot, RoutingDecision::found(target))
        }
        Some(_) => (Rule::LocalePath, rewrite(&locale.path_without_locale)),
    }
}

/// Redirect to the main domain's default-locale root. Passes when no
/// main domain is known (empty host, no configured domain).
fn fallback(raw: &RawRequest, host: &ParsedHost, engine: &RoutingEngine) -> (Rule, RoutingDecision) {
    let domain = engine.main_domain().unwrap_or(&host.root_domain);
    if domain.is_empty() {
        return (Rule::Fallback, RoutingDecision::Pass);
    }

    let path = with_locale(engine.default_locale(), "/");
    let target = absolute_url(raw.scheme, &host.authority_for(domain), &path, None);
    (Rule::Fallback, RoutingDecision::found(target))
}

/// Prefix `path` with `/<locale>`; the root path becomes `/<locale>`.
fn with_locale(locale: &str, path: &str) -> String {
    match path {
        "" | "/" => format!("/{locale}"),
        p if p.starts_with('/') => format!("/{locale}{p}"),
        p => format!("/{locale}/{p}"),
    }
}

fn absolute_url(scheme: Scheme, authority: &str, path: &str, query: Option<&str>) -> String {
    match query {
        Some(q) => format!("{scheme}://{authority}{path}?{q}"),
        None => format!("{scheme}://{authority}{path}"),
    }
}
