//! Compiled routing engine.
//!
//! # Responsibilities
//! - Hold the routing configuration in lookup-friendly form
//! - Run host parsing, tenant and locale resolution, then the rule table
//! - Anchor hosts to the configured main domain
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(1) tenant and locale lookup via HashSet
//! - Every request maps to exactly one decision; no error path

use std::collections::HashSet;

use serde::Serialize;

use crate::config::RoutingConfig;
use crate::routing::decision::{decide, RawRequest, RoutingDecision, Rule};
use crate::routing::host::{parse_host, ParsedHost, LOCALHOST};
use crate::routing::locale::{resolve_locale, LocaleContext};
use crate::routing::matcher::BypassRules;
use crate::routing::tenant::{resolve_tenant, TenantContext};

/// Everything derived while routing one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    pub host: ParsedHost,
    pub tenant: TenantContext,
    pub locale: LocaleContext,
    pub rule: Rule,
    pub decision: RoutingDecision,
}

/// Routing rules compiled from a [`RoutingConfig`].
#[derive(Debug)]
pub struct RoutingEngine {
    main_domain: Option<String>,
    allowed_tenants: HashSet<String>,
    supported_locales: HashSet<String>,
    default_locale: String,
    login_path: String,
    tenant_header: String,
    bypass: BypassRules,
}

impl RoutingEngine {
    pub fn from_config(config: &RoutingConfig) -> Self {
        Self {
            main_domain: config
                .main_domain
                .as_deref()
                .map(str::to_ascii_lowercase)
                .filter(|d| !d.is_empty()),
            allowed_tenants: config.allowed_tenants.iter().cloned().collect(),
            supported_locales: config.supported_locales.iter().cloned().collect(),
            default_locale: config.default_locale.clone(),
            login_path: config.login_path.clone(),
            tenant_header: config.tenant_header.to_ascii_lowercase(),
            bypass: BypassRules::from_config(&config.bypass),
        }
    }

    pub fn main_domain(&self) -> Option<&str> {
        self.main_domain.as_deref()
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Header name carrying the tenant on rewritten requests.
    pub fn tenant_header(&self) -> &str {
        &self.tenant_header
    }

    pub fn bypass(&self) -> &BypassRules {
        &self.bypass
    }

    /// Whether the engine runs for this path at all.
    pub fn in_scope(&self, path: &str) -> bool {
        self.bypass.in_scope(path)
    }

    /// Route one request.
    pub fn evaluate(&self, raw: &RawRequest) -> Evaluation {
        let (host, tenant) = self.classify_host(&raw.host_header);
        let locale = resolve_locale(&raw.path, &self.supported_locales, &self.default_locale);
        let (rule, decision) = decide(raw, &host, &tenant, &locale, self);

        Evaluation {
            host,
            tenant,
            locale,
            rule,
            decision,
        }
    }

    /// Route one request, returning only the decision.
    pub fn decide(&self, raw: &RawRequest) -> RoutingDecision {
        self.evaluate(raw).decision
    }

    fn classify_host(&self, host_header: &str) -> (ParsedHost, TenantContext) {
        let mut host = parse_host(host_header);
        if self.anchor(&mut host) {
            let tenant = resolve_tenant(&host, &self.allowed_tenants);
            (host, tenant)
        } else {
            (host, TenantContext::unrecognized())
        }
    }

    /// Pin the root domain to the configured main domain. Returns false for
    /// hosts outside it. `localhost` hosts are always accepted.
    fn anchor(&self, host: &mut ParsedHost) -> bool {
        let Some(main) = &self.main_domain else {
            return true;
        };
        if host.root_domain == LOCALHOST {
            return true;
        }

        let bare = host.hostname.strip_prefix("www.").unwrap_or(&host.hostname);
        let within = bare == main
            || bare
                .strip_suffix(main.as_str())
                .is_some_and(|prefix| prefix.ends_with('.'));
        if within {
            host.root_domain = main.clone();
        }
        within
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::decision::{RedirectStatus, Scheme};

    fn engine() -> RoutingEngine {
        RoutingEngine::from_config(&RoutingConfig::default())
    }

    fn anchored(domain: &str) -> RoutingEngine {
        RoutingEngine::from_config(&RoutingConfig {
            main_domain: Some(domain.to_string()),
            ..RoutingConfig::default()
        })
    }

    fn get(engine: &RoutingEngine, url: &str) -> Evaluation {
        engine.evaluate(&RawRequest::from_url(url).unwrap())
    }

    fn found(url: &str) -> RoutingDecision {
        RoutingDecision::Redirect {
            status: RedirectStatus::Found,
            target_url: url.to_string(),
        }
    }

    fn rewrite(path: &str, tenant: &str) -> RoutingDecision {
        RoutingDecision::Rewrite {
            internal_path: path.to_string(),
            tenant_header: tenant.to_string(),
        }
    }

    #[test]
    fn test_main_domain_inserts_default_locale() {
        let eval = get(&engine(), "http://example.com/about");
        assert_eq!(eval.rule, Rule::MainNoLocale);
        assert_eq!(eval.decision, found("http://example.com/fa/about"));

        let eval = get(&engine(), "http://example.com/?ref=x");
        assert_eq!(eval.decision, found("http://example.com/fa?ref=x"));
    }

    #[test]
    fn test_main_domain_with_locale_passes() {
        let eval = get(&engine(), "http://example.com/en/about");
        assert_eq!(eval.rule, Rule::MainLocalized);
        assert_eq!(eval.decision, RoutingDecision::Pass);
    }

    #[test]
    fn test_tenant_root_redirects_to_login() {
        let eval = get(&engine(), "http://car.example.com:3000/");
        assert_eq!(eval.rule, Rule::TenantRoot);
        assert_eq!(eval.decision, found("http://car.example.com:3000/fa/login"));
    }

    #[test]
    fn test_tenant_deep_path_rewrites() {
        let eval = get(&engine(), "http://car.example.com/fa/dashboard");
        assert_eq!(eval.rule, Rule::LocalePath);
        assert_eq!(eval.decision, rewrite("/fa/car/dashboard", "car"));

        let eval = get(&engine(), "http://bike.example.com/settings/profile?tab=1");
        assert_eq!(eval.rule, Rule::TenantPath);
        assert_eq!(eval.decision, rewrite("/fa/bike/settings/profile", "bike"));
    }

    #[test]
    fn test_tenant_locale_root_redirects_to_login() {
        for url in ["https://bus.example.com/en", "https://bus.example.com/en/"] {
            let eval = get(&engine(), url);
            assert_eq!(eval.rule, Rule::LocaleRoot);
            assert_eq!(eval.decision, found("https://bus.example.com/en/login"));
        }
    }

    #[test]
    fn test_disallowed_tenant_goes_to_main_domain() {
        let eval = get(&engine(), "http://evil.example.com/fa/dashboard?x=1");
        assert_eq!(eval.rule, Rule::TenantDisallowed);
        assert_eq!(eval.decision, found("http://example.com/fa"));

        let eval = get(&engine(), "http://a.car.example.com:8080/");
        assert_eq!(eval.decision, found("http://example.com:8080/fa"));
    }

    #[test]
    fn test_www_is_stripped_permanently() {
        let eval = get(&engine(), "https://www.example.com:8443/x?y=1");
        assert_eq!(eval.rule, Rule::WwwCanonical);
        assert_eq!(
            eval.decision,
            RoutingDecision::Redirect {
                status: RedirectStatus::Permanent,
                target_url: "https://example.com:8443/x?y=1".to_string(),
            }
        );
    }

    #[test]
    fn test_unsupported_two_letter_segment_is_path() {
        let eval = get(&engine(), "http://car.example.com/ca/foo");
        assert_eq!(eval.locale.locale, None);
        assert_eq!(eval.decision, rewrite("/fa/car/ca/foo", "car"));
    }

    #[test]
    fn test_bypass_wins_over_every_host() {
        let engine = anchored("example.com");
        for host in ["www.example.com", "evil.example.com", "car.example.com", "other.net", ""] {
            for path in ["/sw.js", "/manifest.json", "/_next/data/a", "/api/x", "/img/logo.svg"] {
                let raw = RawRequest::new(host, path, None, Scheme::Http);
                let eval = engine.evaluate(&raw);
                assert_eq!(eval.rule, Rule::Bypass, "{host}{path}");
                assert_eq!(eval.decision, RoutingDecision::Pass);
            }
        }
    }

    #[test]
    fn test_localhost_development_hosts() {
        let eval = get(&engine(), "http://car.localhost:3000/");
        assert_eq!(eval.decision, found("http://car.localhost:3000/fa/login"));

        let eval = get(&engine(), "http://localhost:3000/");
        assert_eq!(eval.decision, found("http://localhost:3000/fa"));
    }

    #[test]
    fn test_main_domain_anchors_multi_label_suffix() {
        let engine = anchored("shop.co.uk");
        let eval = get(&engine, "http://car.shop.co.uk/");
        assert_eq!(eval.host.root_domain, "shop.co.uk");
        assert_eq!(eval.tenant.tenant.as_deref(), Some("car"));
        assert_eq!(eval.decision, found("http://car.shop.co.uk/fa/login"));

        let eval = get(&engine, "http://shop.co.uk/x");
        assert_eq!(eval.decision, found("http://shop.co.uk/fa/x"));
    }

    #[test]
    fn test_foreign_host_falls_back_to_main_domain() {
        let engine = anchored("example.com");
        let eval = get(&engine, "http://other.net/fa/x?q=1");
        assert_eq!(eval.rule, Rule::Fallback);
        assert_eq!(eval.decision, found("http://example.com/fa"));

        let eval = get(&engine, "http://notexample.com/");
        assert_eq!(eval.rule, Rule::Fallback);

        // Localhost stays routable for development.
        let eval = get(&engine, "http://car.localhost/fa/x");
        assert_eq!(eval.decision, rewrite("/fa/car/x", "car"));
    }

    #[test]
    fn test_missing_host() {
        let raw = RawRequest::new("", "/x", None, Scheme::Http);
        let eval = engine().evaluate(&raw);
        assert_eq!(eval.rule, Rule::Fallback);
        assert_eq!(eval.decision, RoutingDecision::Pass);

        let eval = anchored("example.com").evaluate(&raw);
        assert_eq!(eval.decision, found("http://example.com/fa"));
    }

    #[test]
    fn test_anchored_tenant_resolution() {
        let engine = anchored("example.com");
        let eval = get(&engine, "http://car.example.com/x");
        assert_eq!(eval.tenant.tenant.as_deref(), Some("car"));
        assert_eq!(get(&engine, "http://car.other.net/x").tenant.tenant, None);
    }

    /// Allowed tenants always end up rewritten; the loop guard never lets
    /// one through untagged.
    #[test]
    fn test_allowed_tenant_always_reaches_rewrite() {
        let hosts = ["car.example.com", "www.car.example.com", "bike.localhost:3000"];
        let paths = ["/", "/fa", "/fa/", "/en", "/en/", "/about", "/fa/login", "/FA/x"];

        for engine in [engine(), anchored("example.com")] {
            for host in hosts {
                for path in paths {
                    let mut raw = RawRequest::new(host, path, None, Scheme::Http);
                    let mut hops = 0;
                    let eval = loop {
                        let eval = engine.evaluate(&raw);
                        let RoutingDecision::Redirect { target_url, .. } = &eval.decision else {
                            break eval;
                        };
                        hops += 1;
                        assert!(hops < 4, "no settle from {host}{path}");
                        raw = RawRequest::from_url(target_url).unwrap();
                    };
                    assert!(
                        matches!(eval.decision, RoutingDecision::Rewrite { .. }),
                        "{host}{path} settled as {:?} via {}",
                        eval.decision,
                        eval.rule
                    );
                }
            }
        }
    }

    /// Follow redirects and assert every chain settles without revisiting a URL.
    #[test]
    fn test_redirect_chains_terminate() {
        let hosts = [
            "example.com",
            "www.example.com",
            "www.example.com:8080",
            "car.example.com",
            "www.car.example.com",
            "evil.example.com",
            "a.b.example.com",
            "localhost:3000",
            "bike.localhost:3000",
            "other.net",
        ];
        let paths = [
            "/", "/fa", "/fa/", "/en", "/en/login", "/about", "/ca/foo", "/fax", "/FA/x",
            "/fa/dashboard",
        ];

        for engine in [engine(), anchored("example.com")] {
            for host in hosts {
                for path in paths {
                    for query in [None, Some("a=1")] {
                        let mut raw = RawRequest::new(host, path, query, Scheme::Https);
                        let mut seen = Vec::new();
                        loop {
                            let decision = engine.decide(&raw);
                            let RoutingDecision::Redirect { target_url, .. } = decision else {
                                break;
                            };
                            assert!(
                                !seen.contains(&target_url),
                                "loop from {host}{path}: {seen:?} -> {target_url}"
                            );
                            assert!(seen.len() < 3, "chain too long from {host}{path}: {seen:?}");
                            raw = RawRequest::from_url(&target_url).unwrap();
                            seen.push(target_url);
                        }
                    }
                }
            }
        }
    }
}
