//! Tenant resolution from a parsed host.

use std::collections::HashSet;

use serde::Serialize;

use crate::routing::host::ParsedHost;

/// Who a request is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantContext {
    /// Subdomain label; only set for strict subdomains of the root domain.
    pub tenant: Option<String>,
    /// Apex or `www.` apex.
    pub is_main_domain: bool,
    /// `tenant` is a single label on the allow-list.
    pub is_allowed: bool,
}

impl TenantContext {
    /// A host that is neither the main domain nor one of its subdomains.
    pub fn unrecognized() -> Self {
        Self {
            tenant: None,
            is_main_domain: false,
            is_allowed: false,
        }
    }

    fn main_domain() -> Self {
        Self {
            tenant: None,
            is_main_domain: true,
            is_allowed: false,
        }
    }
}

/// Resolve the tenant a host addresses.
///
/// `www.` hosts count as the main domain; the decision engine redirects
/// them before the tenant is ever consulted.
pub fn resolve_tenant(host: &ParsedHost, allowed_tenants: &HashSet<String>) -> TenantContext {
    if host.hostname.starts_with("www.") || host.hostname == host.root_domain {
        return TenantContext::main_domain();
    }

    let suffix = format!(".{}", host.root_domain);
    match host.hostname.strip_suffix(&suffix) {
        Some(label) if !label.is_empty() => {
            // Multi-label prefixes (a.b.example.com) are never routable.
            let is_allowed = !label.contains('.') && allowed_tenants.contains(label);
            TenantContext {
                tenant: Some(label.to_string()),
                is_main_domain: false,
                is_allowed,
            }
        }
        _ => TenantContext::unrecognized(),
    }
}
