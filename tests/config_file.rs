//! The shipped sample configuration stays loadable.

use std::path::Path;

use tenant_gateway::config::{load_config, GatewayConfig, LogFormat};

#[test]
fn test_sample_config_matches_defaults() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/gateway.toml");
    let config = load_config(&path).expect("sample config should load");
    let defaults = GatewayConfig::default();

    assert_eq!(config.routing.allowed_tenants, defaults.routing.allowed_tenants);
    assert_eq!(config.routing.supported_locales, defaults.routing.supported_locales);
    assert_eq!(config.routing.default_locale, "fa");
    assert_eq!(config.routing.bypass.prefixes, defaults.routing.bypass.prefixes);
    assert_eq!(config.observability.log_format, LogFormat::Pretty);
    assert_eq!(config.branding.tenants, defaults.branding.tenants);
    assert_eq!(config.branding.fallback, defaults.branding.fallback);
}
