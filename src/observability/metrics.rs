//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_decisions_total` (counter): decisions by rule and outcome
//! - `gateway_upstream_requests_total` (counter): forwarded requests by status
//! - `gateway_upstream_duration_seconds` (histogram): renderer latency
//! - `gateway_config_reloads_total` (counter): applied reloads
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Labels are low-cardinality: never host or path

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::routing::{RoutingDecision, Rule};

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .add_global_label("service", "tenant-gateway")
        .install()?;

    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_decision(rule: Rule, decision: &RoutingDecision) {
    let labels = [
        ("rule", rule.as_str().to_string()),
        ("outcome", decision.outcome().to_string()),
    ];
    counter!("gateway_decisions_total", &labels).increment(1);
}

pub fn record_upstream(status: u16, start: Instant) {
    let labels = [("status", status.to_string())];
    counter!("gateway_upstream_requests_total", &labels).increment(1);
    histogram!("gateway_upstream_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_reload() {
    counter!("gateway_config_reloads_total").increment(1);
}
