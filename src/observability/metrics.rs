//! Metrics collection and exposition.
//!
//! # Metrics
//! - `router_resolutions_total` (counter): resolutions by outcome and versioning mode
//! - `router_advisories_total` (counter): advisories by kind
//! - `router_advisories_dropped_total` (counter): advisories lost to a full sink
//!
//! # Design Decisions
//! - Recording without an installed recorder is a no-op
//! - Prometheus exporter is optional and installed once at startup

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::routing::notifier::AdvisoryKind;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_resolution(outcome: &'static str, mode: &'static str) {
    metrics::counter!("router_resolutions_total", "outcome" => outcome, "mode" => mode).increment(1);
}

pub fn record_advisory(kind: AdvisoryKind) {
    metrics::counter!("router_advisories_total", "kind" => kind.as_str()).increment(1);
}

pub fn record_advisory_dropped() {
    metrics::counter!("router_advisories_dropped_total").increment(1);
}
