//! Prometheus metrics for the campus API.
//!
//! The recorder is installed once by [`init_metrics`]; until then the macros
//! are no-ops and `/metrics` answers with a comment line.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl MetricsConfig {
    /// Reads `METRICS_ENABLED` ("false" disables, default enabled).
    pub fn from_env() -> Self {
        let enabled = std::env::var("METRICS_ENABLED")
            .map(|v| !v.eq_ignore_ascii_case("false"))
            .unwrap_or(true);
        Self { enabled }
    }
}

/// Install the Prometheus recorder.
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    if !config.enabled {
        return Err(MetricsError::Disabled);
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| MetricsError::InstallFailed(e.to_string()))?;

    PROMETHEUS_HANDLE
        .set(handle)
        .map_err(|_| MetricsError::AlreadyInitialized)
}

/// Handler for `GET /metrics` in Prometheus exposition format.
pub async fn metrics_handler() -> String {
    PROMETHEUS_HANDLE
        .get()
        .map(|h| h.render())
        .unwrap_or_else(|| "# Metrics not initialized\n".to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricsError {
    Disabled,
    AlreadyInitialized,
    InstallFailed(String),
}

impl std::fmt::Display for MetricsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricsError::Disabled => write!(f, "metrics are disabled"),
            MetricsError::AlreadyInitialized => write!(f, "metrics recorder already initialized"),
            MetricsError::InstallFailed(e) => {
                write!(f, "failed to install metrics recorder: {}", e)
            }
        }
    }
}

impl std::error::Error for MetricsError {}

/// Count a successful route. `start_mode` is "node" or "position".
pub fn record_route_calculated(start_mode: &'static str) {
    metrics::counter!("campusnav_routes_calculated_total", "start" => start_mode).increment(1);
}

/// Count a failed route by reason (e.g. "no_path", "node_not_found").
pub fn record_route_failed(reason: &'static str) {
    metrics::counter!("campusnav_routes_failed_total", "reason" => reason).increment(1);
}

pub fn record_route_waypoints(waypoints: usize) {
    metrics::histogram!("campusnav_route_waypoints").record(waypoints as f64);
}

/// Time spent loading one campus snapshot.
pub fn record_snapshot_load(seconds: f64) {
    metrics::histogram!("campusnav_snapshot_load_seconds").record(seconds);
}
