//! Prometheus metrics for the route planning service.
//!
//! [`init_metrics`] installs the global recorder; [`metrics_handler`]
//! renders the exposition format for the `/metrics` endpoint. Business
//! metric helpers keep label sets consistent across handlers.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

/// Global Prometheus handle for rendering metrics.
static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Configuration for the metrics system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/metrics".to_string(),
        }
    }
}

impl MetricsConfig {
    /// Read `METRICS_ENABLED` and `METRICS_PATH` from the environment.
    pub fn from_env() -> Self {
        let enabled = std::env::var("METRICS_ENABLED")
            .map(|v| v.to_lowercase() != "false")
            .unwrap_or(true);
        let path = std::env::var("METRICS_PATH").unwrap_or_else(|_| "/metrics".to_string());
        Self { enabled, path }
    }
}

/// Install the Prometheus recorder. Call once at startup.
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    if !config.enabled {
        return Err(MetricsError::Disabled);
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| MetricsError::InstallFailed(e.to_string()))?;

    PROMETHEUS_HANDLE
        .set(handle)
        .map_err(|_| MetricsError::AlreadyInitialized)?;

    Ok(())
}

/// Axum handler for the metrics endpoint.
pub async fn metrics_handler() -> String {
    PROMETHEUS_HANDLE
        .get()
        .map(|h| h.render())
        .unwrap_or_else(|| "# Metrics not initialized\n".to_string())
}

/// Errors during metrics initialization.
#[derive(Debug, Clone)]
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

// =============================================================================
// Business Metrics Helpers
// =============================================================================

/// Record a completed route calculation.
pub fn record_route_calculated(criterion: &str, algorithm: &str) {
    metrics::counter!(
        "searoute_routes_calculated_total",
        "criterion" => criterion.to_string(),
        "algorithm" => algorithm.to_string()
    )
    .increment(1);
}

/// Record a failed route calculation.
pub fn record_route_failed(reason: &str) {
    metrics::counter!(
        "searoute_routes_failed_total",
        "reason" => reason.to_string()
    )
    .increment(1);
}

/// Record a cache lookup outcome ("hit" or "miss").
pub fn record_cache_outcome(outcome: &str) {
    metrics::counter!(
        "searoute_route_cache_total",
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record the primary route distance of a successful calculation.
pub fn record_route_distance(distance_nm: f64, criterion: &str) {
    metrics::histogram!(
        "searoute_route_distance_nm",
        "criterion" => criterion.to_string()
    )
    .record(distance_nm);
}

/// Record how many alternatives a calculation returned.
pub fn record_alternatives_returned(count: usize) {
    metrics::histogram!("searoute_alternatives_returned").record(count as f64);
}
