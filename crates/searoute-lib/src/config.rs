//! Planner configuration.
//!
//! Every tunable named in the service contract, with its default. Values
//! come from the environment in deployments and are constructed directly
//! in tests.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::graph::GraphOptions;

/// Configuration for the route planning core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Compute semaphore ceiling.
    pub max_concurrent_calculations: usize,
    /// Hard cap applied when a request omits its own timeout, in seconds.
    pub default_request_timeout_s: f64,
    /// TTL for positive route responses, in seconds.
    pub route_cache_ttl_s: u64,
    /// k-NN fan-out in graph build.
    pub graph_k_nearest: usize,
    /// Number of hub nodes.
    pub graph_hub_count: usize,
    /// Radius cap for k-NN edges, nautical miles.
    pub graph_knn_radius_nm: f64,
    /// Radius cap for hub edges, nautical miles.
    pub graph_hub_radius_nm: f64,
    /// Alternative pruning multiplier over the primary cost.
    pub pathfinder_alt_cost_ratio: f64,
    /// Node expansions between cancellation checks.
    pub pathfinder_cancel_check_interval: usize,
    /// Wait budget for a compute slot before failing overloaded, seconds.
    pub overload_wait_s: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_calculations: 64,
            default_request_timeout_s: 30.0,
            route_cache_ttl_s: 1_800,
            graph_k_nearest: 8,
            graph_hub_count: 40,
            graph_knn_radius_nm: 1_500.0,
            graph_hub_radius_nm: 6_000.0,
            pathfinder_alt_cost_ratio: 1.5,
            pathfinder_cancel_check_interval: 4_096,
            overload_wait_s: 2.0,
        }
    }
}

impl PlannerConfig {
    /// Read overrides from `SEAROUTE_*` environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        read_env("SEAROUTE_MAX_CONCURRENT_CALCULATIONS", &mut config.max_concurrent_calculations);
        read_env("SEAROUTE_DEFAULT_REQUEST_TIMEOUT_S", &mut config.default_request_timeout_s);
        read_env("SEAROUTE_ROUTE_CACHE_TTL_S", &mut config.route_cache_ttl_s);
        read_env("SEAROUTE_GRAPH_K_NEAREST", &mut config.graph_k_nearest);
        read_env("SEAROUTE_GRAPH_HUB_COUNT", &mut config.graph_hub_count);
        read_env("SEAROUTE_GRAPH_KNN_RADIUS_NM", &mut config.graph_knn_radius_nm);
        read_env("SEAROUTE_GRAPH_HUB_RADIUS_NM", &mut config.graph_hub_radius_nm);
        read_env("SEAROUTE_PATHFINDER_ALT_COST_RATIO", &mut config.pathfinder_alt_cost_ratio);
        read_env(
            "SEAROUTE_PATHFINDER_CANCEL_CHECK_INTERVAL",
            &mut config.pathfinder_cancel_check_interval,
        );
        read_env("SEAROUTE_OVERLOAD_WAIT_S", &mut config.overload_wait_s);
        config
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_calculations == 0 {
            return Err(Error::validation("max_concurrent_calculations must be at least 1"));
        }
        if !(self.default_request_timeout_s > 0.0) {
            return Err(Error::validation("default_request_timeout_s must be positive"));
        }
        if self.graph_k_nearest == 0 {
            return Err(Error::validation("graph_k_nearest must be at least 1"));
        }
        if self.pathfinder_alt_cost_ratio < 1.0 {
            return Err(Error::validation("pathfinder_alt_cost_ratio must be at least 1.0"));
        }
        if self.pathfinder_cancel_check_interval == 0 {
            return Err(Error::validation("pathfinder_cancel_check_interval must be at least 1"));
        }
        if !(self.overload_wait_s >= 0.0) {
            return Err(Error::validation("overload_wait_s must be non-negative"));
        }
        Ok(())
    }

    /// Graph build options derived from this configuration.
    pub fn graph_options(&self) -> GraphOptions {
        GraphOptions {
            k_nearest: self.graph_k_nearest,
            knn_radius_nm: self.graph_knn_radius_nm,
            hub_count: self.graph_hub_count,
            hub_radius_nm: self.graph_hub_radius_nm,
            ..GraphOptions::default()
        }
    }
}

fn read_env<T: std::str::FromStr>(key: &str, slot: &mut T) {
    if let Ok(raw) = std::env::var(key) {
        if let Ok(value) = raw.parse() {
            *slot = value;
        }
    }
}
