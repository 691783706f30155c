//! Shared infrastructure for the searoute HTTP service.
//!
//! This crate provides the HTTP glue around `searoute-lib`:
//!
//! - [`AppState`]: coordinator, repository, and config behind one handle
//! - [`ErrorEnvelope`]: the service's error response contract
//! - [`logging`]: structured JSON logging setup
//! - [`metrics`]: Prometheus metrics infrastructure
//! - [`middleware`]: request tracking and metrics middleware
//! - Health probe handlers
//!
//! # Architecture
//!
//! Handlers stay thin: parse the request, call the coordinator or
//! repository, format the response. All business logic lives in
//! `searoute-lib`.

#![deny(warnings)]

mod envelope;
mod health;
pub mod logging;
pub mod metrics;
pub mod middleware;
mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use envelope::{envelope_for_error, ErrorEnvelope};
pub use health::{health, health_live, health_ready, HealthStatus};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use metrics::{
    init_metrics, metrics_handler, record_alternatives_returned, record_cache_outcome,
    record_route_calculated, record_route_distance, record_route_failed, MetricsConfig,
    MetricsError,
};
pub use middleware::{extract_or_generate_request_id, MetricsLayer, RequestId};
pub use state::AppState;
