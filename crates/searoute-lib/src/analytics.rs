//! Fire-and-forget analytics sink.
//!
//! The coordinator emits one event per completed request. Emission must
//! never block or fail the request path, so the trait is synchronous and
//! infallible; sinks that talk to external systems buffer internally.

use std::sync::Mutex;

use serde::Serialize;
use tracing::info;

use crate::cost::OptimizationCriterion;

/// Outcome label for an emitted calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationOutcome {
    Computed,
    CacheHit,
    NoRoute,
    Failed,
}

/// One completed calculation.
#[derive(Debug, Clone, Serialize)]
pub struct CalculationEvent {
    pub request_id: String,
    pub fingerprint: String,
    pub origin: String,
    pub destination: String,
    pub criterion: OptimizationCriterion,
    pub outcome: CalculationOutcome,
    pub duration_ms: u64,
    pub routes_returned: usize,
    pub candidates_evaluated: usize,
}

/// Fire-and-forget sink for calculation events.
pub trait AnalyticsSink: Send + Sync {
    fn emit(&self, event: CalculationEvent);
}

/// Default sink: structured log lines under the `analytics` target.
#[derive(Debug, Default)]
pub struct TracingAnalyticsSink;

impl AnalyticsSink for TracingAnalyticsSink {
    fn emit(&self, event: CalculationEvent) {
        info!(
            target: "analytics",
            request_id = %event.request_id,
            fingerprint = %event.fingerprint,
            origin = %event.origin,
            destination = %event.destination,
            criterion = event.criterion.as_str(),
            outcome = ?event.outcome,
            duration_ms = event.duration_ms,
            routes = event.routes_returned,
            candidates = event.candidates_evaluated,
            "route calculation completed"
        );
    }
}

/// Collecting sink for tests and instrumentation.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<CalculationEvent>>,
}

impl CollectingSink {
    pub fn events(&self) -> Vec<CalculationEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl AnalyticsSink for CollectingSink {
    fn emit(&self, event: CalculationEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    }
}
