//! Route response wire types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cost::OptimizationCriterion;
use crate::geo::Position;
use crate::graph::EdgeKind;

/// Port identity carried on segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortRef {
    pub code: String,
    pub name: String,
}

/// Per-segment metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentMetrics {
    pub distance_nm: f64,
    /// Sailing time for the leg, including congestion and weather factors.
    pub transit_hours: f64,
    /// Stay at the arrival port, zero only when the port publishes none.
    pub port_stay_hours: f64,
    pub fuel_tons: f64,
    pub fuel_cost_usd: f64,
    /// Fee charged at the arrival port.
    pub port_fee_usd: f64,
    pub canal_fee_usd: f64,
    pub weather_risk: f64,
    pub piracy_risk: f64,
    pub political_risk: f64,
    /// Blended risk score in [0, 100].
    pub risk_score: f64,
}

/// One leg of a detailed route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSegment {
    pub from: PortRef,
    pub to: PortRef,
    pub kind: EdgeKind,
    /// Course at departure along the great circle, degrees in [0, 360).
    pub initial_bearing_deg: f64,
    /// Great-circle waypoints, at most 32 per segment, endpoints included.
    pub waypoints: Vec<Position>,
    pub metrics: SegmentMetrics,
    pub cumulative_distance_nm: f64,
    pub cumulative_hours: f64,
    /// Estimated arrival, present when the request carried a departure time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eta: Option<DateTime<Utc>>,
}

/// Aggregated route totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteTotals {
    pub distance_nm: f64,
    /// Total elapsed time including port stays.
    pub duration_hours: f64,
    /// Sailing time only.
    pub transit_hours: f64,
    pub port_stay_hours: f64,
    pub fuel_tons: f64,
    pub fuel_cost_usd: f64,
    pub port_fees_usd: f64,
    pub canal_fees_usd: f64,
    pub total_cost_usd: f64,
}

/// Route quality scores, all in [0, 100].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteScores {
    pub efficiency: f64,
    pub reliability: f64,
    pub environmental_impact: f64,
    pub overall_optimization: f64,
    pub risk: f64,
}

/// A fully expanded route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedRoute {
    /// Ordered UN/LOCODEs from origin to destination.
    pub port_codes: Vec<String>,
    pub segments: Vec<RouteSegment>,
    pub totals: RouteTotals,
    pub scores: RouteScores,
}

impl DetailedRoute {
    pub fn intermediate_count(&self) -> usize {
        self.port_codes.len().saturating_sub(2)
    }
}

/// Response for a calculation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResponse {
    pub request_id: String,
    pub generated_at: DateTime<Utc>,
    pub calculation_ms: u64,
    /// `None` when no feasible route exists; see `diagnostics`.
    pub primary_route: Option<DetailedRoute>,
    pub alternatives: Vec<DetailedRoute>,
    pub algorithm: String,
    pub criterion: OptimizationCriterion,
    pub candidates_evaluated: usize,
    pub cache_hit: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<String>,
}
