//! Route assembly.
//!
//! Expands a graph path into a [`DetailedRoute`]: interpolated waypoints
//! per leg, port fees and stay hours at every arrival port, cumulative
//! totals, and the route quality scores.

use chrono::{DateTime, Duration, Utc};

use crate::cost::{CostModel, OptimizationCriterion};
use crate::geo::{distance_nm, initial_bearing, interpolate};
use crate::graph::{NodeId, PortGraph};
use crate::path::FoundPath;
use crate::response::{
    DetailedRoute, PortRef, RouteScores, RouteSegment, RouteTotals, SegmentMetrics,
};
use crate::vessel::VesselProfile;

/// Waypoint cap per segment, endpoints included.
const MAX_WAYPOINTS: usize = 32;

/// Nautical miles per interpolation interval before the cap kicks in.
const WAYPOINT_SPACING_NM: f64 = 250.0;

/// Assembler bound to one request's parameters.
pub struct RouteAssembler<'a> {
    graph: &'a PortGraph,
    cost_model: &'a CostModel,
    vessel: &'a VesselProfile,
    criterion: OptimizationCriterion,
    departure: Option<DateTime<Utc>>,
}

impl<'a> RouteAssembler<'a> {
    pub fn new(
        graph: &'a PortGraph,
        cost_model: &'a CostModel,
        vessel: &'a VesselProfile,
        criterion: OptimizationCriterion,
        departure: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            graph,
            cost_model,
            vessel,
            criterion,
            departure,
        }
    }

    /// Expand a found path into a detailed route.
    pub fn assemble(&self, path: &FoundPath) -> DetailedRoute {
        let mut segments = Vec::with_capacity(path.hop_count());
        let mut cumulative_distance = 0.0;
        let mut cumulative_hours = 0.0;
        let mut transit_hours = 0.0;
        let mut stay_hours = 0.0;
        let mut fuel_tons = 0.0;
        let mut fuel_cost = 0.0;
        let mut port_fees = 0.0;
        let mut canal_fees = 0.0;
        let mut risk_distance_weighted = 0.0;
        let mut normalized_cost_sum = 0.0;

        for pair in path.nodes.windows(2) {
            let (from_id, to_id) = (pair[0], pair[1]);
            let edge = self
                .graph
                .neighbours(from_id)
                .iter()
                .find(|edge| edge.to == to_id)
                .expect("assembled path uses graph edges");

            let from_port = self.graph.port(from_id);
            let to_port = self.graph.port(to_id);
            let breakdown = self.cost_model.edge_cost(edge, self.vessel);
            let arrival_fee = self.cost_model.port_fee_usd(to_port, self.vessel);
            let arrival_stay = to_port.average_port_stay_hours;

            cumulative_distance += breakdown.distance_nm;
            cumulative_hours += breakdown.time_hours + arrival_stay;
            transit_hours += breakdown.time_hours;
            stay_hours += arrival_stay;
            fuel_tons += breakdown.fuel_tons;
            fuel_cost += breakdown.fuel_cost_usd;
            port_fees += arrival_fee;
            canal_fees += breakdown.canal_fee_usd;
            risk_distance_weighted += breakdown.risk_score * breakdown.distance_nm;
            normalized_cost_sum +=
                self.cost_model
                    .normalized_cost(&breakdown, self.criterion, arrival_fee);

            segments.push(RouteSegment {
                from: PortRef {
                    code: from_port.code.clone(),
                    name: from_port.name.clone(),
                },
                to: PortRef {
                    code: to_port.code.clone(),
                    name: to_port.name.clone(),
                },
                kind: edge.kind,
                initial_bearing_deg: initial_bearing(from_port.position, to_port.position),
                waypoints: segment_waypoints(self.graph, from_id, to_id, breakdown.distance_nm),
                metrics: SegmentMetrics {
                    distance_nm: breakdown.distance_nm,
                    transit_hours: breakdown.time_hours,
                    port_stay_hours: arrival_stay,
                    fuel_tons: breakdown.fuel_tons,
                    fuel_cost_usd: breakdown.fuel_cost_usd,
                    port_fee_usd: arrival_fee,
                    canal_fee_usd: breakdown.canal_fee_usd,
                    weather_risk: edge.weather_risk,
                    piracy_risk: edge.piracy_risk,
                    political_risk: edge.political_risk,
                    risk_score: breakdown.risk_score,
                },
                cumulative_distance_nm: cumulative_distance,
                cumulative_hours,
                eta: self
                    .departure
                    .map(|at| at + Duration::seconds((cumulative_hours * 3600.0) as i64)),
            });
        }

        let weighted_risk = if cumulative_distance > 0.0 {
            risk_distance_weighted / cumulative_distance
        } else {
            0.0
        };
        let fuel_per_nm = if cumulative_distance > 0.0 {
            fuel_tons / cumulative_distance
        } else {
            0.0
        };
        let direct_distance = match (path.nodes.first(), path.nodes.last()) {
            (Some(&origin), Some(&destination)) => distance_nm(
                self.graph.port(origin).position,
                self.graph.port(destination).position,
            ),
            _ => 0.0,
        };
        let efficiency = if cumulative_distance > 0.0 {
            (100.0 * direct_distance / cumulative_distance).clamp(0.0, 100.0)
        } else {
            100.0
        };
        let mean_normalized = if segments.is_empty() {
            0.0
        } else {
            normalized_cost_sum / segments.len() as f64
        };
        let reference = self.cost_model.tables().fuel_per_nm_reference;

        let totals = RouteTotals {
            distance_nm: cumulative_distance,
            duration_hours: cumulative_hours,
            transit_hours,
            port_stay_hours: stay_hours,
            fuel_tons,
            fuel_cost_usd: fuel_cost,
            port_fees_usd: port_fees,
            canal_fees_usd: canal_fees,
            total_cost_usd: fuel_cost + port_fees + canal_fees,
        };
        let scores = RouteScores {
            efficiency,
            reliability: (100.0 - weighted_risk).clamp(0.0, 100.0),
            environmental_impact: (100.0 - fuel_per_nm / reference).clamp(0.0, 100.0),
            overall_optimization: (100.0 * (1.0 - mean_normalized)).clamp(0.0, 100.0),
            risk: weighted_risk.clamp(0.0, 100.0),
        };

        DetailedRoute {
            port_codes: path
                .nodes
                .iter()
                .map(|&node| self.graph.port(node).code.clone())
                .collect(),
            segments,
            totals,
            scores,
        }
    }
}

fn segment_waypoints(
    graph: &PortGraph,
    from: NodeId,
    to: NodeId,
    distance_nm: f64,
) -> Vec<crate::geo::Position> {
    let intervals = ((distance_nm / WAYPOINT_SPACING_NM).ceil() as usize)
        .clamp(1, MAX_WAYPOINTS - 1);
    interpolate(
        graph.port(from).position,
        graph.port(to).position,
        intervals,
    )
}
