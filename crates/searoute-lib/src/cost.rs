//! Edge cost model.
//!
//! Turns a graph edge, a vessel profile, and an optimization criterion into
//! a non-negative scalar cost plus a breakdown. Port fees are charged at
//! arrival ports by the assembler; the search allocates the destination
//! port fee onto each edge for the monetary criteria so path costs and
//! assembled totals agree.

use serde::{Deserialize, Serialize};

use crate::graph::GraphEdge;
use crate::port::Port;
use crate::tables::Tables;
use crate::vessel::VesselProfile;

/// Reference speed for the cubic consumption law, in knots.
const REFERENCE_SPEED_KN: f64 = 15.0;

/// Fixed normalization scales for the balanced criterion (per edge).
const NORM_TIME_HOURS: f64 = 24.0;
const NORM_COST_USD: f64 = 100_000.0;
const NORM_RISK: f64 = 100.0;

/// Lower bound on an edge congestion multiplier, from the port invariant
/// `congestion_factor >= 0.5`.
const MIN_CONGESTION: f64 = 0.5;

/// Optimization criterion selected by the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationCriterion {
    Fastest,
    MostEconomical,
    MostReliable,
    #[default]
    Balanced,
}

impl OptimizationCriterion {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptimizationCriterion::Fastest => "fastest",
            OptimizationCriterion::MostEconomical => "most_economical",
            OptimizationCriterion::MostReliable => "most_reliable",
            OptimizationCriterion::Balanced => "balanced",
        }
    }
}

/// Per-edge cost breakdown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeCost {
    pub distance_nm: f64,
    /// Transit time including congestion and weather multipliers.
    pub time_hours: f64,
    pub fuel_tons: f64,
    pub fuel_cost_usd: f64,
    pub canal_fee_usd: f64,
    /// Blended risk score in [0, 100].
    pub risk_score: f64,
}

/// Cost model bound to a table bundle.
#[derive(Debug, Clone)]
pub struct CostModel {
    tables: std::sync::Arc<Tables>,
}

impl CostModel {
    pub fn new(tables: std::sync::Arc<Tables>) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    /// Speed actually sailed on an edge: cruise speed, capped by the edge
    /// kind's transit limit.
    pub fn effective_speed_kn(&self, edge: &GraphEdge, vessel: &VesselProfile) -> f64 {
        match self.tables.speed_cap(edge.kind) {
            Some(cap) => vessel.cruise_speed_kn.min(cap),
            None => vessel.cruise_speed_kn,
        }
    }

    /// Full breakdown for one edge.
    pub fn edge_cost(&self, edge: &GraphEdge, vessel: &VesselProfile) -> EdgeCost {
        let speed = self.effective_speed_kn(edge, vessel);
        let time_hours = edge.distance_nm / speed * edge.congestion * edge.weather_factor;

        let base_rate = self.tables.consumption.base_rate(vessel.vessel_type);
        let fuel_tons = base_rate * (speed / REFERENCE_SPEED_KN).powi(3) * (time_hours / 24.0);
        let fuel_cost_usd = fuel_tons * self.tables.fuel_prices.price(vessel.fuel_type);

        let tonnage = vessel.gross_tonnage.unwrap_or_else(|| vessel.deadweight_or_default());
        let canal_fee_usd = self.tables.canal_fee(edge.kind, tonnage);

        let risk_score = 0.5 * edge.weather_risk + 0.3 * edge.piracy_risk + 0.2 * edge.political_risk;

        EdgeCost {
            distance_nm: edge.distance_nm,
            time_hours,
            fuel_tons,
            fuel_cost_usd,
            canal_fee_usd,
            risk_score,
        }
    }

    /// Port call fee at an arrival port, scaled by the port's congestion.
    pub fn port_fee_usd(&self, port: &Port, vessel: &VesselProfile) -> f64 {
        port.congestion_factor * self.tables.port_fees.base_fee(vessel.deadweight_or_default())
    }

    /// Scalar search cost for an edge under a criterion. `arrival_fee_usd`
    /// is the port fee allocated to this edge's destination.
    pub fn scalar_cost(
        &self,
        cost: &EdgeCost,
        criterion: OptimizationCriterion,
        arrival_fee_usd: f64,
    ) -> f64 {
        let money = cost.fuel_cost_usd + cost.canal_fee_usd + arrival_fee_usd;
        match criterion {
            OptimizationCriterion::Fastest => cost.time_hours,
            OptimizationCriterion::MostEconomical => money,
            OptimizationCriterion::MostReliable => {
                cost.time_hours * (1.0 + cost.risk_score / NORM_RISK).powi(2)
            }
            OptimizationCriterion::Balanced => {
                0.4 * (cost.time_hours / NORM_TIME_HOURS)
                    + 0.35 * (money / NORM_COST_USD)
                    + 0.25 * (cost.risk_score / NORM_RISK)
            }
        }
    }

    /// Criterion cost of an edge normalized by the fixed per-edge scales,
    /// used for the overall optimization score.
    pub fn normalized_cost(
        &self,
        cost: &EdgeCost,
        criterion: OptimizationCriterion,
        arrival_fee_usd: f64,
    ) -> f64 {
        let money = cost.fuel_cost_usd + cost.canal_fee_usd + arrival_fee_usd;
        match criterion {
            OptimizationCriterion::Fastest => cost.time_hours / NORM_TIME_HOURS,
            OptimizationCriterion::MostEconomical => money / NORM_COST_USD,
            OptimizationCriterion::MostReliable => {
                cost.time_hours * (1.0 + cost.risk_score / NORM_RISK).powi(2) / NORM_TIME_HOURS
            }
            OptimizationCriterion::Balanced => {
                0.4 * (cost.time_hours / NORM_TIME_HOURS)
                    + 0.35 * (money / NORM_COST_USD)
                    + 0.25 * (cost.risk_score / NORM_RISK)
            }
        }
    }

    /// Admissible lower bound on the scalar cost per nautical mile, for the
    /// A* heuristic. Every term uses the cheapest value an edge can take:
    /// the fastest permissible speed for time, the slowest for the cubic
    /// fuel law, minimum congestion, neutral weather, zero risk and fees.
    pub fn min_cost_per_nm(&self, vessel: &VesselProfile, criterion: OptimizationCriterion) -> f64 {
        let min_weather = self
            .tables
            .weather_zones
            .iter()
            .map(|zone| zone.time_factor)
            .fold(1.0_f64, f64::min);
        let min_time_per_nm = MIN_CONGESTION * min_weather / vessel.cruise_speed_kn;

        // Slowest speed an edge can force (canal transit or cruise).
        let min_speed = vessel
            .cruise_speed_kn
            .min(self.tables.canal_speed_cap_kn)
            .min(self.tables.river_speed_cap_kn);
        let base_rate = self.tables.consumption.base_rate(vessel.vessel_type);
        let min_fuel_per_nm = base_rate * (min_speed / REFERENCE_SPEED_KN).powi(3)
            / (24.0 * min_speed)
            * MIN_CONGESTION
            * min_weather;
        let min_money_per_nm = min_fuel_per_nm * cheapest_fuel_price(&self.tables);

        match criterion {
            OptimizationCriterion::Fastest | OptimizationCriterion::MostReliable => min_time_per_nm,
            OptimizationCriterion::MostEconomical => min_money_per_nm,
            OptimizationCriterion::Balanced => {
                0.4 * (min_time_per_nm / NORM_TIME_HOURS) + 0.35 * (min_money_per_nm / NORM_COST_USD)
            }
        }
    }
}

fn cheapest_fuel_price(tables: &Tables) -> f64 {
    use crate::vessel::FuelType::*;
    [Vlsfo, Mgo, Lng, Hfo]
        .into_iter()
        .map(|fuel| tables.fuel_prices.price(fuel))
        .fold(f64::INFINITY, f64::min)
}
