//! Tariff and risk tables.
//!
//! Fuel prices, consumption base rates, canal and port fee schedules,
//! weather zones, and the country-pair risk matrix are configuration
//! inputs, not hard-coded constants. Embedded defaults cover the common
//! case; deployments override them with a JSON data file, and the risk
//! matrix can additionally be loaded from CSV.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use geo::{coord, Contains, Point, Rect};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geo::Position;
use crate::graph::EdgeKind;
use crate::vessel::{FuelType, VesselType};

/// Fuel price table in USD per ton.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuelPrices(HashMap<FuelType, f64>);

impl Default for FuelPrices {
    fn default() -> Self {
        Self(HashMap::from([
            (FuelType::Vlsfo, 580.0),
            (FuelType::Mgo, 720.0),
            (FuelType::Lng, 460.0),
            (FuelType::Hfo, 450.0),
        ]))
    }
}

impl FuelPrices {
    /// USD per ton for the given grade.
    pub fn price(&self, fuel: FuelType) -> f64 {
        self.0.get(&fuel).copied().unwrap_or(550.0)
    }
}

/// Base fuel consumption in tons per day at the 15 kn reference speed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumptionRates(HashMap<VesselType, f64>);

impl Default for ConsumptionRates {
    fn default() -> Self {
        Self(HashMap::from([
            (VesselType::Container, 150.0),
            (VesselType::Tanker, 80.0),
            (VesselType::Bulk, 45.0),
            (VesselType::GeneralCargo, 25.0),
        ]))
    }
}

impl ConsumptionRates {
    /// Tons per day at 15 kn; vessel classes without an entry use 50.
    pub fn base_rate(&self, vessel_type: VesselType) -> f64 {
        self.0.get(&vessel_type).copied().unwrap_or(50.0)
    }
}

/// Tonnage-based canal toll schedule.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CanalFeeSchedule {
    pub per_ton_usd: f64,
    pub minimum_usd: f64,
}

impl CanalFeeSchedule {
    pub fn fee(&self, tonnage: f64) -> f64 {
        (self.per_ton_usd * tonnage).max(self.minimum_usd)
    }
}

/// Port call fee basis, charged per deadweight ton and scaled by the
/// port's congestion factor at assembly time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PortFeeSchedule {
    pub per_dwt_usd: f64,
    pub minimum_usd: f64,
}

impl PortFeeSchedule {
    pub fn base_fee(&self, deadweight_tonnage: f64) -> f64 {
        (self.per_dwt_usd * deadweight_tonnage).max(self.minimum_usd)
    }
}

impl Default for PortFeeSchedule {
    fn default() -> Self {
        Self {
            per_dwt_usd: 0.35,
            minimum_usd: 5_000.0,
        }
    }
}

/// Rectangular weather zone with a transit-time multiplier and a 0-100
/// weather risk score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherZone {
    pub name: String,
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
    pub time_factor: f64,
    pub risk_score: f64,
}

impl WeatherZone {
    fn contains(&self, position: Position) -> bool {
        let rect = Rect::new(
            coord! { x: self.min_lon, y: self.min_lat },
            coord! { x: self.max_lon, y: self.max_lat },
        );
        rect.contains(&Point::new(position.lon, position.lat))
    }
}

/// Piracy and political risk scores for a country pair, both in [0, 100].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RiskScores {
    pub piracy: f64,
    pub political: f64,
}

/// Country-pair risk matrix keyed by ISO country codes; `*` is a wildcard
/// matching any country.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RiskMatrix {
    entries: HashMap<String, RiskScores>,
}

impl RiskMatrix {
    fn key(from: &str, to: &str) -> String {
        format!("{from}:{to}")
    }

    pub fn insert(&mut self, from: &str, to: &str, scores: RiskScores) {
        self.entries.insert(Self::key(from, to), scores);
    }

    /// Risk for a leg between two countries. Lookup order: exact pair,
    /// from-wildcard, to-wildcard, global wildcard; pairs are symmetric.
    pub fn lookup(&self, from: &str, to: &str) -> RiskScores {
        let candidates = [
            Self::key(from, to),
            Self::key(to, from),
            Self::key(from, "*"),
            Self::key(to, "*"),
            Self::key("*", from),
            Self::key("*", to),
            Self::key("*", "*"),
        ];
        for key in candidates {
            if let Some(scores) = self.entries.get(&key) {
                return *scores;
            }
        }
        RiskScores::default()
    }

    /// Load the matrix from a CSV file with `from,to,piracy,political` rows.
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path).map_err(|e| Error::TableLoad {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let mut matrix = Self::default();
        for record in reader.records() {
            let record = record.map_err(|e| Error::TableLoad {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
            if record.len() < 4 {
                return Err(Error::TableLoad {
                    path: path.display().to_string(),
                    message: format!("expected 4 columns, got {}", record.len()),
                });
            }
            let parse = |field: &str| -> Result<f64> {
                field.trim().parse::<f64>().map_err(|e| Error::TableLoad {
                    path: path.display().to_string(),
                    message: format!("bad risk score {field:?}: {e}"),
                })
            };
            matrix.insert(
                record[0].trim(),
                record[1].trim(),
                RiskScores {
                    piracy: parse(&record[2])?.clamp(0.0, 100.0),
                    political: parse(&record[3])?.clamp(0.0, 100.0),
                },
            );
        }
        Ok(matrix)
    }
}

/// Bundle of every tariff and risk table the planner consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tables {
    pub fuel_prices: FuelPrices,
    pub consumption: ConsumptionRates,
    pub suez_fees: CanalFeeSchedule,
    pub panama_fees: CanalFeeSchedule,
    pub port_fees: PortFeeSchedule,
    pub weather_zones: Vec<WeatherZone>,
    pub risk: RiskMatrix,
    /// Fuel-per-nm basis for the environmental impact score: one score
    /// point per this many tons burned per nautical mile.
    pub fuel_per_nm_reference: f64,
    /// Transit speed cap through canals in knots.
    pub canal_speed_cap_kn: f64,
    /// Transit speed cap on river legs in knots.
    pub river_speed_cap_kn: f64,
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            fuel_prices: FuelPrices::default(),
            consumption: ConsumptionRates::default(),
            suez_fees: CanalFeeSchedule {
                per_ton_usd: 2.2,
                minimum_usd: 150_000.0,
            },
            panama_fees: CanalFeeSchedule {
                per_ton_usd: 1.8,
                minimum_usd: 80_000.0,
            },
            port_fees: PortFeeSchedule::default(),
            weather_zones: vec![
                WeatherZone {
                    name: "north-atlantic-winter".to_string(),
                    min_lat: 40.0,
                    max_lat: 65.0,
                    min_lon: -60.0,
                    max_lon: -5.0,
                    time_factor: 1.12,
                    risk_score: 35.0,
                },
                WeatherZone {
                    name: "indian-monsoon".to_string(),
                    min_lat: -10.0,
                    max_lat: 25.0,
                    min_lon: 55.0,
                    max_lon: 95.0,
                    time_factor: 1.08,
                    risk_score: 28.0,
                },
            ],
            risk: default_risk_matrix(),
            fuel_per_nm_reference: 0.01,
            canal_speed_cap_kn: 8.0,
            river_speed_cap_kn: 10.0,
        }
    }
}

fn default_risk_matrix() -> RiskMatrix {
    let mut matrix = RiskMatrix::default();
    // Gulf of Aden and West African approaches carry elevated piracy risk.
    matrix.insert("DJ", "*", RiskScores { piracy: 55.0, political: 30.0 });
    matrix.insert("SO", "*", RiskScores { piracy: 70.0, political: 45.0 });
    matrix.insert("NG", "*", RiskScores { piracy: 60.0, political: 35.0 });
    matrix.insert("EG", "*", RiskScores { piracy: 25.0, political: 20.0 });
    matrix.insert("*", "*", RiskScores { piracy: 8.0, political: 10.0 });
    matrix
}

static DEFAULT_TABLES: Lazy<Arc<Tables>> = Lazy::new(|| Arc::new(Tables::default()));

impl Tables {
    /// Shared handle to the embedded default tables. Constructed once;
    /// callers that need overrides build their own bundle instead.
    pub fn shared_default() -> Arc<Tables> {
        DEFAULT_TABLES.clone()
    }

    /// Load a full table bundle from a JSON file; absent fields fall back
    /// to the embedded defaults.
    pub fn from_json_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|e| Error::TableLoad {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Weather factor and risk score at a leg midpoint. The first matching
    /// zone wins; open water outside all zones is neutral.
    pub fn weather_at(&self, position: Position) -> (f64, f64) {
        self.weather_zones
            .iter()
            .find(|zone| zone.contains(position))
            .map(|zone| (zone.time_factor, zone.risk_score))
            .unwrap_or((1.0, 0.0))
    }

    /// Speed cap for an edge kind, if any.
    pub fn speed_cap(&self, kind: EdgeKind) -> Option<f64> {
        match kind {
            EdgeKind::CanalSuez | EdgeKind::CanalPanama => Some(self.canal_speed_cap_kn),
            EdgeKind::River => Some(self.river_speed_cap_kn),
            EdgeKind::OpenSea | EdgeKind::Coastal => None,
        }
    }

    /// Canal toll for an edge kind, zero for non-canal legs.
    pub fn canal_fee(&self, kind: EdgeKind, tonnage: f64) -> f64 {
        match kind {
            EdgeKind::CanalSuez => self.suez_fees.fee(tonnage),
            EdgeKind::CanalPanama => self.panama_fees.fee(tonnage),
            _ => 0.0,
        }
    }
}
