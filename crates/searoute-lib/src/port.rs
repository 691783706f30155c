//! Port catalog records.
//!
//! A [`Port`] is a read-only value produced by catalog ingestion. The core
//! never mutates ports; catalog changes arrive as a new catalog version and
//! invalidate the materialized graph.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geo::Position;

/// Cargo specialization of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortType {
    Container,
    Bulk,
    Tanker,
    Multipurpose,
    Passenger,
    Fishing,
}

/// Operational status of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortStatus {
    Active,
    Restricted,
    Maintenance,
    Inactive,
}

impl PortStatus {
    /// Ports in `active` or `restricted` status accept traffic.
    pub fn accepts_traffic(&self) -> bool {
        matches!(self, PortStatus::Active | PortStatus::Restricted)
    }
}

/// Ocean basin a port fronts onto.
///
/// Generic graph legs are only wired between basins connected by open
/// water; the Red Sea/Mediterranean and Pacific/North Atlantic pairs are
/// bridged exclusively by their canal edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeaArea {
    Pacific,
    Indian,
    RedSea,
    Mediterranean,
    BlackSea,
    NorthAtlantic,
    SouthAtlantic,
    Baltic,
}

impl SeaArea {
    /// `true` when two basins share open water (no canal required).
    ///
    /// The Bosphorus and the Skagerrak are open straits, so the Black Sea
    /// and the Baltic connect without a compatibility flag; the curated
    /// Bosphorus and Kiel edges are shortcuts, not exclusive bridges.
    pub fn open_to(self, other: SeaArea) -> bool {
        use SeaArea::*;
        if self == other {
            return true;
        }
        let pair = if self < other { (self, other) } else { (other, self) };
        matches!(
            pair,
            (Pacific, Indian)
                | (Indian, RedSea)
                | (Indian, SouthAtlantic)
                | (NorthAtlantic, SouthAtlantic)
                | (Mediterranean, NorthAtlantic)
                | (Mediterranean, BlackSea)
                | (NorthAtlantic, Baltic)
        )
    }
}

/// Canal gateways a port serves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanalAccess {
    #[serde(default)]
    pub suez: bool,
    #[serde(default)]
    pub panama: bool,
}

/// Maximum vessel dimensions a port accepts, in meters. Absent fields mean
/// the port publishes no limit for that dimension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VesselLimits {
    pub max_length_m: Option<f64>,
    pub max_beam_m: Option<f64>,
    pub max_draft_m: Option<f64>,
}

impl VesselLimits {
    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("max_length_m", self.max_length_m),
            ("max_beam_m", self.max_beam_m),
            ("max_draft_m", self.max_draft_m),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || v <= 0.0 {
                    return Err(Error::PortDataValidation {
                        message: format!("{name} must be strictly positive, got {v}"),
                    });
                }
            }
        }
        Ok(())
    }
}

/// A port catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    /// 5-character UN/LOCODE, unique within the catalog.
    pub code: String,
    pub name: String,
    /// ISO 3166-1 alpha-2 country code.
    pub country: String,
    pub position: Position,
    pub port_type: PortType,
    pub status: PortStatus,
    pub sea_area: SeaArea,
    #[serde(default)]
    pub limits: VesselLimits,
    pub berth_count: u32,
    /// Congestion multiplier in [0.5, 3.0].
    pub congestion_factor: f64,
    /// Average call duration in hours.
    pub average_port_stay_hours: f64,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub canal_access: CanalAccess,
}

impl Port {
    /// Validate catalog invariants for this entry.
    pub fn validate(&self) -> Result<()> {
        if !is_valid_locode(&self.code) {
            return Err(Error::PortDataValidation {
                message: format!("port code {:?} is not a 5-letter UN/LOCODE", self.code),
            });
        }
        if self.name.trim().is_empty() {
            return Err(Error::PortDataValidation {
                message: format!("port {} has an empty name", self.code),
            });
        }
        if !self.position.is_valid() {
            return Err(Error::PortDataValidation {
                message: format!(
                    "port {} has coordinates out of range: ({}, {})",
                    self.code, self.position.lat, self.position.lon
                ),
            });
        }
        if !(0.5..=3.0).contains(&self.congestion_factor) {
            return Err(Error::PortDataValidation {
                message: format!(
                    "port {} congestion_factor {} outside [0.5, 3.0]",
                    self.code, self.congestion_factor
                ),
            });
        }
        if !self.average_port_stay_hours.is_finite() || self.average_port_stay_hours < 0.0 {
            return Err(Error::PortDataValidation {
                message: format!("port {} has a negative average stay", self.code),
            });
        }
        self.limits.validate()
    }

    /// Hub candidates are large container or multipurpose ports.
    pub fn is_hub_candidate(&self) -> bool {
        matches!(self.port_type, PortType::Container | PortType::Multipurpose)
    }
}

/// `true` for a syntactically valid 5-letter UN/LOCODE.
pub fn is_valid_locode(code: &str) -> bool {
    code.len() == 5 && code.bytes().all(|b| b.is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn sample_port(code: &str) -> Port {
        Port {
            code: code.to_string(),
            name: "Test Harbor".to_string(),
            country: "SG".to_string(),
            position: Position::new(1.2644, 103.84),
            port_type: PortType::Container,
            status: PortStatus::Active,
            sea_area: SeaArea::Indian,
            limits: VesselLimits {
                max_length_m: Some(400.0),
                max_beam_m: Some(60.0),
                max_draft_m: Some(16.0),
            },
            berth_count: 50,
            congestion_factor: 1.0,
            average_port_stay_hours: 18.0,
            services: vec!["bunkering".to_string()],
            canal_access: CanalAccess::default(),
        }
    }

    #[test]
    fn valid_port_passes_validation() {
        assert!(sample_port("SGSIN").validate().is_ok());
    }

    #[test]
    fn locode_syntax() {
        assert!(is_valid_locode("NLRTM"));
        assert!(!is_valid_locode("nlrtm"));
        assert!(!is_valid_locode("NLRT"));
        assert!(!is_valid_locode("NLRTM1"));
        assert!(!is_valid_locode("NLR M"));
    }

    #[test]
    fn rejects_out_of_range_latitude() {
        let mut port = sample_port("SGSIN");
        port.position.lat = 91.0;
        assert!(port.validate().is_err());
    }

    #[test]
    fn rejects_congestion_out_of_band() {
        let mut port = sample_port("SGSIN");
        port.congestion_factor = 3.5;
        assert!(port.validate().is_err());
    }

    #[test]
    fn rejects_non_positive_draft_limit() {
        let mut port = sample_port("SGSIN");
        port.limits.max_draft_m = Some(0.0);
        assert!(port.validate().is_err());
    }

    #[test]
    fn status_traffic_acceptance() {
        assert!(PortStatus::Active.accepts_traffic());
        assert!(PortStatus::Restricted.accepts_traffic());
        assert!(!PortStatus::Maintenance.accepts_traffic());
        assert!(!PortStatus::Inactive.accepts_traffic());
    }

    #[test]
    fn sea_area_open_water_pairs() {
        assert!(SeaArea::Indian.open_to(SeaArea::RedSea));
        assert!(SeaArea::Pacific.open_to(SeaArea::Indian));
        assert!(SeaArea::NorthAtlantic.open_to(SeaArea::Mediterranean));
        // Canal-only pairs are closed to generic legs.
        assert!(!SeaArea::RedSea.open_to(SeaArea::Mediterranean));
        assert!(!SeaArea::Pacific.open_to(SeaArea::NorthAtlantic));
        assert!(!SeaArea::Indian.open_to(SeaArea::NorthAtlantic));
    }
}
