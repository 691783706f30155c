//! Vessel constraints submitted with a calculation request.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Broad vessel classification used for consumption base rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VesselType {
    Container,
    Tanker,
    Bulk,
    GeneralCargo,
    RoRo,
    Lng,
}

/// Marine fuel grade burned by the vessel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FuelType {
    Vlsfo,
    Mgo,
    Lng,
    Hfo,
}

impl FuelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FuelType::Vlsfo => "vlsfo",
            FuelType::Mgo => "mgo",
            FuelType::Lng => "lng",
            FuelType::Hfo => "hfo",
        }
    }
}

/// Physical and operational constraints of the vessel being routed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VesselProfile {
    pub vessel_type: VesselType,
    pub length_m: f64,
    pub beam_m: f64,
    pub draft_m: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadweight_tonnage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gross_tonnage: Option<f64>,
    /// Service speed in knots.
    pub cruise_speed_kn: f64,
    /// Design maximum speed in knots.
    pub max_speed_kn: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_range_nm: Option<f64>,
    pub fuel_type: FuelType,
    #[serde(default)]
    pub suez_canal_compatible: bool,
    #[serde(default)]
    pub panama_canal_compatible: bool,
}

impl VesselProfile {
    /// Validate the profile invariants: positive dimensions, `beam <= length`,
    /// and `1 <= cruise <= max <= 40` knots.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("length_m", self.length_m),
            ("beam_m", self.beam_m),
            ("draft_m", self.draft_m),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::validation(format!(
                    "vessel {name} must be strictly positive, got {value}"
                )));
            }
        }
        if self.beam_m > self.length_m {
            return Err(Error::validation(format!(
                "vessel beam ({} m) exceeds length ({} m)",
                self.beam_m, self.length_m
            )));
        }
        if !self.cruise_speed_kn.is_finite() || !self.max_speed_kn.is_finite() {
            return Err(Error::validation("vessel speeds must be finite"));
        }
        if self.cruise_speed_kn < 1.0
            || self.cruise_speed_kn > self.max_speed_kn
            || self.max_speed_kn > 40.0
        {
            return Err(Error::validation(format!(
                "vessel speeds must satisfy 1 <= cruise ({}) <= max ({}) <= 40 kn",
                self.cruise_speed_kn, self.max_speed_kn
            )));
        }
        for (name, value) in [
            ("deadweight_tonnage", self.deadweight_tonnage),
            ("gross_tonnage", self.gross_tonnage),
            ("max_range_nm", self.max_range_nm),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || v <= 0.0 {
                    return Err(Error::validation(format!(
                        "vessel {name} must be strictly positive, got {v}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Deadweight tonnage with the fee-basis fallback applied.
    pub fn deadweight_or_default(&self) -> f64 {
        self.deadweight_tonnage.unwrap_or(30_000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn container_vessel() -> VesselProfile {
        VesselProfile {
            vessel_type: VesselType::Container,
            length_m: 300.0,
            beam_m: 45.0,
            draft_m: 14.0,
            deadweight_tonnage: Some(120_000.0),
            gross_tonnage: Some(140_000.0),
            cruise_speed_kn: 18.0,
            max_speed_kn: 24.0,
            max_range_nm: Some(20_000.0),
            fuel_type: FuelType::Vlsfo,
            suez_canal_compatible: true,
            panama_canal_compatible: true,
        }
    }

    #[test]
    fn valid_profile_passes() {
        assert!(container_vessel().validate().is_ok());
    }

    #[test]
    fn beam_wider_than_length_rejected() {
        let mut vessel = container_vessel();
        vessel.beam_m = 400.0;
        assert!(vessel.validate().is_err());
    }

    #[test]
    fn cruise_above_max_rejected() {
        let mut vessel = container_vessel();
        vessel.cruise_speed_kn = 25.0;
        vessel.max_speed_kn = 24.0;
        assert!(vessel.validate().is_err());
    }

    #[test]
    fn max_speed_cap_enforced() {
        let mut vessel = container_vessel();
        vessel.max_speed_kn = 45.0;
        assert!(vessel.validate().is_err());
    }

    #[test]
    fn zero_draft_rejected() {
        let mut vessel = container_vessel();
        vessel.draft_m = 0.0;
        assert!(vessel.validate().is_err());
    }

    #[test]
    fn deadweight_fallback() {
        let mut vessel = container_vessel();
        vessel.deadweight_tonnage = None;
        assert_eq!(vessel.deadweight_or_default(), 30_000.0);
    }

    #[test]
    fn fuel_type_serde_is_lowercase() {
        let json = serde_json::to_string(&FuelType::Vlsfo).unwrap();
        assert_eq!(json, "\"vlsfo\"");
        let parsed: FuelType = serde_json::from_str("\"lng\"").unwrap();
        assert_eq!(parsed, FuelType::Lng);
    }
}
