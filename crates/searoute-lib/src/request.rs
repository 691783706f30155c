//! Route calculation request model and validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cost::OptimizationCriterion;
use crate::error::{Error, Result};
use crate::port::is_valid_locode;
use crate::vessel::VesselProfile;

/// Hard cap on requested alternatives.
pub const MAX_ALTERNATIVES: usize = 10;
/// Hard cap on connecting ports.
pub const MAX_CONNECTING_PORTS: usize = 8;

/// A route calculation request as received on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteCalculationRequest {
    /// Origin port UN/LOCODE.
    pub origin: String,
    /// Destination port UN/LOCODE.
    pub destination: String,
    pub vessel: VesselProfile,
    #[serde(default)]
    pub optimization: OptimizationCriterion,
    #[serde(default = "default_max_alternatives")]
    pub max_alternative_routes: usize,
    #[serde(default = "default_max_connecting_ports")]
    pub max_connecting_ports: usize,
    /// Planned departure; bucketed to the hour for fingerprinting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_time: Option<DateTime<Utc>>,
    /// Per-request timeout in seconds, capped by the service default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_s: Option<f64>,
}

fn default_max_alternatives() -> usize {
    3
}

fn default_max_connecting_ports() -> usize {
    2
}

impl RouteCalculationRequest {
    /// Validate everything checkable without the catalog: code syntax,
    /// distinct endpoints, vessel invariants, and the hard caps.
    pub fn validate(&self) -> Result<()> {
        if !is_valid_locode(&self.origin) {
            return Err(Error::validation(format!(
                "origin {:?} is not a 5-letter UN/LOCODE",
                self.origin
            )));
        }
        if !is_valid_locode(&self.destination) {
            return Err(Error::validation(format!(
                "destination {:?} is not a 5-letter UN/LOCODE",
                self.destination
            )));
        }
        if self.origin == self.destination {
            return Err(Error::validation(
                "origin and destination must be distinct ports",
            ));
        }
        self.vessel.validate()?;
        if self.max_alternative_routes > MAX_ALTERNATIVES {
            return Err(Error::validation(format!(
                "max_alternative_routes {} exceeds the cap of {MAX_ALTERNATIVES}",
                self.max_alternative_routes
            )));
        }
        if self.max_connecting_ports > MAX_CONNECTING_PORTS {
            return Err(Error::validation(format!(
                "max_connecting_ports {} exceeds the cap of {MAX_CONNECTING_PORTS}",
                self.max_connecting_ports
            )));
        }
        if let Some(timeout) = self.timeout_s {
            if !timeout.is_finite() || timeout < 0.0 {
                return Err(Error::validation(format!(
                    "timeout_s must be a non-negative number, got {timeout}"
                )));
            }
        }
        Ok(())
    }
}
