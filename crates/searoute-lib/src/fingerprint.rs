//! Canonical request fingerprinting.
//!
//! Two requests with the same fingerprint must yield identical responses
//! modulo timestamps, so the fingerprint is the cache key and the
//! single-flight identity. The canonical bytestring uses a fixed field
//! order over the routing-relevant inputs: endpoint codes, vessel
//! dimensions rounded to 0.5 m, speeds rounded to 0.5 kn, fuel grade,
//! canal flags, criterion, the result-shaping caps, and the departure time
//! bucketed to the hour. JSON field order on the wire cannot affect it.

use sha2::{Digest, Sha256};
use std::fmt;

use crate::request::RouteCalculationRequest;

/// Hex-encoded SHA-256 fingerprint of a calculation request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute the fingerprint for a request.
    pub fn of(request: &RouteCalculationRequest) -> Self {
        let vessel = &request.vessel;
        let canonical = format!(
            "origin={}|destination={}|len={:.1}|beam={:.1}|draft={:.1}|cruise={:.1}|max={:.1}|fuel={}|suez={}|panama={}|criterion={}|alts={}|hops={}|departure={}",
            request.origin,
            request.destination,
            round_half(vessel.length_m),
            round_half(vessel.beam_m),
            round_half(vessel.draft_m),
            round_half(vessel.cruise_speed_kn),
            round_half(vessel.max_speed_kn),
            vessel.fuel_type.as_str(),
            vessel.suez_canal_compatible,
            vessel.panama_canal_compatible,
            request.optimization.as_str(),
            request.max_alternative_routes,
            request.max_connecting_ports,
            departure_bucket(request),
        );

        let digest = Sha256::digest(canonical.as_bytes());
        Fingerprint(hex::encode(digest))
    }

    pub fn as_hex(&self) -> &str {
        &self.0
    }

    /// Cache key for route responses.
    pub fn route_cache_key(&self) -> String {
        format!("routes:v1:{}", self.0)
    }

    /// Cache key for validation results.
    pub fn validation_cache_key(&self) -> String {
        format!("validate:v1:{}", self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Round to the nearest 0.5.
fn round_half(value: f64) -> f64 {
    (value * 2.0).round() / 2.0
}

fn departure_bucket(request: &RouteCalculationRequest) -> String {
    match request.departure_time {
        Some(at) => (at.timestamp().div_euclid(3600)).to_string(),
        None => "none".to_string(),
    }
}
