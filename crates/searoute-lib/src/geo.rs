//! Great-circle geodesy on the WGS-84 sphere.
//!
//! Pure functions over [`Position`] values: haversine distance in nautical
//! miles, initial bearing, and great-circle interpolation for waypoint
//! expansion. The domain is total; inputs near antipodal points are handled
//! by clamping trig arguments into [-1, 1].

use serde::{Deserialize, Serialize};

/// Mean Earth radius in nautical miles.
pub const EARTH_RADIUS_NM: f64 = 3440.065;

/// Geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
}

impl Position {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// `true` when latitude and longitude are within their valid ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Great-circle distance to another position in nautical miles.
    pub fn distance_nm(&self, other: &Self) -> f64 {
        distance_nm(*self, *other)
    }
}

/// Haversine great-circle distance in nautical miles.
pub fn distance_nm(a: Position, b: Position) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_NM * h.sqrt().clamp(-1.0, 1.0).asin()
}

/// Initial bearing from `a` to `b` in degrees, normalized to [0, 360).
pub fn initial_bearing(a: Position, b: Position) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    let bearing = y.atan2(x).to_degrees();
    (bearing + 360.0) % 360.0
}

/// `n + 1` evenly spaced points along the great circle from `a` to `b`,
/// endpoints included. With `n == 0` only `a` is returned. Used for
/// waypoint expansion in assembled routes.
pub fn interpolate(a: Position, b: Position, n: usize) -> Vec<Position> {
    if n == 0 {
        return vec![a];
    }

    let lat1 = a.lat.to_radians();
    let lon1 = a.lon.to_radians();
    let lat2 = b.lat.to_radians();
    let lon2 = b.lon.to_radians();

    // Angular separation via the spherical law of cosines, clamped for
    // numerical stability near antipodal and coincident points.
    let cos_d = (lat1.sin() * lat2.sin() + lat1.cos() * lat2.cos() * (lon2 - lon1).cos())
        .clamp(-1.0, 1.0);
    let d = cos_d.acos();

    if d < 1e-12 {
        return (0..=n).map(|_| a).collect();
    }

    let sin_d = d.sin();
    (0..=n)
        .map(|i| {
            let f = i as f64 / n as f64;
            let p = ((1.0 - f) * d).sin() / sin_d;
            let q = (f * d).sin() / sin_d;

            let x = p * lat1.cos() * lon1.cos() + q * lat2.cos() * lon2.cos();
            let y = p * lat1.cos() * lon1.sin() + q * lat2.cos() * lon2.sin();
            let z = p * lat1.sin() + q * lat2.sin();

            Position {
                lat: z.atan2((x * x + y * y).sqrt()).to_degrees(),
                lon: y.atan2(x).to_degrees(),
            }
        })
        .collect()
}
