//! Static R-tree spatial index over port coordinates.
//!
//! The index is built once from a catalog snapshot with STR bulk loading
//! and is immutable afterwards; catalog changes produce a new index that is
//! swapped in atomically by the owner. It backs the repository's radius
//! search and the graph builder's k-NN queries.
//!
//! Ports are indexed as 3-D Cartesian points on the Earth sphere so that
//! Euclidean (chord) proximity agrees with great-circle proximity: the
//! chord length is a strictly monotonic function of arc distance, which
//! makes k-NN ordering exact and lets radius queries run against a
//! converted chord radius.

use std::collections::HashMap;
use std::sync::Arc;

use rstar::primitives::GeomWithData;
use rstar::RTree;

use crate::catalog::PortCatalog;
use crate::geo::{Position, EARTH_RADIUS_NM};
use crate::port::Port;

type IndexedPoint = GeomWithData<[f64; 3], u32>;

/// Query parameters for nearest-neighbour searches.
#[derive(Debug, Clone, Default)]
pub struct NeighbourQuery {
    /// Maximum number of results to return.
    pub k: usize,
    /// Optional great-circle radius cap in nautical miles.
    pub radius_nm: Option<f64>,
}

impl NeighbourQuery {
    /// A simple k-nearest query without a radius cap.
    pub fn nearest(k: usize) -> Self {
        Self { k, radius_nm: None }
    }

    /// A k-nearest query bounded by a radius in nautical miles.
    pub fn within_radius(k: usize, radius_nm: f64) -> Self {
        Self {
            k,
            radius_nm: Some(radius_nm),
        }
    }
}

/// A port together with its great-circle distance from the query point.
#[derive(Debug, Clone)]
pub struct PortDistance {
    pub port: Arc<Port>,
    pub distance_nm: f64,
}

/// Immutable spatial index over a catalog snapshot.
pub struct SpatialPortIndex {
    tree: RTree<IndexedPoint>,
    ports: Vec<Arc<Port>>,
    by_code: HashMap<String, u32>,
    catalog_version: u64,
}

impl std::fmt::Debug for SpatialPortIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialPortIndex")
            .field("ports", &self.ports.len())
            .field("catalog_version", &self.catalog_version)
            .finish()
    }
}

impl SpatialPortIndex {
    /// Bulk-load the index from a catalog snapshot.
    ///
    /// Ports are inserted in UN/LOCODE order so equal-distance results tie
    /// break deterministically.
    pub fn build(catalog: &PortCatalog) -> Self {
        let ports = catalog.sorted_ports();
        let mut by_code = HashMap::with_capacity(ports.len());
        let mut points = Vec::with_capacity(ports.len());

        for (idx, port) in ports.iter().enumerate() {
            let idx = idx as u32;
            by_code.insert(port.code.clone(), idx);
            points.push(IndexedPoint::new(cartesian(port.position), idx));
        }

        Self {
            tree: RTree::bulk_load(points),
            ports,
            by_code,
            catalog_version: catalog.version(),
        }
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    /// Catalog version this index was built from.
    pub fn catalog_version(&self) -> u64 {
        self.catalog_version
    }

    /// Lookup a port by exact UN/LOCODE.
    pub fn by_code(&self, code: &str) -> Option<&Arc<Port>> {
        self.by_code.get(code).map(|&idx| &self.ports[idx as usize])
    }

    /// Nearest ports to `origin`, ascending by great-circle distance.
    ///
    /// The query point itself (distance 0 to an indexed port) is included;
    /// callers excluding the anchor port filter it by code.
    pub fn nearest(&self, origin: Position, query: &NeighbourQuery) -> Vec<PortDistance> {
        if query.k == 0 {
            return Vec::new();
        }
        let center = cartesian(origin);
        let chord_cap_sq = query.radius_nm.map(|r| chord_for_arc(r).powi(2));

        let mut results = Vec::with_capacity(query.k);
        for (point, chord_sq) in self.tree.nearest_neighbor_iter_with_distance_2(&center) {
            if let Some(cap) = chord_cap_sq {
                if chord_sq > cap {
                    break;
                }
            }
            let port = self.ports[point.data as usize].clone();
            results.push(PortDistance {
                port,
                distance_nm: arc_for_chord(chord_sq.sqrt()),
            });
            if results.len() == query.k {
                break;
            }
        }
        results
    }

    /// Ports within `radius_nm` of `origin`, ascending by distance, capped
    /// at `limit` results.
    pub fn within_radius(&self, origin: Position, radius_nm: f64, limit: usize) -> Vec<PortDistance> {
        self.nearest(origin, &NeighbourQuery::within_radius(limit, radius_nm))
    }
}

/// Project a geographic position onto the Earth sphere.
fn cartesian(position: Position) -> [f64; 3] {
    let lat = position.lat.to_radians();
    let lon = position.lon.to_radians();
    [
        EARTH_RADIUS_NM * lat.cos() * lon.cos(),
        EARTH_RADIUS_NM * lat.cos() * lon.sin(),
        EARTH_RADIUS_NM * lat.sin(),
    ]
}

/// Chord length subtending a great-circle arc of `arc_nm`.
fn chord_for_arc(arc_nm: f64) -> f64 {
    2.0 * EARTH_RADIUS_NM * (arc_nm / (2.0 * EARTH_RADIUS_NM)).sin()
}

/// Great-circle arc length for a chord of `chord_nm`.
fn arc_for_chord(chord_nm: f64) -> f64 {
    2.0 * EARTH_RADIUS_NM * (chord_nm / (2.0 * EARTH_RADIUS_NM)).clamp(-1.0, 1.0).asin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::distance_nm;
    use crate::port::{CanalAccess, PortStatus, PortType, SeaArea, VesselLimits};

    fn port(code: &str, lat: f64, lon: f64) -> Port {
        Port {
            code: code.to_string(),
            name: code.to_string(),
            country: code[..2].to_string(),
            position: Position::new(lat, lon),
            port_type: PortType::Container,
            status: PortStatus::Active,
            sea_area: SeaArea::Indian,
            limits: VesselLimits::default(),
            berth_count: 10,
            congestion_factor: 1.0,
            average_port_stay_hours: 12.0,
            services: vec![],
            canal_access: CanalAccess::default(),
        }
    }

    fn index() -> SpatialPortIndex {
        let catalog = PortCatalog::from_ports(
            [
                port("SGSIN", 1.2644, 103.84),
                port("MYTPP", 1.362, 103.55),
                port("LKCMB", 6.95, 79.85),
                port("NLRTM", 51.95, 4.14),
                port("BEANR", 51.28, 4.33),
            ],
            3,
        )
        .unwrap();
        SpatialPortIndex::build(&catalog)
    }

    #[test]
    fn nearest_orders_by_great_circle_distance() {
        let idx = index();
        let results = idx.nearest(Position::new(1.2644, 103.84), &NeighbourQuery::nearest(3));
        let codes: Vec<_> = results.iter().map(|r| r.port.code.clone()).collect();
        assert_eq!(codes, vec!["SGSIN", "MYTPP", "LKCMB"]);
        assert!(results[0].distance_nm < 1e-6);
    }

    #[test]
    fn chord_distances_match_haversine() {
        let idx = index();
        let origin = Position::new(1.2644, 103.84);
        let results = idx.nearest(origin, &NeighbourQuery::nearest(5));
        for result in &results {
            let expected = distance_nm(origin, result.port.position);
            assert!(
                (result.distance_nm - expected).abs() < 0.01,
                "{}: {} vs {}",
                result.port.code,
                result.distance_nm,
                expected
            );
        }
    }

    #[test]
    fn radius_cap_excludes_distant_ports() {
        let idx = index();
        let results = idx.within_radius(Position::new(1.2644, 103.84), 100.0, 10);
        let codes: Vec<_> = results.iter().map(|r| r.port.code.clone()).collect();
        assert_eq!(codes, vec!["SGSIN", "MYTPP"]);
    }

    #[test]
    fn limit_caps_result_count() {
        let idx = index();
        let results = idx.within_radius(Position::new(51.9, 4.1), 10_000.0, 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].port.code, "NLRTM");
    }

    #[test]
    fn code_lookup() {
        let idx = index();
        assert!(idx.by_code("LKCMB").is_some());
        assert!(idx.by_code("ZZZZZ").is_none());
        assert_eq!(idx.len(), 5);
    }
}
