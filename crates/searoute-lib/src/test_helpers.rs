//! Shared fixture builders for unit tests.

use std::sync::Arc;

use crate::catalog::PortCatalog;
use crate::geo::Position;
use crate::graph::{build_graph, CanalSpec, EdgeKind, GraphOptions, PortGraph};
use crate::port::{CanalAccess, Port, PortStatus, PortType, SeaArea, VesselLimits};
use crate::tables::Tables;
use crate::vessel::{FuelType, VesselProfile, VesselType};

pub fn sample_port(code: &str, lat: f64, lon: f64, sea_area: SeaArea) -> Port {
    Port {
        code: code.to_string(),
        name: code.to_string(),
        country: code[..2].to_string(),
        position: Position::new(lat, lon),
        port_type: PortType::Container,
        status: PortStatus::Active,
        sea_area,
        limits: VesselLimits {
            max_length_m: Some(400.0),
            max_beam_m: Some(62.0),
            max_draft_m: Some(17.0),
        },
        berth_count: 10,
        congestion_factor: 1.0,
        average_port_stay_hours: 12.0,
        services: vec![],
        canal_access: CanalAccess::default(),
    }
}

pub fn container_vessel() -> VesselProfile {
    VesselProfile {
        vessel_type: VesselType::Container,
        length_m: 300.0,
        beam_m: 45.0,
        draft_m: 14.0,
        deadweight_tonnage: Some(120_000.0),
        gross_tonnage: None,
        cruise_speed_kn: 18.0,
        max_speed_kn: 24.0,
        max_range_nm: None,
        fuel_type: FuelType::Vlsfo,
        suez_canal_compatible: true,
        panama_canal_compatible: true,
    }
}

/// Five ports along the equator with a parallel detour row to the north,
/// giving the pathfinder several distinct simple paths to choose between.
///
/// ```text
/// XXAAA - XXBBB - XXCCC - XXDDD - XXEEE      (equator, 3 deg spacing)
///     \  XXNNN /    \  XXMMM  /              (northern detours)
/// ```
pub fn lattice_catalog() -> PortCatalog {
    let area = SeaArea::Indian;
    PortCatalog::from_ports(
        [
            sample_port("XXAAA", 0.0, 0.0, area),
            sample_port("XXBBB", 0.0, 3.0, area),
            sample_port("XXCCC", 0.0, 6.0, area),
            sample_port("XXDDD", 0.0, 9.0, area),
            sample_port("XXEEE", 0.0, 12.0, area),
            sample_port("XXNNN", 2.0, 1.5, area),
            sample_port("XXMMM", 2.0, 7.5, area),
        ],
        1,
    )
    .unwrap()
}

pub fn lattice_options() -> GraphOptions {
    GraphOptions {
        k_nearest: 4,
        knn_radius_nm: 400.0,
        hub_count: 0,
        hub_radius_nm: 0.0,
        coastal_threshold_nm: 150.0,
        canals: Vec::new(),
    }
}

pub fn lattice_graph() -> PortGraph {
    build_graph(&lattice_catalog(), &lattice_options(), &Tables::default()).unwrap()
}

/// Two Suez gateway ports plus one port on each side, bridged by the canal.
pub fn canal_catalog() -> PortCatalog {
    PortCatalog::from_ports(
        [
            sample_port("DJJIB", 11.60, 43.14, SeaArea::RedSea),
            sample_port("EGSUZ", 29.97, 32.55, SeaArea::RedSea),
            sample_port("EGPSD", 31.26, 32.30, SeaArea::Mediterranean),
            sample_port("GRPIR", 37.94, 23.64, SeaArea::Mediterranean),
        ],
        1,
    )
    .unwrap()
}

pub fn canal_graph() -> PortGraph {
    let options = GraphOptions {
        k_nearest: 4,
        knn_radius_nm: 2_000.0,
        hub_count: 0,
        hub_radius_nm: 0.0,
        coastal_threshold_nm: 400.0,
        canals: vec![CanalSpec {
            name: "suez".to_string(),
            kind: EdgeKind::CanalSuez,
            from: "EGSUZ".to_string(),
            to: "EGPSD".to_string(),
        }],
    };
    build_graph(&canal_catalog(), &options, &Tables::default()).unwrap()
}

pub fn default_tables() -> Arc<Tables> {
    Arc::new(Tables::default())
}
