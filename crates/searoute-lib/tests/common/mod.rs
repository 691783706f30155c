//! Shared world fixture for integration tests.
//!
//! A ~40-port catalog with real coordinates covering the Europe-Asia
//! corridor (Suez and Cape of Good Hope), the transpacific lane, and the
//! Panama approaches. Graph options keep generic legs at coastal scale so
//! the corridors resemble commercial routings; Cape Town, Shanghai, and
//! Los Angeles act as the long-range hubs.

#![allow(dead_code)]

use std::sync::Arc;

use searoute_lib::{
    build_graph, CanalAccess, CollectingSink, Coordinator, FuelType, GraphHandle, GraphOptions,
    MemoryCacheStore, OptimizationCriterion, PlannerConfig, Port, PortCatalog, PortGraph,
    PortStatus, PortType, Position, RouteCalculationRequest, SeaArea, Tables, VesselLimits,
    VesselProfile, VesselType,
};
use searoute_lib::repository::InMemoryPortRepository;

pub struct Spec {
    pub code: &'static str,
    pub name: &'static str,
    pub lat: f64,
    pub lon: f64,
    pub area: SeaArea,
    pub berths: u32,
}

use SeaArea::*;

/// Large ports accept the biggest ships; the `SMALL` set publishes tighter
/// limits that exclude the tanker fixture but admit the container fixture.
const PORTS: &[Spec] = &[
    Spec { code: "SGSIN", name: "Singapore", lat: 1.2644, lon: 103.84, area: Indian, berths: 60 },
    Spec { code: "MYPKG", name: "Port Klang", lat: 3.0, lon: 101.4, area: Indian, berths: 40 },
    Spec { code: "LKCMB", name: "Colombo", lat: 6.95, lon: 79.85, area: Indian, berths: 45 },
    Spec { code: "INNSA", name: "Nhava Sheva", lat: 18.95, lon: 72.95, area: Indian, berths: 42 },
    Spec { code: "AEJEA", name: "Jebel Ali", lat: 25.01, lon: 55.06, area: Indian, berths: 67 },
    Spec { code: "OMSLL", name: "Salalah", lat: 16.93, lon: 54.0, area: Indian, berths: 30 },
    Spec { code: "SCPOV", name: "Port Victoria", lat: -4.62, lon: 55.45, area: Indian, berths: 8 },
    Spec { code: "MUPLU", name: "Port Louis", lat: -20.16, lon: 57.5, area: Indian, berths: 12 },
    Spec { code: "MGTOA", name: "Toamasina", lat: -18.15, lon: 49.4, area: Indian, berths: 10 },
    Spec { code: "ZADUR", name: "Durban", lat: -29.87, lon: 31.03, area: Indian, berths: 35 },
    Spec { code: "DJJIB", name: "Djibouti", lat: 11.6, lon: 43.14, area: RedSea, berths: 15 },
    Spec { code: "EGSUZ", name: "Suez", lat: 29.97, lon: 32.55, area: RedSea, berths: 10 },
    Spec { code: "EGPSD", name: "Port Said", lat: 31.26, lon: 32.3, area: Mediterranean, berths: 25 },
    Spec { code: "GRPIR", name: "Piraeus", lat: 37.94, lon: 23.64, area: Mediterranean, berths: 30 },
    Spec { code: "MTMAR", name: "Marsaxlokk", lat: 35.83, lon: 14.53, area: Mediterranean, berths: 20 },
    Spec { code: "ESALG", name: "Algeciras", lat: 36.13, lon: -5.44, area: NorthAtlantic, berths: 40 },
    Spec { code: "ESLPA", name: "Las Palmas", lat: 28.14, lon: -15.41, area: NorthAtlantic, berths: 18 },
    Spec { code: "PTLIS", name: "Lisbon", lat: 38.7, lon: -9.16, area: NorthAtlantic, berths: 20 },
    Spec { code: "FRLEH", name: "Le Havre", lat: 49.48, lon: 0.11, area: NorthAtlantic, berths: 35 },
    Spec { code: "NLRTM", name: "Rotterdam", lat: 51.95, lon: 4.14, area: NorthAtlantic, berths: 90 },
    Spec { code: "BEANR", name: "Antwerp", lat: 51.28, lon: 4.33, area: NorthAtlantic, berths: 70 },
    Spec { code: "DEHAM", name: "Hamburg", lat: 53.51, lon: 9.93, area: NorthAtlantic, berths: 65 },
    Spec { code: "USNYC", name: "New York", lat: 40.67, lon: -74.04, area: NorthAtlantic, berths: 55 },
    Spec { code: "USHOU", name: "Houston", lat: 29.73, lon: -95.0, area: NorthAtlantic, berths: 45 },
    Spec { code: "PAMIT", name: "Colon", lat: 9.35, lon: -79.88, area: NorthAtlantic, berths: 22 },
    Spec { code: "SNDKR", name: "Dakar", lat: 14.7, lon: -17.4, area: NorthAtlantic, berths: 14 },
    Spec { code: "ZACPT", name: "Cape Town", lat: -33.91, lon: 18.44, area: SouthAtlantic, berths: 95 },
    Spec { code: "AOLAD", name: "Luanda", lat: -8.8, lon: 13.2, area: SouthAtlantic, berths: 12 },
    Spec { code: "NGAPP", name: "Apapa", lat: 6.44, lon: 3.36, area: SouthAtlantic, berths: 16 },
    Spec { code: "CIABJ", name: "Abidjan", lat: 5.3, lon: -4.0, area: SouthAtlantic, berths: 14 },
    Spec { code: "CNSHA", name: "Shanghai", lat: 31.23, lon: 121.49, area: Pacific, berths: 120 },
    Spec { code: "KRPUS", name: "Busan", lat: 35.1, lon: 129.04, area: Pacific, berths: 60 },
    Spec { code: "JPYOK", name: "Yokohama", lat: 35.44, lon: 139.66, area: Pacific, berths: 50 },
    Spec { code: "USLAX", name: "Los Angeles", lat: 33.74, lon: -118.26, area: Pacific, berths: 110 },
    Spec { code: "USOAK", name: "Oakland", lat: 37.8, lon: -122.28, area: Pacific, berths: 40 },
    Spec { code: "MXZLO", name: "Manzanillo", lat: 19.05, lon: -104.32, area: Pacific, berths: 25 },
    Spec { code: "PABLB", name: "Balboa", lat: 8.96, lon: -79.57, area: Pacific, berths: 24 },
    Spec { code: "HKHKG", name: "Hong Kong", lat: 22.3, lon: 114.17, area: Pacific, berths: 75 },
    Spec { code: "TWKHH", name: "Kaohsiung", lat: 22.61, lon: 120.28, area: Pacific, berths: 55 },
    Spec { code: "VNSGN", name: "Ho Chi Minh City", lat: 10.77, lon: 106.7, area: Pacific, berths: 30 },
];

/// Ports with tighter published limits.
const SMALL: &[&str] = &["SCPOV", "MGTOA", "AOLAD", "CIABJ", "SNDKR", "VNSGN"];

pub fn world_catalog() -> PortCatalog {
    let ports = PORTS.iter().map(|spec| {
        let small = SMALL.contains(&spec.code);
        let congestion = match spec.code {
            "HKHKG" => 1.3,
            "USNYC" => 1.4,
            _ => 1.0,
        };
        Port {
            code: spec.code.to_string(),
            name: spec.name.to_string(),
            country: spec.code[..2].to_string(),
            position: Position::new(spec.lat, spec.lon),
            port_type: if small { PortType::Multipurpose } else { PortType::Container },
            status: PortStatus::Active,
            sea_area: spec.area,
            limits: if small {
                VesselLimits {
                    max_length_m: Some(300.0),
                    max_beam_m: Some(48.0),
                    max_draft_m: Some(16.0),
                }
            } else {
                VesselLimits {
                    max_length_m: Some(400.0),
                    max_beam_m: Some(65.0),
                    max_draft_m: Some(23.0),
                }
            },
            berth_count: spec.berths,
            congestion_factor: congestion,
            average_port_stay_hours: if small { 12.0 } else { 18.0 },
            services: vec!["bunkering".to_string()],
            canal_access: CanalAccess {
                suez: matches!(spec.code, "EGSUZ" | "EGPSD"),
                panama: matches!(spec.code, "PABLB" | "PAMIT"),
            },
        }
    });
    PortCatalog::from_ports(ports, 1).unwrap()
}

/// Graph options tuned to the fixture scale: coastal k-NN legs plus three
/// long-range hubs (Shanghai, Los Angeles, Cape Town by berth count).
pub fn world_options() -> GraphOptions {
    GraphOptions {
        k_nearest: 6,
        knn_radius_nm: 1_800.0,
        hub_count: 3,
        hub_radius_nm: 6_000.0,
        ..GraphOptions::default()
    }
}

pub fn world_graph() -> PortGraph {
    build_graph(&world_catalog(), &world_options(), &Tables::default()).unwrap()
}

pub fn world_config() -> PlannerConfig {
    PlannerConfig {
        graph_k_nearest: 6,
        graph_knn_radius_nm: 1_800.0,
        graph_hub_count: 3,
        graph_hub_radius_nm: 6_000.0,
        ..PlannerConfig::default()
    }
}

pub fn world_coordinator_with_sink(sink: Arc<CollectingSink>) -> Coordinator {
    let catalog = Arc::new(world_catalog());
    let tables = Arc::new(Tables::default());
    let graph = build_graph(&catalog, &world_options(), &tables).unwrap();
    Coordinator::new(
        Arc::new(InMemoryPortRepository::new(catalog)),
        Arc::new(GraphHandle::new(graph)),
        tables,
        Arc::new(MemoryCacheStore::default()),
        sink,
        world_config(),
    )
    .unwrap()
}

pub fn world_coordinator() -> Coordinator {
    world_coordinator_with_sink(Arc::new(CollectingSink::default()))
}

/// The SGSIN -> NLRTM container fixture: 300 m x 45 m x 14 m at 18 kn.
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
        max_range_nm: Some(22_000.0),
        fuel_type: FuelType::Vlsfo,
        suez_canal_compatible: true,
        panama_canal_compatible: true,
    }
}

/// The AEJEA -> BEANR tanker fixture: 330 m x 60 m x 22 m at 14 kn.
pub fn tanker_vessel() -> VesselProfile {
    VesselProfile {
        vessel_type: VesselType::Tanker,
        length_m: 330.0,
        beam_m: 60.0,
        draft_m: 22.0,
        deadweight_tonnage: Some(160_000.0),
        gross_tonnage: Some(160_000.0),
        cruise_speed_kn: 14.0,
        max_speed_kn: 16.0,
        max_range_nm: Some(24_000.0),
        fuel_type: FuelType::Hfo,
        suez_canal_compatible: true,
        panama_canal_compatible: false,
    }
}

pub fn calculation(
    origin: &str,
    destination: &str,
    vessel: VesselProfile,
    criterion: OptimizationCriterion,
) -> RouteCalculationRequest {
    RouteCalculationRequest {
        origin: origin.to_string(),
        destination: destination.to_string(),
        vessel,
        optimization: criterion,
        max_alternative_routes: 3,
        max_connecting_ports: 6,
        departure_time: None,
        timeout_s: None,
    }
}
