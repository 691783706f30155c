//! Test fixtures shared across service crates.
//!
//! Enable the `test-utils` feature to use these from dependent crates'
//! tests.

use std::sync::Arc;

use searoute_lib::{
    build_graph, CanalAccess, CollectingSink, Coordinator, GraphHandle, GraphOptions,
    InMemoryPortRepository, MemoryCacheStore, PlannerConfig, Port, PortCatalog, PortStatus,
    PortType, Position, SeaArea, Tables, VesselLimits,
};

use crate::AppState;

/// A minimal North Sea catalog: three connected ports.
pub fn test_catalog() -> PortCatalog {
    PortCatalog::from_ports(
        [
            test_port("NLRTM", "Rotterdam", 51.95, 4.14),
            test_port("BEANR", "Antwerp", 51.28, 4.33),
            test_port("DEHAM", "Hamburg", 53.51, 9.93),
        ],
        1,
    )
    .unwrap()
}

pub fn test_port(code: &str, name: &str, lat: f64, lon: f64) -> Port {
    Port {
        code: code.to_string(),
        name: name.to_string(),
        country: code[..2].to_string(),
        position: Position::new(lat, lon),
        port_type: PortType::Container,
        status: PortStatus::Active,
        sea_area: SeaArea::NorthAtlantic,
        limits: VesselLimits {
            max_length_m: Some(400.0),
            max_beam_m: Some(62.0),
            max_draft_m: Some(17.0),
        },
        berth_count: 20,
        congestion_factor: 1.0,
        average_port_stay_hours: 12.0,
        services: vec![],
        canal_access: CanalAccess::default(),
    }
}

/// App state over the test catalog with default configuration.
pub fn test_state() -> AppState {
    test_state_with_sink(Arc::new(CollectingSink::default()))
}

/// App state with a caller-provided analytics sink for instrumentation.
pub fn test_state_with_sink(sink: Arc<CollectingSink>) -> AppState {
    let catalog = Arc::new(test_catalog());
    let tables = Arc::new(Tables::default());
    let options = GraphOptions {
        k_nearest: 2,
        knn_radius_nm: 400.0,
        hub_count: 0,
        hub_radius_nm: 0.0,
        canals: Vec::new(),
        ..GraphOptions::default()
    };
    let graph = build_graph(&catalog, &options, &tables).unwrap();
    let coordinator = Coordinator::new(
        Arc::new(InMemoryPortRepository::new(catalog)),
        Arc::new(GraphHandle::new(graph)),
        tables,
        Arc::new(MemoryCacheStore::default()),
        sink,
        PlannerConfig::default(),
    )
    .unwrap();
    AppState::new(Arc::new(coordinator))
}
