//! Maritime route planning core.
//!
//! This crate owns the hard path of the route planning service: the port
//! graph and its spatial index, the multi-criteria pathfinder, the route
//! assembler, and the deduplicating request coordinator. Higher-level
//! consumers (the HTTP service) should only depend on the types exported
//! here instead of reimplementing behavior.
//!
//! # Quick Start
//!
//! The typical workflow is:
//!
//! 1. **Load the catalog** with [`load_catalog`] (SQLite) or
//!    [`PortCatalog::from_ports`].
//! 2. **Build the graph** with [`build_graph`] and wrap it in a
//!    [`GraphHandle`].
//! 3. **Construct a [`Coordinator`]** from the repository, graph handle,
//!    tables, cache store, and analytics sink.
//! 4. **Submit requests** through [`Coordinator::calculate`].
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use searoute_lib::{
//!     build_graph, load_catalog, Coordinator, GraphHandle, InMemoryPortRepository,
//!     MemoryCacheStore, PlannerConfig, Tables, TracingAnalyticsSink,
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PlannerConfig::default();
//! let tables = Arc::new(Tables::default());
//! let catalog = Arc::new(load_catalog(Path::new("ports.db"))?);
//! let graph = build_graph(&catalog, &config.graph_options(), &tables)?;
//!
//! let coordinator = Coordinator::new(
//!     Arc::new(InMemoryPortRepository::new(catalog)),
//!     Arc::new(GraphHandle::new(graph)),
//!     tables,
//!     Arc::new(MemoryCacheStore::default()),
//!     Arc::new(TracingAnalyticsSink),
//!     config,
//! )?;
//!
//! let request = serde_json::from_str(r#"{ "origin": "SGSIN", "destination": "NLRTM", "vessel": { "vessel_type": "container", "length_m": 300.0, "beam_m": 45.0, "draft_m": 14.0, "cruise_speed_kn": 18.0, "max_speed_kn": 24.0, "fuel_type": "vlsfo", "suez_canal_compatible": true, "panama_canal_compatible": true } }"#)?;
//! let response = coordinator.calculate(request, "req-1").await?;
//! println!("primary route found: {}", response.primary_route.is_some());
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, Error>`](Result); the error
//! kinds map one-to-one onto the service's wire statuses (validation,
//! unknown port, deadline exceeded, overloaded, backend unavailable).
//! "No feasible route" is deliberately *not* an error: it surfaces as a
//! successful [`RouteResponse`] with `primary_route: None` and diagnostics.

#![deny(warnings)]

pub mod analytics;
pub mod assemble;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod coordinator;
pub mod cost;
pub mod db;
pub mod error;
pub mod fingerprint;
pub mod geo;
pub mod graph;
pub mod path;
pub mod port;
pub mod repository;
pub mod request;
pub mod response;
pub mod spatial;
pub mod tables;
#[cfg(test)]
pub mod test_helpers;
pub mod vessel;

pub use analytics::{
    AnalyticsSink, CalculationEvent, CalculationOutcome, CollectingSink, TracingAnalyticsSink,
};
pub use assemble::RouteAssembler;
pub use cache::{CacheStore, CacheTtls, MemoryCacheStore, ResponseCache};
pub use catalog::PortCatalog;
pub use config::PlannerConfig;
pub use coordinator::Coordinator;
pub use cost::{CostModel, EdgeCost, OptimizationCriterion};
pub use db::{load_catalog, load_catalog_from_connection};
pub use error::{Error, Result};
pub use fingerprint::Fingerprint;
pub use geo::{distance_nm, initial_bearing, interpolate, Position, EARTH_RADIUS_NM};
pub use graph::{
    build_graph, default_canals, CanalSpec, EdgeKind, GraphEdge, GraphHandle, GraphOptions, NodeId,
    PortGraph,
};
pub use path::{CancelToken, FoundPath, PathSearch, SearchLimits, TopKResult};
pub use port::{CanalAccess, Port, PortStatus, PortType, SeaArea, VesselLimits};
pub use repository::{
    InMemoryPortRepository, PortMatch, PortRepository, SearchOptions, MAX_SEARCH_RESULTS,
    MIN_QUERY_LEN,
};
pub use request::{RouteCalculationRequest, MAX_ALTERNATIVES, MAX_CONNECTING_PORTS};
pub use response::{
    DetailedRoute, PortRef, RouteResponse, RouteScores, RouteSegment, RouteTotals, SegmentMetrics,
};
pub use spatial::{NeighbourQuery, PortDistance, SpatialPortIndex};
pub use tables::{CanalFeeSchedule, FuelPrices, PortFeeSchedule, RiskMatrix, Tables, WeatherZone};
pub use vessel::{FuelType, VesselProfile, VesselType};
