//! Service entry point.
//!
//! # Configuration
//!
//! - `SEAROUTE_CATALOG_PATH` - SQLite port catalog file (required)
//! - `SEAROUTE_TABLES_PATH` - tariff/risk tables JSON override (optional)
//! - `SERVICE_PORT` - HTTP port (default: 8080)
//! - `LOG_FORMAT` / `RUST_LOG` - logging controls
//! - `SEAROUTE_*` - planner tunables, see `PlannerConfig`

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info, warn};

use searoute_lib::{
    build_graph, load_catalog, Coordinator, GraphHandle, InMemoryPortRepository, MemoryCacheStore,
    PlannerConfig, Tables, TracingAnalyticsSink,
};
use searoute_service_route::build_router;
use searoute_service_shared::{init_logging, init_metrics, AppState, LoggingConfig, MetricsConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let logging_config = LoggingConfig::from_env();
    init_logging(&logging_config);

    let metrics_config = MetricsConfig::from_env();
    if let Err(e) = init_metrics(&metrics_config) {
        warn!(error = %e, "failed to initialize metrics, continuing without metrics");
    }

    let catalog_path = PathBuf::from(
        env::var("SEAROUTE_CATALOG_PATH").unwrap_or_else(|_| "/data/ports.db".to_string()),
    );
    let port: u16 = env::var("SERVICE_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    let config = PlannerConfig::from_env();
    config.validate().map_err(|e| {
        error!(error = %e, "invalid planner configuration");
        anyhow::anyhow!(e)
    })?;

    let tables = match env::var("SEAROUTE_TABLES_PATH") {
        Ok(path) => {
            info!(path = %path, "loading tariff and risk tables");
            Arc::new(Tables::from_json_path(std::path::Path::new(&path))?)
        }
        Err(_) => Arc::new(Tables::default()),
    };

    info!(catalog = %catalog_path.display(), port, "starting route service");
    let catalog = Arc::new(load_catalog(&catalog_path).map_err(|e| {
        error!(error = %e, path = %catalog_path.display(), "failed to load port catalog");
        anyhow::anyhow!(e)
    })?);

    // A disconnected catalog is fatal at startup; at runtime rebuilds keep
    // the previous snapshot instead.
    let graph = build_graph(&catalog, &config.graph_options(), &tables).map_err(|e| {
        error!(error = %e, "initial graph build failed");
        anyhow::anyhow!(e)
    })?;
    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        catalog_version = graph.catalog_version(),
        "routing graph ready"
    );

    let coordinator = Coordinator::new(
        Arc::new(InMemoryPortRepository::new(catalog)),
        Arc::new(GraphHandle::new(graph)),
        tables,
        Arc::new(MemoryCacheStore::default()),
        Arc::new(TracingAnalyticsSink),
        config,
    )?;

    let app = build_router(AppState::new(Arc::new(coordinator)));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
