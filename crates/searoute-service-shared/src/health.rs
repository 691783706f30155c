//! Health handlers: the service-level `/health` report plus Kubernetes
//! liveness and readiness probes.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::AppState;

/// Health report payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// "ok" or "not_ready: <reason>".
    pub status: String,
    pub service: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_nodes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_edges: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_version: Option<u64>,
}

impl HealthStatus {
    pub fn alive(service: &str, version: &str) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            graph_nodes: None,
            graph_edges: None,
            catalog_version: None,
        }
    }

    pub fn ready(service: &str, version: &str, nodes: usize, edges: usize, catalog: u64) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            graph_nodes: Some(nodes),
            graph_edges: Some(edges),
            catalog_version: Some(catalog),
        }
    }

    pub fn not_ready(service: &str, version: &str, reason: &str) -> Self {
        Self {
            status: format!("not_ready: {reason}"),
            service: service.to_string(),
            version: version.to_string(),
            graph_nodes: None,
            graph_edges: None,
            catalog_version: None,
        }
    }
}

/// Liveness probe: the process is up. No external dependencies checked.
pub async fn health_live() -> impl IntoResponse {
    let status = HealthStatus::alive(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    (StatusCode::OK, Json(status))
}

/// Readiness probe: a graph snapshot with nodes must be published.
pub async fn health_ready(State(state): State<AppState>) -> Response {
    readiness(&state).into_response()
}

/// Service-level health report for `GET /health`.
pub async fn health(State(state): State<AppState>) -> Response {
    readiness(&state).into_response()
}

fn readiness(state: &AppState) -> (StatusCode, Json<HealthStatus>) {
    let service = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");

    let graph = state.coordinator().graph_handle().snapshot();
    if graph.node_count() == 0 {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthStatus::not_ready(service, version, "no routing graph loaded")),
        );
    }

    (
        StatusCode::OK,
        Json(HealthStatus::ready(
            service,
            version,
            graph.node_count(),
            graph.edge_count(),
            graph.catalog_version(),
        )),
    )
}
