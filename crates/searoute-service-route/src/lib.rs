//! Route planning HTTP service.
//!
//! Thin axum handlers over the `searoute-lib` coordinator:
//!
//! - `POST /routes/calculate` - compute a route with alternatives
//! - `POST /routes/validate` - request validation only
//! - `GET /ports/search` - ranked port text search
//! - `GET /ports/{code}` - port lookup by UN/LOCODE
//! - `GET /health`, `/health/live`, `/health/ready` - health surface
//! - `GET /metrics` - Prometheus exposition

#![deny(warnings)]

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tracing::info;

use searoute_lib::{
    Error as LibError, RouteCalculationRequest, SearchOptions, VesselType,
};
use searoute_service_shared::{
    envelope_for_error, extract_or_generate_request_id, health, health_live, health_ready,
    metrics_handler, record_alternatives_returned, record_cache_outcome, record_route_calculated,
    record_route_distance, record_route_failed, AppState, MetricsLayer,
};

/// Build the service router over the shared state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/routes/calculate", post(calculate_handler))
        .route("/routes/validate", post(validate_handler))
        .route("/ports/search", get(ports_search_handler))
        .route("/ports/{code}", get(port_get_handler))
        .route("/health", get(health))
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready))
        .route("/metrics", get(metrics_handler))
        .layer(MetricsLayer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Handle `POST /routes/calculate`.
async fn calculate_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<RouteCalculationRequest>,
) -> Response {
    let request_id = extract_or_generate_request_id(&headers);
    info!(
        request_id = %request_id,
        origin = %request.origin,
        destination = %request.destination,
        criterion = request.optimization.as_str(),
        "handling route calculation"
    );

    let criterion = request.optimization;
    match state
        .coordinator()
        .calculate(request, request_id.as_str())
        .await
    {
        Ok(response) => {
            record_cache_outcome(if response.cache_hit { "hit" } else { "miss" });
            record_route_calculated(criterion.as_str(), &response.algorithm);
            if let Some(primary) = &response.primary_route {
                record_route_distance(primary.totals.distance_nm, criterion.as_str());
            }
            record_alternatives_returned(response.alternatives.len());
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(error) => {
            record_route_failed(failure_reason(&error));
            envelope_for_error(&error, request_id.as_str()).into_response()
        }
    }
}

/// Handle `POST /routes/validate`: validation steps only, no compute.
async fn validate_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<RouteCalculationRequest>,
) -> Response {
    let request_id = extract_or_generate_request_id(&headers);
    match state.coordinator().validate(&request).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "valid": true,
                "request_id": request_id.as_str(),
            })),
        )
            .into_response(),
        Err(error) => {
            record_route_failed(failure_reason(&error));
            envelope_for_error(&error, request_id.as_str()).into_response()
        }
    }
}

/// Query parameters for `GET /ports/search`.
#[derive(Debug, Deserialize)]
struct PortSearchParams {
    q: String,
    #[serde(default)]
    limit: usize,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    vessel_type: Option<VesselType>,
    #[serde(default)]
    include_inactive: bool,
}

/// Handle `GET /ports/search`.
async fn ports_search_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<PortSearchParams>,
) -> Response {
    let request_id = extract_or_generate_request_id(&headers);
    let options = SearchOptions {
        limit: params.limit,
        country: params.country,
        vessel_type_compatible: params.vessel_type,
        include_inactive: params.include_inactive,
    };

    match state
        .coordinator()
        .repository()
        .search(&params.q, &options)
        .await
    {
        Ok(matches) => {
            let results: Vec<_> = matches
                .into_iter()
                .map(|m| {
                    serde_json::json!({
                        "port": &*m.port,
                        "relevance": m.relevance,
                    })
                })
                .collect();
            (StatusCode::OK, Json(serde_json::json!({ "results": results }))).into_response()
        }
        Err(error) => envelope_for_error(&error, request_id.as_str()).into_response(),
    }
}

/// Handle `GET /ports/{code}`.
async fn port_get_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(code): Path<String>,
) -> Response {
    let request_id = extract_or_generate_request_id(&headers);
    match state.coordinator().port_lookup(&code).await {
        Ok(raw) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            raw,
        )
            .into_response(),
        Err(error) => envelope_for_error(&error, request_id.as_str()).into_response(),
    }
}

fn failure_reason(error: &LibError) -> &'static str {
    match error {
        LibError::Validation { .. } => "validation_error",
        LibError::PortNotFound { .. } => "port_not_found",
        LibError::DeadlineExceeded | LibError::Cancelled => "deadline_exceeded",
        LibError::Overloaded => "overloaded",
        LibError::BackendUnavailable { .. } => "backend_unavailable",
        _ => "internal_error",
    }
}
