//! Handler tests over the in-process router.

use axum_test::TestServer;
use serde_json::{json, Value};

use searoute_service_route::build_router;
use searoute_service_shared::test_utils::test_state;

fn server() -> TestServer {
    TestServer::new(build_router(test_state())).expect("router builds")
}

fn calculation_body(origin: &str, destination: &str) -> Value {
    json!({
        "origin": origin,
        "destination": destination,
        "vessel": {
            "vessel_type": "container",
            "length_m": 300.0,
            "beam_m": 45.0,
            "draft_m": 14.0,
            "cruise_speed_kn": 18.0,
            "max_speed_kn": 24.0,
            "fuel_type": "vlsfo",
            "suez_canal_compatible": true,
            "panama_canal_compatible": true
        },
        "optimization": "fastest"
    })
}

#[tokio::test]
async fn calculate_returns_a_route() {
    let server = server();
    let response = server
        .post("/routes/calculate")
        .json(&calculation_body("NLRTM", "DEHAM"))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert!(body["primary_route"].is_object());
    assert_eq!(body["cache_hit"], json!(false));
    assert_eq!(body["primary_route"]["port_codes"][0], "NLRTM");
}

#[tokio::test]
async fn repeated_calculation_hits_the_cache() {
    let server = server();
    let body = calculation_body("NLRTM", "DEHAM");
    server.post("/routes/calculate").json(&body).await.assert_status_ok();

    let second: Value = server.post("/routes/calculate").json(&body).await.json();
    assert_eq!(second["cache_hit"], json!(true));
}

#[tokio::test]
async fn unknown_port_maps_to_404_envelope() {
    let server = server();
    let response = server
        .post("/routes/calculate")
        .json(&calculation_body("NLRTM", "ZZZZZ"))
        .await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);

    let body: Value = response.json();
    assert_eq!(body["error"], "PORT_NOT_FOUND");
    assert!(body["request_id"].is_string());
}

#[tokio::test]
async fn identical_endpoints_map_to_400_envelope() {
    let server = server();
    let response = server
        .post("/routes/calculate")
        .json(&calculation_body("NLRTM", "NLRTM"))
        .await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn request_id_header_is_echoed_in_errors() {
    let server = server();
    let response = server
        .post("/routes/calculate")
        .add_header("x-request-id", "req-test-123")
        .json(&calculation_body("NLRTM", "ZZZZZ"))
        .await;
    let body: Value = response.json();
    assert_eq!(body["request_id"], "req-test-123");
}

#[tokio::test]
async fn validate_endpoint_confirms_good_requests() {
    let server = server();
    let response = server
        .post("/routes/validate")
        .json(&calculation_body("NLRTM", "BEANR"))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["valid"], json!(true));
}

#[tokio::test]
async fn validate_endpoint_rejects_unknown_ports() {
    let server = server();
    let response = server
        .post("/routes/validate")
        .json(&calculation_body("NLRTM", "ZZZZZ"))
        .await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn port_search_finds_by_prefix() {
    let server = server();
    let response = server.get("/ports/search").add_query_param("q", "rot").await;
    response.assert_status_ok();

    let body: Value = response.json();
    let results = body["results"].as_array().unwrap();
    assert!(results
        .iter()
        .any(|entry| entry["port"]["code"] == "NLRTM"));
}

#[tokio::test]
async fn port_search_rejects_short_queries() {
    let server = server();
    let response = server.get("/ports/search").add_query_param("q", "r").await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn port_lookup_roundtrip() {
    let server = server();
    let response = server.get("/ports/NLRTM").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["code"], "NLRTM");
    assert_eq!(body["name"], "Rotterdam");

    let missing = server.get("/ports/ZZZZZ").await;
    missing.assert_status(axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_surface_is_ready() {
    let server = server();
    server.get("/health").await.assert_status_ok();
    server.get("/health/live").await.assert_status_ok();

    let ready: Value = server.get("/health/ready").await.json();
    assert_eq!(ready["status"], "ok");
    assert!(ready["graph_nodes"].as_u64().unwrap() >= 3);
}
