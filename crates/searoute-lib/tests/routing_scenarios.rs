//! End-to-end routing scenarios over the world fixture.

mod common;

use common::{calculation, container_vessel, tanker_vessel, world_coordinator};
use searoute_lib::{DetailedRoute, EdgeKind, OptimizationCriterion};

fn has_canal_segment(route: &DetailedRoute, kind: EdgeKind) -> bool {
    route.segments.iter().any(|segment| segment.kind == kind)
}

#[tokio::test]
async fn singapore_to_rotterdam_routes_through_suez() {
    let coordinator = world_coordinator();
    let response = coordinator
        .calculate(
            calculation("SGSIN", "NLRTM", container_vessel(), OptimizationCriterion::Balanced),
            "req-sgsin-nlrtm",
        )
        .await
        .unwrap();

    let primary = response.primary_route.expect("route exists");
    assert!(has_canal_segment(&primary, EdgeKind::CanalSuez));
    assert!(
        (6_100.0..=6_600.0).contains(&primary.totals.distance_nm),
        "unexpected corridor length: {}",
        primary.totals.distance_nm
    );
    assert!(primary.intermediate_count() <= 6);
    assert_eq!(primary.port_codes.first().map(String::as_str), Some("SGSIN"));
    assert_eq!(primary.port_codes.last().map(String::as_str), Some("NLRTM"));
    assert_eq!(response.algorithm, "a-star");

    // Alternatives are distinct loopless variants of the corridor.
    assert!(!response.alternatives.is_empty());
    assert!(response.alternatives.len() <= 3);
    let mut seen = vec![primary.port_codes.clone()];
    for alternative in &response.alternatives {
        assert!(!seen.contains(&alternative.port_codes), "duplicate alternative");
        seen.push(alternative.port_codes.clone());
        let unique: std::collections::HashSet<_> = alternative.port_codes.iter().collect();
        assert_eq!(unique.len(), alternative.port_codes.len(), "loopless");
    }
    assert!(response.candidates_evaluated >= 1 + response.alternatives.len());
}

#[tokio::test]
async fn suez_incompatible_vessel_takes_the_cape_route() {
    let coordinator = world_coordinator();
    let compatible = coordinator
        .calculate(
            calculation("SGSIN", "NLRTM", container_vessel(), OptimizationCriterion::Balanced),
            "req-suez",
        )
        .await
        .unwrap()
        .primary_route
        .unwrap();

    let mut vessel = container_vessel();
    vessel.suez_canal_compatible = false;
    let cape = coordinator
        .calculate(
            calculation("SGSIN", "NLRTM", vessel, OptimizationCriterion::Balanced),
            "req-cape",
        )
        .await
        .unwrap()
        .primary_route
        .unwrap();

    assert!(!has_canal_segment(&cape, EdgeKind::CanalSuez));
    assert!(cape.port_codes.contains(&"ZACPT".to_string()), "routes via Cape Town");
    assert!(
        (10_200.0..=10_700.0).contains(&cape.totals.distance_nm),
        "unexpected Cape distance: {}",
        cape.totals.distance_nm
    );
    assert!(cape.totals.distance_nm > compatible.totals.distance_nm);
    assert!(cape.totals.fuel_tons > compatible.totals.fuel_tons);
}

#[tokio::test]
async fn shanghai_to_los_angeles_is_a_direct_pacific_leg() {
    let coordinator = world_coordinator();
    let response = coordinator
        .calculate(
            calculation("CNSHA", "USLAX", container_vessel(), OptimizationCriterion::Fastest),
            "req-pacific",
        )
        .await
        .unwrap();

    let primary = response.primary_route.expect("route exists");
    assert_eq!(primary.intermediate_count(), 0, "hub legs cover the crossing");
    assert!(
        (5_600.0..=5_700.0).contains(&primary.totals.distance_nm),
        "unexpected Pacific distance: {}",
        primary.totals.distance_nm
    );
    // 5,645 nm at 18 kn cruise.
    assert!(
        (300.0..=330.0).contains(&primary.totals.transit_hours),
        "unexpected transit time: {}",
        primary.totals.transit_hours
    );
    assert_eq!(response.algorithm, "dijkstra");
}

#[tokio::test]
async fn tanker_prefers_suez_when_compatible_and_cape_otherwise() {
    let coordinator = world_coordinator();

    let suez = coordinator
        .calculate(
            calculation("AEJEA", "BEANR", tanker_vessel(), OptimizationCriterion::MostEconomical),
            "req-tanker-suez",
        )
        .await
        .unwrap()
        .primary_route
        .unwrap();
    assert!(has_canal_segment(&suez, EdgeKind::CanalSuez));
    assert!(
        (2_900.0..=3_300.0).contains(&suez.totals.distance_nm),
        "unexpected Suez distance: {}",
        suez.totals.distance_nm
    );
    assert!(suez.totals.canal_fees_usd > 0.0);

    let mut vessel = tanker_vessel();
    vessel.suez_canal_compatible = false;
    let cape = coordinator
        .calculate(
            calculation("AEJEA", "BEANR", vessel, OptimizationCriterion::MostEconomical),
            "req-tanker-cape",
        )
        .await
        .unwrap()
        .primary_route
        .unwrap();
    assert!(!has_canal_segment(&cape, EdgeKind::CanalSuez));
    assert!(cape.port_codes.contains(&"ZACPT".to_string()));
    assert!(
        (9_000.0..=9_600.0).contains(&cape.totals.distance_nm),
        "unexpected Cape distance: {}",
        cape.totals.distance_nm
    );
    assert_eq!(cape.totals.canal_fees_usd, 0.0);
    assert!(cape.totals.total_cost_usd > suez.totals.total_cost_usd);
}

#[tokio::test]
async fn oversized_draft_yields_a_no_route_answer() {
    let coordinator = world_coordinator();
    let mut vessel = container_vessel();
    vessel.draft_m = 30.0;

    let response = coordinator
        .calculate(
            calculation("SGSIN", "NLRTM", vessel, OptimizationCriterion::Balanced),
            "req-deep-draft",
        )
        .await
        .unwrap();
    assert!(response.primary_route.is_none());
    assert!(response.alternatives.is_empty());
    assert!(!response.diagnostics.is_empty());
}

#[tokio::test]
async fn returned_routes_satisfy_the_core_invariants() {
    let coordinator = world_coordinator();
    let response = coordinator
        .calculate(
            calculation("SGSIN", "NLRTM", container_vessel(), OptimizationCriterion::Balanced),
            "req-invariants",
        )
        .await
        .unwrap();

    let graph = coordinator.graph_handle().snapshot();
    let vessel = container_vessel();
    let mut routes = vec![response.primary_route.clone().unwrap()];
    routes.extend(response.alternatives.clone());

    for route in &routes {
        // Segment distances sum to the total within 1e-6 nm.
        let sum: f64 = route.segments.iter().map(|s| s.metrics.distance_nm).sum();
        assert!((sum - route.totals.distance_nm).abs() < 1e-6);

        for code in &route.port_codes {
            let node = graph.node_by_code(code).expect("route port is a graph node");
            let port = graph.port(node);
            // Every endpoint accepts traffic and the vessel.
            assert!(port.status.accepts_traffic());
            if let Some(max_draft) = port.limits.max_draft_m {
                assert!(vessel.draft_m <= max_draft);
            }
            if let Some(max_beam) = port.limits.max_beam_m {
                assert!(vessel.beam_m <= max_beam);
            }
        }
        for score in [
            route.scores.efficiency,
            route.scores.reliability,
            route.scores.environmental_impact,
            route.scores.overall_optimization,
            route.scores.risk,
        ] {
            assert!((0.0..=100.0).contains(&score));
        }
    }
}

#[tokio::test]
async fn repeated_calculations_return_identical_orderings() {
    let coordinator = world_coordinator();
    let request = calculation("SGSIN", "NLRTM", container_vessel(), OptimizationCriterion::Fastest);

    // Bypass the cache by comparing two coordinators over the same catalog.
    let other = world_coordinator();
    let first = coordinator.calculate(request.clone(), "req-a").await.unwrap();
    let second = other.calculate(request, "req-b").await.unwrap();

    let ordering = |response: &searoute_lib::RouteResponse| {
        let mut all = vec![response.primary_route.as_ref().unwrap().port_codes.clone()];
        all.extend(response.alternatives.iter().map(|r| r.port_codes.clone()));
        all
    };
    assert_eq!(ordering(&first), ordering(&second));
}
