use super::common::*;
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

use crate::footprint::router::{analyze_handler, impact_handler, ImpactQuery};
use crate::footprint::footprint_router;

fn analyze_request(body: serde_json::Value) -> Request<Body> {
    Request::post("/api/v1/analyze-order")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).expect("serializable")))
        .expect("request builds")
}

#[tokio::test]
async fn analyze_route_returns_full_breakdown() {
    let (service, ledger) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(analyze_request(json!({
            "distance_km": 5.0,
            "transport_mode": "car",
            "packaging_type": "plastic",
            "estimated_time_minutes": 30,
            "order_value": 350.0,
            "frequency_per_week": 1
        })))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["carbon_emission_grams"], json!(650.0));
    assert_eq!(payload["eco_score"], json!(20));
    assert_eq!(payload["rating"], json!("Poor"));
    assert_eq!(payload["better_alternatives"][0]["transport_mode"], json!("bike"));
    assert_eq!(
        payload["yearly_projection"]["scale_scenarios"]
            .as_array()
            .map(Vec::len),
        Some(4)
    );
    assert_eq!(payload["data_sources"]["transport_factor"], json!("fallback"));
    assert_eq!(ledger.records().len(), 1);
}

#[tokio::test]
async fn analyze_route_rejects_out_of_range_frequency() {
    let (service, ledger) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(analyze_request(json!({
            "distance_km": 5.0,
            "transport_mode": "bike",
            "packaging_type": "paper",
            "order_value": 100.0,
            "frequency_per_week": 22
        })))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .is_some_and(|message| message.contains("frequency_per_week")));
    assert!(ledger.records().is_empty());
}

#[tokio::test]
async fn analyze_handler_hides_ledger_details() {
    let service = Arc::new(offline_service(Arc::new(UnavailableLedger)));

    let response =
        analyze_handler::<UnavailableLedger>(State(service), axum::Json(submission())).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let payload = read_json_body(response).await;
    assert_eq!(payload, json!({ "error": "internal error" }));
}

#[tokio::test]
async fn compare_route_lists_every_combination() {
    let (service, _) = build_service();
    let router = footprint_router(service);

    let response = router
        .oneshot(
            Request::get("/api/v1/compare-alternatives?distance_km=5")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["total_options"], json!(20));
    assert_eq!(payload["options"][0]["eco_score"], json!(95));
    assert_eq!(payload["options"][19]["transport_mode"], json!("car"));
    assert_eq!(payload["options"][19]["packaging_type"], json!("plastic"));
}

#[tokio::test]
async fn compare_route_rejects_bad_distances() {
    let (service, _) = build_service();

    let negative = footprint_router(service.clone())
        .oneshot(
            Request::get("/api/v1/compare-alternatives?distance_km=-2")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(negative.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let missing = footprint_router(service)
        .oneshot(
            Request::get("/api/v1/compare-alternatives")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn impact_route_aggregates_prior_orders() {
    let (service, _) = build_service();
    service
        .analyze(green_submission("rider-9"))
        .await
        .expect("analysis succeeds");

    let response = footprint_router(service)
        .oneshot(
            Request::get("/api/v1/user-impact/rider-9?days=30")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["total_orders"], json!(1));
    assert_eq!(payload["eco_score"], json!(95));
    assert_eq!(payload["time_period_days"], json!(30));
    assert_eq!(payload["achievements"], json!(["Eco Champion"]));
    let percentile = payload["rank_percentile"].as_u64().expect("percentile present");
    assert!((75..=95).contains(&percentile));
}

#[tokio::test]
async fn impact_handler_defaults_to_a_year() {
    let (service, _) = build_service();

    let response = impact_handler::<MemoryLedger>(
        State(service),
        Path("user_demo".to_string()),
        Query(ImpactQuery::default()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["time_period_days"], json!(365));
    assert_eq!(payload["total_orders"], json!(0));
    assert_eq!(payload["total_carbon_saved_kg"], json!(0.0));
    assert_eq!(payload["achievements"], json!([]));
}
