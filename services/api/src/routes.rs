use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use eco_intellect::footprint::{footprint_router, FootprintService, OrderLedger};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub(crate) fn with_footprint_routes<L>(service: Arc<FootprintService<L>>) -> axum::Router
where
    L: OrderLedger + 'static,
{
    footprint_router(service)
        .route("/", axum::routing::get(service_info))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .layer(CorsLayer::permissive())
}

pub(crate) async fn service_info(Extension(state): Extension<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "service": "EcoIntellect API",
        "version": env!("CARGO_PKG_VERSION"),
        "live_providers": {
            "emission_factors": state.providers.emission_factors_live,
            "projections": state.providers.projections_live,
        },
        "endpoints": {
            "analyze_order": "POST /api/v1/analyze-order",
            "compare_alternatives": "GET /api/v1/compare-alternatives",
            "user_impact": "GET /api/v1/user-impact/:user_id",
        },
    }))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
