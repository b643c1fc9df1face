use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;

use super::domain::{OrderSubmission, UserId};
use super::ledger::OrderLedger;
use super::service::FootprintService;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct CompareQuery {
    pub distance_km: f64,
}

#[derive(Debug, Default, Deserialize)]
pub struct ImpactQuery {
    #[serde(default)]
    pub days: Option<u32>,
}

/// Router builder exposing the analysis, comparison, and impact endpoints.
pub fn footprint_router<L>(service: Arc<FootprintService<L>>) -> Router
where
    L: OrderLedger + 'static,
{
    Router::new()
        .route("/api/v1/analyze-order", post(analyze_handler::<L>))
        .route("/api/v1/compare-alternatives", get(compare_handler::<L>))
        .route("/api/v1/user-impact/:user_id", get(impact_handler::<L>))
        .with_state(service)
}

pub(crate) async fn analyze_handler<L>(
    State(service): State<Arc<FootprintService<L>>>,
    axum::Json(submission): axum::Json<OrderSubmission>,
) -> Response
where
    L: OrderLedger + 'static,
{
    match service.analyze(submission).await {
        Ok(analysis) => (StatusCode::OK, axum::Json(analysis)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub(crate) async fn compare_handler<L>(
    State(service): State<Arc<FootprintService<L>>>,
    Query(query): Query<CompareQuery>,
) -> Response
where
    L: OrderLedger + 'static,
{
    match service.compare(query.distance_km).await {
        Ok(matrix) => (StatusCode::OK, axum::Json(matrix)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub(crate) async fn impact_handler<L>(
    State(service): State<Arc<FootprintService<L>>>,
    Path(user_id): Path<String>,
    Query(query): Query<ImpactQuery>,
) -> Response
where
    L: OrderLedger + 'static,
{
    match service.user_impact(&UserId(user_id), query.days).await {
        Ok(impact) => (StatusCode::OK, axum::Json(impact)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}
