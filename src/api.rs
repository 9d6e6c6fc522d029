use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::{domain::UsageRecord, model::BaselineModel, store::UsageStore};

/// Shared handles injected into every handler. The store is internally
/// locked; the model is immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<UsageStore>,
    pub model: Arc<BaselineModel>,
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ApiError {
    #[error("Hour must be between 0 and 23")]
    HourOutOfRange,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::HourOutOfRange => StatusCode::BAD_REQUEST,
        };
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/energy/usage", post(record_usage).get(get_usage))
        .route("/api/energy/optimize", get(optimize))
        .with_state(state)
}

async fn record_usage(
    State(state): State<AppState>,
    Json(record): Json<UsageRecord>,
) -> Json<serde_json::Value> {
    metrics::counter!("usage_records_total").increment(1);

    let total = state.store.append(record);
    tracing::debug!(total_records = total, "usage record stored");
    Json(json!({ "status": "ok", "total_records": total }))
}

#[derive(Debug, Deserialize)]
struct UsageQuery {
    #[serde(default = "default_limit")]
    limit: i64,
}

fn default_limit() -> i64 {
    10
}

async fn get_usage(
    State(state): State<AppState>,
    Query(query): Query<UsageQuery>,
) -> Json<Vec<UsageRecord>> {
    metrics::counter!("usage_query_requests_total").increment(1);
    Json(state.store.tail(query.limit))
}

#[derive(Debug, Deserialize)]
struct OptimizeQuery {
    hour: i64,
}

async fn optimize(
    State(state): State<AppState>,
    Query(query): Query<OptimizeQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    metrics::counter!("optimize_requests_total").increment(1);

    if !(0..=23).contains(&query.hour) {
        metrics::counter!("optimize_rejected_total").increment(1);
        return Err(ApiError::HourOutOfRange);
    }

    let baseline = round2(state.model.predict(query.hour));
    Ok(Json(json!({
        "hour": query.hour,
        "baseline": baseline,
        "advice": advice_for(baseline),
    })))
}

/// Categorical recommendation for a rounded baseline. Both thresholds are
/// exclusive: baselines of exactly 1.5 or 2.0 are "Moderate load".
pub fn advice_for(baseline: f64) -> &'static str {
    if baseline < 1.5 {
        "Run heavy devices now"
    } else if baseline > 2.0 {
        "Avoid peak; defer tasks"
    } else {
        "Moderate load"
    }
}

/// Rounds to two decimals, the wire precision of the baseline.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
