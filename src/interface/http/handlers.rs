use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::adapters::MemorySink;
use crate::application::StatusBoard;
use crate::domain::MetricPoint;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub status: Arc<StatusBoard>,
    pub latest: Arc<MemorySink>,
}

/// Response for /api/metrics
#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub timestamp: String,
    pub metrics: Vec<MetricPoint>,
}

/// Query params for /api/metrics
#[derive(Debug, Deserialize)]
pub struct MetricsQuery {
    pub prefix: Option<String>,
}

/// Handler for GET /api/health
pub async fn health_handler() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "healthy",
            "service": "ctrstat"
        })),
    )
}

/// Handler for GET /api/status
pub async fn status_handler(State(state): State<AppState>) -> Response {
    match state.status.last().await {
        Some(summary) => (StatusCode::OK, Json(summary)).into_response(),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "status": "no poll completed yet" })),
        )
            .into_response(),
    }
}

/// Handler for GET /api/metrics
pub async fn metrics_handler(
    State(state): State<AppState>,
    Query(params): Query<MetricsQuery>,
) -> Json<MetricsResponse> {
    let metrics = state
        .latest
        .snapshot()
        .into_iter()
        .filter(|point| match &params.prefix {
            Some(prefix) => point.name.starts_with(prefix.as_str()),
            None => true,
        })
        .collect();

    Json(MetricsResponse {
        timestamp: chrono::Utc::now().to_rfc3339(),
        metrics,
    })
}
