use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;

use super::handlers::{health_handler, metrics_handler, status_handler, AppState};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/status", get(status_handler))
        .route("/api/metrics", get(metrics_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
