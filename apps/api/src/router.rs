use std::sync::Arc;

use axum::{
    Json,
    Router,
    routing::get,
};
use serde_json::{json, Value};

use analysis_cell::analysis_routes;
use shared_config::AppConfig;

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "RCM functions API is running!" }))
        .route("/health", get(health))
        .merge(analysis_routes(state))
}
