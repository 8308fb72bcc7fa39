use std::sync::Arc;

use axum::{
    Router,
    routing::post,
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn analysis_routes(state: Arc<AppConfig>) -> Router {
    let protected_routes = Router::new()
        .route("/functions/v1/analyze-denial", post(handlers::analyze_denial))
        .route("/functions/v1/generate-appeal", post(handlers::generate_appeal))
        .route("/functions/v1/review-claim", post(handlers::review_claim))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(protected_routes)
        .with_state(state)
}
