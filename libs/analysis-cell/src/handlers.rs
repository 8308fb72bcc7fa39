use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    Json,
};
use chrono::Utc;
use tracing::{debug, error};

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{AnalysisKind, AnalysisRequest, AnalysisResponse};
use crate::services::{gateway::AiGatewayClient, prompts};

async fn run_analysis(
    config: &AppConfig,
    user: &User,
    kind: AnalysisKind,
    request: AnalysisRequest,
) -> Result<Json<AnalysisResponse>, AppError> {
    debug!("{} requested by {}", kind.function_name(), user.id);

    if request.is_empty() {
        return Err(AppError::BadRequest("payload is required".to_string()));
    }

    let gateway = AiGatewayClient::new(config)
        .map_err(|e| AppError::NotConfigured(e.to_string()))?;

    let completion = gateway
        .complete(prompts::system_prompt(kind), &prompts::user_prompt(kind, &request))
        .await
        .map_err(|e| {
            error!("{} failed: {:#}", kind.function_name(), e);
            AppError::ExternalService(format!("{:#}", e))
        })?;

    Ok(Json(AnalysisResponse {
        success: true,
        analysis: completion.text,
        model: completion.model,
        generated_at: Utc::now(),
    }))
}

pub async fn analyze_denial(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<AnalysisResponse>, AppError> {
    run_analysis(&config, &user, AnalysisKind::DenialAnalysis, request).await
}

pub async fn generate_appeal(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<AnalysisResponse>, AppError> {
    run_analysis(&config, &user, AnalysisKind::AppealLetter, request).await
}

pub async fn review_claim(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<AnalysisResponse>, AppError> {
    run_analysis(&config, &user, AnalysisKind::ClaimReview, request).await
}
