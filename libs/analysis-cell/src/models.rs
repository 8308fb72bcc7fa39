use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisKind {
    DenialAnalysis,
    AppealLetter,
    ClaimReview,
}

impl AnalysisKind {
    pub fn function_name(&self) -> &'static str {
        match self {
            AnalysisKind::DenialAnalysis => "analyze-denial",
            AnalysisKind::AppealLetter => "generate-appeal",
            AnalysisKind::ClaimReview => "review-claim",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// The claim, denial or appeal record as the dashboard holds it.
    #[serde(default)]
    pub payload: Value,
    /// Free-text notes from the user.
    #[serde(default)]
    pub context: Option<String>,
}

impl AnalysisRequest {
    pub fn is_empty(&self) -> bool {
        match &self.payload {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub success: bool,
    pub analysis: String,
    pub model: String,
    pub generated_at: DateTime<Utc>,
}

/// Text produced by the gateway and the model that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub model: String,
}
