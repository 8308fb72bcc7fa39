use std::env;
use tracing::warn;

pub const DEFAULT_AI_GATEWAY_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_AI_MODELS: &str = "gpt-4o,gpt-4o-mini,gpt-4-turbo";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_jwt_secret: String,
    pub ai_gateway_url: String,
    pub ai_gateway_api_key: String,
    /// Completion models, tried in order until one succeeds.
    pub ai_models: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            supabase_jwt_secret: env::var("SUPABASE_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            ai_gateway_url: env::var("AI_GATEWAY_URL")
                .unwrap_or_else(|_| {
                    warn!("AI_GATEWAY_URL not set, using default");
                    DEFAULT_AI_GATEWAY_URL.to_string()
                }),
            ai_gateway_api_key: env::var("AI_GATEWAY_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("AI_GATEWAY_API_KEY not set, using empty value");
                    String::new()
                }),
            ai_models: parse_model_list(
                &env::var("AI_MODELS").unwrap_or_else(|_| DEFAULT_AI_MODELS.to_string()),
            ),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_anon_key.is_empty()
            && !self.supabase_jwt_secret.is_empty()
    }

    pub fn is_ai_gateway_configured(&self) -> bool {
        !self.ai_gateway_url.is_empty()
            && !self.ai_gateway_api_key.is_empty()
            && !self.ai_models.is_empty()
    }
}

/// Splits a comma-separated model list, dropping blanks.
pub fn parse_model_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}
