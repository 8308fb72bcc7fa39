use anyhow::{anyhow, Result};
use reqwest::{header, Client};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use shared_config::AppConfig;

use crate::models::Completion;

pub struct AiGatewayClient {
    http_client: Client,
    url: String,
    api_key: String,
    models: Vec<String>,
}

impl AiGatewayClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        if !config.is_ai_gateway_configured() {
            return Err(anyhow!("AI gateway is not configured"));
        }

        Ok(Self {
            http_client: Client::new(),
            url: config.ai_gateway_url.clone(),
            api_key: config.ai_gateway_api_key.clone(),
            models: config.ai_models.clone(),
        })
    }

    /// Tries each configured model in order and returns the first answer.
    pub async fn complete(&self, system: &str, user: &str) -> Result<Completion> {
        let mut last_error = None;

        for model in &self.models {
            match self.complete_with(model, system, user).await {
                Ok(text) => {
                    info!("Completion served by {}", model);
                    return Ok(Completion {
                        text,
                        model: model.clone(),
                    });
                }
                Err(e) => {
                    warn!("Model {} failed, trying next: {}", model, e);
                    last_error = Some(e);
                }
            }
        }

        Err(match last_error {
            Some(e) => e.context("All configured models failed"),
            None => anyhow!("No completion models configured"),
        })
    }

    async fn complete_with(&self, model: &str, system: &str, user: &str) -> Result<String> {
        debug!("Requesting completion from {}", model);

        let prompt = json!({
            "model": model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user }
            ],
            "temperature": 0.3
        });

        let response = self.http_client.post(&self.url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(header::CONTENT_TYPE, "application/json")
            .json(&prompt)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            return Err(anyhow!("Gateway error ({}): {}", status, error_text));
        }

        let reply: Value = response.json().await?;
        reply["choices"][0]["message"]["content"]
            .as_str()
            .filter(|text| !text.trim().is_empty())
            .map(str::to_string)
            .ok_or_else(|| anyhow!("Invalid completion response format"))
    }
}
