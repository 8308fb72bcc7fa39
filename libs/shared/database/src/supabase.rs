use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION},
    Method, StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

use crate::error::ClientError;
use crate::inflight::InFlightCounter;

pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
    in_flight: InFlightCounter,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_counter(config, InFlightCounter::new())
    }

    /// Builds a client whose calls are tracked in `in_flight`, typically the
    /// same counter handed to the idle monitor.
    pub fn with_counter(config: &AppConfig, in_flight: InFlightCounter) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            anon_key: config.supabase_anon_key.clone(),
            in_flight,
        }
    }

    pub fn in_flight(&self) -> &InFlightCounter {
        &self.in_flight
    }

    fn get_headers(&self, auth_token: Option<&str>) -> Result<HeaderMap, ClientError> {
        let mut headers = HeaderMap::new();

        let api_key = HeaderValue::from_str(&self.anon_key)
            .map_err(|_| ClientError::Transport("Invalid API key header value".to_string()))?;
        headers.insert("apikey", api_key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = auth_token {
            let bearer = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ClientError::Transport("Invalid authorization header value".to_string()))?;
            headers.insert(AUTHORIZATION, bearer);
        }

        Ok(headers)
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<&Value>,
    ) -> Result<Value, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);

        let _call = self.in_flight.begin();

        let headers = self.get_headers(auth_token)?;

        let mut req = self.client.request(method, &url)
            .headers(headers);

        if let Some(body_data) = body {
            req = req.json(body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            error!("API error ({}): {}", status, text);
            return Err(ClientError::Backend(error_message_for(status, &text)));
        }

        Ok(parse_body(text))
    }

    /// Calls the named serverless function: `POST {base}/functions/v1/{name}`.
    pub async fn invoke<B>(
        &self,
        name: &str,
        body: &B,
        auth_token: Option<&str>,
    ) -> Result<Value, ClientError>
    where
        B: Serialize + ?Sized,
    {
        let payload = serde_json::to_value(body)?;
        let path = format!("/functions/v1/{}", name);
        self.request(Method::POST, &path, auth_token, Some(&payload)).await
    }

    pub async fn invoke_as<T, B>(
        &self,
        name: &str,
        body: &B,
        auth_token: Option<&str>,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let value = self.invoke(name, body, auth_token).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Revokes the session server-side.
    pub async fn sign_out(&self, auth_token: &str) -> Result<(), ClientError> {
        self.request(Method::POST, "/auth/v1/logout", Some(auth_token), None)
            .await
            .map(|_| ())
    }
}

/// JSON bodies are parsed; anything else is handed back as a string value.
fn parse_body(text: String) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }

    serde_json::from_str(&text).unwrap_or(Value::String(text))
}

fn error_message_for(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| backend_error_message(&value))
        .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()))
}

/// Pulls the human-readable error out of a backend payload. Accepts
/// `{ "error": "..." }`, `{ "error": { "message": "..." } }` and
/// `{ "message": "..." }`.
pub fn backend_error_message(value: &Value) -> Option<String> {
    match value.get("error") {
        Some(Value::String(msg)) if !msg.is_empty() => return Some(msg.clone()),
        Some(Value::Object(obj)) => {
            if let Some(msg) = obj.get("message").and_then(Value::as_str) {
                return Some(msg.to_string());
            }
        }
        _ => {}
    }

    value
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_backend_error_message_shapes() {
        assert_eq!(
            backend_error_message(&json!({"error": "table missing"})),
            Some("table missing".to_string())
        );
        assert_eq!(
            backend_error_message(&json!({"error": {"message": "bad jwt", "code": "401"}})),
            Some("bad jwt".to_string())
        );
        assert_eq!(
            backend_error_message(&json!({"message": "rate limited"})),
            Some("rate limited".to_string())
        );
        assert_eq!(backend_error_message(&json!({"data": []})), None);
    }

    #[test]
    fn test_error_message_falls_back_to_status() {
        assert_eq!(
            error_message_for(StatusCode::BAD_GATEWAY, "<html>upstream</html>"),
            "Request failed with status 502"
        );
    }

    #[test]
    fn test_parse_body_keeps_raw_text() {
        assert_eq!(parse_body("ok".to_string()), Value::String("ok".to_string()));
        assert_eq!(parse_body("".to_string()), Value::Null);
        assert_eq!(parse_body("{\"a\":1}".to_string()), json!({"a": 1}));
    }
}
