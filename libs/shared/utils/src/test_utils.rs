use std::sync::Arc;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use base64::{Engine as _, engine::general_purpose};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::{AppConfig, DEFAULT_AI_GATEWAY_URL};
use shared_models::auth::{Session, User};

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub ai_gateway_url: String,
    pub ai_models: Vec<String>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            ai_gateway_url: DEFAULT_AI_GATEWAY_URL.to_string(),
            ai_models: vec!["gpt-4o".to_string(), "gpt-4o-mini".to_string()],
        }
    }
}

impl TestConfig {
    /// Points the backend at a mock server.
    pub fn with_backend(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    /// Points the completion gateway at a mock server.
    pub fn with_gateway(url: &str, models: &[&str]) -> Self {
        Self {
            ai_gateway_url: url.to_string(),
            ai_models: models.iter().map(|m| m.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            supabase_jwt_secret: self.jwt_secret.clone(),
            ai_gateway_url: self.ai_gateway_url.clone(),
            ai_gateway_api_key: "test-gateway-key".to_string(),
            ai_models: self.ai_models.clone(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role: "viewer".to_string(),
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn biller(email: &str) -> Self {
        Self::new(email, "biller")
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, "admin")
    }

    pub fn viewer(email: &str) -> Self {
        Self::new(email, "viewer")
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
            metadata: None,
            created_at: Some(Utc::now()),
        }
    }

    pub fn to_session(&self) -> Session {
        Session {
            access_token: format!("test-token-{}", self.id),
            user: self.to_user(),
            expires_at: Some(Utc::now() + Duration::hours(1)),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "email": user.email,
            "role": user.role,
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }
}

/// Canned payloads in the shapes the serverless functions answer with.
pub struct MockBackendResponses;

impl MockBackendResponses {
    pub fn conversion_complete(content: &str) -> Value {
        json!({
            "success": true,
            "content": content,
            "mimeType": "application/pdf"
        })
    }

    pub fn conversion_accepted(job_id: &str) -> Value {
        json!({
            "success": true,
            "async": true,
            "job_id": job_id
        })
    }

    pub fn job_processing() -> Value {
        json!({ "status": "processing" })
    }

    pub fn job_complete(content: &str) -> Value {
        json!({
            "status": "complete",
            "result": {
                "content": content,
                "filename": "converted.pdf",
                "mimeType": "application/pdf"
            }
        })
    }

    pub fn job_error(message: &str) -> Value {
        json!({ "status": "error", "error": message })
    }

    pub fn crud_rows(action: &str, table: &str, rows: Value) -> Value {
        json!({
            "success": true,
            "action": action,
            "table": table,
            "data": rows
        })
    }

    pub fn completion(content: &str, model: &str) -> Value {
        json!({
            "id": format!("chatcmpl-{}", Uuid::new_v4()),
            "model": model,
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }]
        })
    }

    pub fn error_response(message: &str, code: &str) -> Value {
        json!({
            "error": {
                "message": message,
                "code": code
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::with_backend("http://127.0.0.1:9999");
        let app_config = config.to_app_config();

        assert_eq!(app_config.supabase_url, "http://127.0.0.1:9999");
        assert_eq!(app_config.supabase_anon_key, "test-anon-key");
        assert!(app_config.is_configured());
        assert!(app_config.is_ai_gateway_configured());
    }

    #[test]
    fn test_user_creation() {
        let user = TestUser::biller("billing@example.com");
        assert_eq!(user.role, "biller");

        let session = user.to_session();
        assert_eq!(session.user.id, user.id);
        assert!(!session.is_expired(Utc::now()));
    }

    #[test]
    fn test_jwt_token_creation() {
        let user = TestUser::default();
        let token = JwtTestUtils::create_test_token(&user, "test-secret", Some(1));

        assert_eq!(token.split('.').count(), 3);
    }
}
