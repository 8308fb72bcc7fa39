use std::sync::Arc;

use assert_matches::assert_matches;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared_config::{AppConfig, DEFAULT_AI_GATEWAY_URL};
use shared_database::{ClientError, DataClient, SelectScope, SupabaseClient};

fn data_client(server: &MockServer) -> DataClient {
    let config = AppConfig {
        supabase_url: server.uri(),
        supabase_anon_key: "test-anon-key".to_string(),
        supabase_jwt_secret: String::new(),
        ai_gateway_url: DEFAULT_AI_GATEWAY_URL.to_string(),
        ai_gateway_api_key: String::new(),
        ai_models: Vec::new(),
    };
    DataClient::new(Arc::new(SupabaseClient::new(&config))).with_auth_token("session-token")
}

fn crud_ok(action: &str, table: &str, data: Value) -> Value {
    json!({"success": true, "action": action, "table": table, "data": data})
}

#[tokio::test]
async fn test_select_identity_shortcut_matches_filter_form() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/functions/v1/db-proxy"))
        .and(body_json(json!({"action": "select", "table": "claims", "user_id": "user-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(crud_ok(
            "select",
            "claims",
            json!([{"id": "c-1"}, {"id": "c-2"}]),
        )))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = data_client(&mock_server);

    let by_identity = client.select("claims", "user-1").await.unwrap();
    let by_filter = client.select_where("claims", Map::new(), Some("user-1")).await.unwrap();

    assert_eq!(by_identity, by_filter);
    assert_eq!(by_identity.len(), 2);
}

#[tokio::test]
async fn test_select_with_filter_sends_filter_map() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/functions/v1/db-proxy"))
        .and(body_json(json!({
            "action": "select",
            "table": "denials",
            "filter": {"status": "open"},
            "user_id": "user-7"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(crud_ok(
            "select",
            "denials",
            json!([{"id": "d-1", "status": "open"}]),
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut filter = Map::new();
    filter.insert("status".to_string(), json!("open"));

    let rows = data_client(&mock_server)
        .select(
            "denials",
            SelectScope::Filter {
                filter,
                identity: Some("user-7".to_string()),
            },
        )
        .await
        .unwrap();

    assert_eq!(rows, vec![json!({"id": "d-1", "status": "open"})]);
}

#[tokio::test]
async fn test_select_null_data_is_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/functions/v1/db-proxy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(crud_ok("select", "appeals", Value::Null)))
        .mount(&mock_server)
        .await;

    let rows = data_client(&mock_server).select_for_user("appeals", "user-1").await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_select_as_deserializes_rows() {
    #[derive(Debug, Deserialize, PartialEq)]
    struct Claim {
        id: String,
        amount_cents: i64,
    }

    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/functions/v1/db-proxy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(crud_ok(
            "select",
            "claims",
            json!([{"id": "c-1", "amount_cents": 12500}]),
        )))
        .mount(&mock_server)
        .await;

    let claims: Vec<Claim> = data_client(&mock_server).select_as("claims", "user-1").await.unwrap();
    assert_eq!(claims, vec![Claim { id: "c-1".to_string(), amount_cents: 12500 }]);
}

#[tokio::test]
async fn test_backend_error_is_surfaced() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/functions/v1/db-proxy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "action": "insert",
            "table": "audits",
            "data": null,
            "error": "permission denied for table audits"
        })))
        .mount(&mock_server)
        .await;

    let err = data_client(&mock_server)
        .insert("audits", json!({"note": "x"}), Some("user-1"))
        .await
        .unwrap_err();

    assert_matches!(err, ClientError::Backend(ref msg) if msg == "permission denied for table audits");
}

#[tokio::test]
async fn test_unsuccessful_without_message_still_fails() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/functions/v1/db-proxy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false, "data": null})))
        .mount(&mock_server)
        .await;

    let err = data_client(&mock_server)
        .delete("denials", Map::new(), None)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "delete on denials failed");
}

#[tokio::test]
async fn test_upsert_and_bulk_insert_bodies() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/functions/v1/db-proxy"))
        .and(body_json(json!({
            "action": "upsert",
            "table": "insurance_verifications",
            "data": {"patient_id": "p-1", "status": "verified"},
            "user_id": "user-1",
            "on_conflict": "patient_id"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(crud_ok(
            "upsert",
            "insurance_verifications",
            json!({"patient_id": "p-1", "status": "verified"}),
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/functions/v1/db-proxy"))
        .and(body_json(json!({
            "action": "bulk_insert",
            "table": "claims",
            "data": [{"id": "c-1"}, {"id": "c-2"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(crud_ok(
            "bulk_insert",
            "claims",
            json!([{"id": "c-1"}, {"id": "c-2"}]),
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = data_client(&mock_server);

    let upserted = client
        .upsert(
            "insurance_verifications",
            json!({"patient_id": "p-1", "status": "verified"}),
            Some("patient_id"),
            Some("user-1"),
        )
        .await
        .unwrap();
    assert_eq!(upserted["status"], "verified");

    let inserted = client
        .bulk_insert("claims", vec![json!({"id": "c-1"}), json!({"id": "c-2"})], None)
        .await
        .unwrap();
    assert_eq!(inserted.len(), 2);
}
