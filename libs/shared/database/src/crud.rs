use std::sync::Arc;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use crate::error::ClientError;
use crate::supabase::{backend_error_message, SupabaseClient};

pub const DEFAULT_CRUD_FUNCTION: &str = "db-proxy";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrudAction {
    Select,
    Insert,
    Update,
    Upsert,
    Delete,
    BulkInsert,
    BulkUpsert,
    BulkDelete,
}

impl CrudAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrudAction::Select => "select",
            CrudAction::Insert => "insert",
            CrudAction::Update => "update",
            CrudAction::Upsert => "upsert",
            CrudAction::Delete => "delete",
            CrudAction::BulkInsert => "bulk_insert",
            CrudAction::BulkUpsert => "bulk_upsert",
            CrudAction::BulkDelete => "bulk_delete",
        }
    }
}

/// Body of one call to the CRUD proxy function.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrudRequest {
    pub action: CrudAction,
    pub table: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_conflict: Option<String>,
}

impl CrudRequest {
    pub fn new(action: CrudAction, table: &str) -> Self {
        Self {
            action,
            table: table.to_string(),
            data: None,
            where_clause: None,
            filter: None,
            user_id: None,
            on_conflict: None,
        }
    }

    pub fn select(table: &str, scope: SelectScope) -> Self {
        let (filter, user_id) = scope.resolve();
        Self {
            filter,
            user_id,
            ..Self::new(CrudAction::Select, table)
        }
    }
}

#[derive(Debug, Deserialize)]
struct CrudResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    error: Option<Value>,
}

/// What a `select` is scoped by: just the caller's identity, or a filter map
/// with an optional identity alongside.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectScope {
    Identity(String),
    Filter {
        filter: Map<String, Value>,
        identity: Option<String>,
    },
}

impl SelectScope {
    /// Splits into the `filter` and `user_id` request fields. An empty filter
    /// is sent as no filter, so `Identity(id)` and an empty `Filter` carrying
    /// `id` produce the same request.
    pub fn resolve(self) -> (Option<Map<String, Value>>, Option<String>) {
        match self {
            SelectScope::Identity(id) => (None, Some(id)),
            SelectScope::Filter { filter, identity } => {
                let filter = if filter.is_empty() { None } else { Some(filter) };
                (filter, identity)
            }
        }
    }
}

impl From<&str> for SelectScope {
    fn from(user_id: &str) -> Self {
        SelectScope::Identity(user_id.to_string())
    }
}

impl From<String> for SelectScope {
    fn from(user_id: String) -> Self {
        SelectScope::Identity(user_id)
    }
}

impl From<Map<String, Value>> for SelectScope {
    fn from(filter: Map<String, Value>) -> Self {
        SelectScope::Filter { filter, identity: None }
    }
}

/// Table-level reads and writes routed through a single proxy function.
pub struct DataClient {
    supabase: Arc<SupabaseClient>,
    function_name: String,
    auth_token: Option<String>,
}

impl DataClient {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self {
            supabase,
            function_name: DEFAULT_CRUD_FUNCTION.to_string(),
            auth_token: None,
        }
    }

    pub fn with_function_name(mut self, name: &str) -> Self {
        self.function_name = name.to_string();
        self
    }

    pub fn with_auth_token(mut self, token: &str) -> Self {
        self.auth_token = Some(token.to_string());
        self
    }

    /// Sends a request and returns the `data` field, failing on any
    /// backend-reported error.
    #[instrument(skip(self, request), fields(action = request.action.as_str(), table = %request.table))]
    pub async fn execute(&self, request: CrudRequest) -> Result<Value, ClientError> {
        debug!("Dispatching {} on {}", request.action.as_str(), request.table);

        let raw = self
            .supabase
            .invoke(&self.function_name, &request, self.auth_token.as_deref())
            .await?;

        let response: CrudResponse = serde_json::from_value(raw)?;

        if let Some(err) = &response.error {
            if !err.is_null() {
                let message = match err {
                    Value::String(msg) => msg.clone(),
                    other => backend_error_message(&serde_json::json!({ "error": other }))
                        .unwrap_or_else(|| other.to_string()),
                };
                warn!("{} on {} failed: {}", request.action.as_str(), request.table, message);
                return Err(ClientError::Backend(message));
            }
        }

        if !response.success {
            return Err(ClientError::Backend(format!(
                "{} on {} failed",
                request.action.as_str(),
                request.table
            )));
        }

        Ok(response.data)
    }

    /// Always a sequence: no rows and `null` both come back empty.
    pub async fn select(
        &self,
        table: &str,
        scope: impl Into<SelectScope>,
    ) -> Result<Vec<Value>, ClientError> {
        let data = self.execute(CrudRequest::select(table, scope.into())).await?;
        Ok(into_rows(data))
    }

    pub async fn select_for_user(&self, table: &str, user_id: &str) -> Result<Vec<Value>, ClientError> {
        self.select(table, SelectScope::Identity(user_id.to_string())).await
    }

    pub async fn select_where(
        &self,
        table: &str,
        filter: Map<String, Value>,
        user_id: Option<&str>,
    ) -> Result<Vec<Value>, ClientError> {
        let scope = SelectScope::Filter {
            filter,
            identity: user_id.map(str::to_string),
        };
        self.select(table, scope).await
    }

    pub async fn select_as<T: DeserializeOwned>(
        &self,
        table: &str,
        scope: impl Into<SelectScope>,
    ) -> Result<Vec<T>, ClientError> {
        self.select(table, scope)
            .await?
            .into_iter()
            .map(|row| serde_json::from_value(row).map_err(ClientError::from))
            .collect()
    }

    pub async fn insert(&self, table: &str, data: Value, user_id: Option<&str>) -> Result<Value, ClientError> {
        let request = CrudRequest {
            data: Some(data),
            user_id: user_id.map(str::to_string),
            ..CrudRequest::new(CrudAction::Insert, table)
        };
        self.execute(request).await
    }

    pub async fn update(
        &self,
        table: &str,
        data: Value,
        where_clause: Map<String, Value>,
        user_id: Option<&str>,
    ) -> Result<Value, ClientError> {
        let request = CrudRequest {
            data: Some(data),
            where_clause: Some(where_clause),
            user_id: user_id.map(str::to_string),
            ..CrudRequest::new(CrudAction::Update, table)
        };
        self.execute(request).await
    }

    pub async fn upsert(
        &self,
        table: &str,
        data: Value,
        on_conflict: Option<&str>,
        user_id: Option<&str>,
    ) -> Result<Value, ClientError> {
        let request = CrudRequest {
            data: Some(data),
            on_conflict: on_conflict.map(str::to_string),
            user_id: user_id.map(str::to_string),
            ..CrudRequest::new(CrudAction::Upsert, table)
        };
        self.execute(request).await
    }

    pub async fn delete(
        &self,
        table: &str,
        where_clause: Map<String, Value>,
        user_id: Option<&str>,
    ) -> Result<Value, ClientError> {
        let request = CrudRequest {
            where_clause: Some(where_clause),
            user_id: user_id.map(str::to_string),
            ..CrudRequest::new(CrudAction::Delete, table)
        };
        self.execute(request).await
    }

    pub async fn bulk_insert(
        &self,
        table: &str,
        rows: Vec<Value>,
        user_id: Option<&str>,
    ) -> Result<Vec<Value>, ClientError> {
        let request = CrudRequest {
            data: Some(Value::Array(rows)),
            user_id: user_id.map(str::to_string),
            ..CrudRequest::new(CrudAction::BulkInsert, table)
        };
        Ok(into_rows(self.execute(request).await?))
    }

    pub async fn bulk_upsert(
        &self,
        table: &str,
        rows: Vec<Value>,
        on_conflict: Option<&str>,
        user_id: Option<&str>,
    ) -> Result<Vec<Value>, ClientError> {
        let request = CrudRequest {
            data: Some(Value::Array(rows)),
            on_conflict: on_conflict.map(str::to_string),
            user_id: user_id.map(str::to_string),
            ..CrudRequest::new(CrudAction::BulkUpsert, table)
        };
        Ok(into_rows(self.execute(request).await?))
    }

    /// Deletes every row whose `id` is in `ids`.
    pub async fn bulk_delete(
        &self,
        table: &str,
        ids: Vec<Value>,
        user_id: Option<&str>,
    ) -> Result<Value, ClientError> {
        let request = CrudRequest {
            data: Some(Value::Array(ids)),
            user_id: user_id.map(str::to_string),
            ..CrudRequest::new(CrudAction::BulkDelete, table)
        };
        self.execute(request).await
    }
}

fn into_rows(data: Value) -> Vec<Value> {
    match data {
        Value::Null => Vec::new(),
        Value::Array(rows) => rows,
        single => vec![single],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identity_and_empty_filter_resolve_identically() {
        let shortcut = CrudRequest::select("claims", SelectScope::from("user-1"));
        let explicit = CrudRequest::select(
            "claims",
            SelectScope::Filter {
                filter: Map::new(),
                identity: Some("user-1".to_string()),
            },
        );
        assert_eq!(shortcut, explicit);
        assert_eq!(
            serde_json::to_value(&shortcut).unwrap(),
            json!({"action": "select", "table": "claims", "user_id": "user-1"})
        );
    }

    #[test]
    fn test_where_clause_serializes_under_reserved_name() {
        let mut where_clause = Map::new();
        where_clause.insert("id".to_string(), json!("c-9"));
        let request = CrudRequest {
            where_clause: Some(where_clause),
            ..CrudRequest::new(CrudAction::Delete, "denials")
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"action": "delete", "table": "denials", "where": {"id": "c-9"}})
        );
    }

    #[test]
    fn test_into_rows_normalizes_shapes() {
        assert!(into_rows(Value::Null).is_empty());
        assert_eq!(into_rows(json!([{"a": 1}, {"a": 2}])).len(), 2);
        assert_eq!(into_rows(json!({"a": 1})), vec![json!({"a": 1})]);
    }

    #[test]
    fn test_action_tags() {
        assert_eq!(serde_json::to_value(CrudAction::BulkUpsert).unwrap(), json!("bulk_upsert"));
        assert_eq!(CrudAction::BulkUpsert.as_str(), "bulk_upsert");
    }
}
