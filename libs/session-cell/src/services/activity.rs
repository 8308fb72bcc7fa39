use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_database::DataClient;

use crate::models::ActivityEntry;

pub const DEFAULT_ACTIVITY_TABLE: &str = "activity_logs";

/// Best-effort audit trail of user actions. Write failures are logged and
/// swallowed; they never hold up the action being recorded.
pub struct ActivityLogger {
    data: Arc<DataClient>,
    table: String,
}

impl ActivityLogger {
    pub fn new(data: Arc<DataClient>) -> Self {
        Self {
            data,
            table: DEFAULT_ACTIVITY_TABLE.to_string(),
        }
    }

    pub fn with_table(mut self, table: &str) -> Self {
        self.table = table.to_string();
        self
    }

    /// Returns whether the entry was stored.
    pub async fn record(&self, user_id: &str, action: &str, details: Value) -> bool {
        let entry = ActivityEntry {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            action: action.to_string(),
            details,
            created_at: Utc::now(),
        };

        let row = match serde_json::to_value(&entry) {
            Ok(row) => row,
            Err(e) => {
                warn!("Could not serialize activity entry: {}", e);
                return false;
            }
        };

        match self.data.insert(&self.table, row, Some(user_id)).await {
            Ok(_) => {
                debug!("Recorded activity {} for {}", action, user_id);
                true
            }
            Err(e) => {
                warn!("Failed to record activity {} for {}: {}", action, user_id, e);
                false
            }
        }
    }
}
