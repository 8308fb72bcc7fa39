use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_WARNING_AFTER: Duration = Duration::from_secs(14 * 60);
pub const DEFAULT_LOGOUT_AFTER: Duration = Duration::from_secs(15 * 60);
pub const DEFAULT_ACTIVITY_THROTTLE: Duration = Duration::from_secs(30);
pub const DEFAULT_SIGN_OUT_TIMEOUT: Duration = Duration::from_secs(10);
pub const AUTH_ENTRY_POINT: &str = "/auth";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdleSettings {
    /// Silence before the "still there?" warning.
    pub warning_after: Duration,
    /// Silence before the forced logout, measured from the same reset point.
    pub logout_after: Duration,
    /// Inputs closer together than this reset the clock at most once.
    pub activity_throttle: Duration,
    /// How long a forced logout waits on the server-side sign-out before
    /// redirecting anyway.
    pub sign_out_timeout: Duration,
    pub auth_entry_point: String,
}

impl Default for IdleSettings {
    fn default() -> Self {
        Self {
            warning_after: DEFAULT_WARNING_AFTER,
            logout_after: DEFAULT_LOGOUT_AFTER,
            activity_throttle: DEFAULT_ACTIVITY_THROTTLE,
            sign_out_timeout: DEFAULT_SIGN_OUT_TIMEOUT,
            auth_entry_point: AUTH_ENTRY_POINT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleState {
    Active,
    WarningShown,
    LoggedOut,
}

/// What the monitor tells the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdleEvent {
    WarningShown { logout_in: Duration },
    /// The clock left the warning state; the prompt should close.
    WarningDismissed,
    LoggedOut { redirect_to: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    RedirectToLogin { to: String },
    Forbidden,
}

/// Row written to the activity log table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: String,
    pub user_id: String,
    pub action: String,
    pub details: Value,
    pub created_at: DateTime<Utc>,
}
