use chrono::{DateTime, Utc};
use tracing::debug;

use shared_database::ClientError;
use shared_models::auth::Session;

use crate::models::{GuardDecision, AUTH_ENTRY_POINT};

/// Role check for one protected route. An empty role list admits any
/// signed-in user.
#[derive(Debug, Clone, Default)]
pub struct RouteGuard {
    allowed_roles: Vec<String>,
    login_path: String,
}

impl RouteGuard {
    pub fn any_authenticated() -> Self {
        Self {
            allowed_roles: Vec::new(),
            login_path: AUTH_ENTRY_POINT.to_string(),
        }
    }

    pub fn for_roles(roles: &[&str]) -> Self {
        Self {
            allowed_roles: roles.iter().map(|r| r.to_string()).collect(),
            login_path: AUTH_ENTRY_POINT.to_string(),
        }
    }

    pub fn check(&self, session: Option<&Session>, now: DateTime<Utc>) -> GuardDecision {
        let session = match session {
            Some(s) if !s.is_expired(now) => s,
            _ => {
                debug!("No live session, redirecting to {}", self.login_path);
                return GuardDecision::RedirectToLogin {
                    to: self.login_path.clone(),
                };
            }
        };

        if self.allowed_roles.is_empty() {
            return GuardDecision::Allow;
        }

        let roles: Vec<&str> = self.allowed_roles.iter().map(String::as_str).collect();
        if session.user.has_any_role(&roles) {
            GuardDecision::Allow
        } else {
            debug!("User {} lacks a role for this route", session.user.id);
            GuardDecision::Forbidden
        }
    }
}

pub fn require_session(session: Option<&Session>) -> Result<&Session, ClientError> {
    session.ok_or(ClientError::AuthRequired)
}
