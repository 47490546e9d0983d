//! Administrator surface entities: managed accounts and the activity
//! log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::identity::Role;

/// An account as the user-management endpoints serialise it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagedUser {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub role: Role,
}

impl ManagedUser {
    /// Display name joined from the name parts, falling back to the
    /// email when both are empty.
    pub fn display_name(&self) -> String {
        let joined = format!("{} {}", self.first_name, self.last_name);
        let trimmed = joined.trim();
        if trimmed.is_empty() {
            self.email.clone()
        } else {
            trimmed.to_owned()
        }
    }
}

/// Partial update applied to a managed account.
///
/// Unset fields are omitted from the request body so the backend
/// leaves them untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ManagedUserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl ManagedUserUpdate {
    /// True when the update would change nothing.
    pub const fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.role.is_none()
    }
}

/// One row of the administrator activity log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    pub id: u64,
    #[serde(default)]
    pub actor: Option<i64>,
    #[serde(default)]
    pub actor_email: Option<String>,
    pub action: String,
    #[serde(default)]
    pub target_type: String,
    #[serde(default)]
    pub target_id: String,
    #[serde(default)]
    pub meta: Value,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
