//! Audit trail domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of audited action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    Create,
    Update,
    Delete,
    Login,
    Logout,
    Access,
    SystemEvent,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Create => "CREATE",
            ActionType::Update => "UPDATE",
            ActionType::Delete => "DELETE",
            ActionType::Login => "LOGIN",
            ActionType::Logout => "LOGOUT",
            ActionType::Access => "ACCESS",
            ActionType::SystemEvent => "SYSTEM_EVENT",
        }
    }
}

/// Outcome of an audited action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionStatus {
    Success,
    Failure,
    Partial,
    Denied,
}

impl ActionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionStatus::Success => "SUCCESS",
            ActionStatus::Failure => "FAILURE",
            ActionStatus::Partial => "PARTIAL",
            ActionStatus::Denied => "DENIED",
        }
    }
}

/// One immutable audit trail row. Never updated or deleted once written.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuditTrail {
    pub id: Uuid,
    pub actor_id: Uuid,
    pub actor_name: String,
    pub action_type: String,
    pub target_entity: String,
    pub target_entity_id: Option<Uuid>,
    pub old_value: Option<serde_json::Value>,
    pub new_value: Option<serde_json::Value>,
    pub action_description: String,
    pub action_status: String,
    pub error_message: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub auth_method: Option<String>,
    pub sensitive: bool,
    pub occurred_at: DateTime<Utc>,
}

/// Fields for a new audit trail row; id and timestamp are assigned on insert
#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub actor_id: Uuid,
    pub actor_name: String,
    pub action_type: ActionType,
    pub target_entity: String,
    pub target_entity_id: Option<Uuid>,
    pub old_value: Option<serde_json::Value>,
    pub new_value: Option<serde_json::Value>,
    pub action_description: String,
    pub action_status: ActionStatus,
    pub error_message: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub auth_method: Option<String>,
    pub sensitive: bool,
}

/// Audit trail query filters
#[derive(Debug, Default, Deserialize)]
pub struct AuditTrailFilters {
    pub actor_id: Option<Uuid>,
    pub target_entity: Option<String>,
    pub target_entity_id: Option<Uuid>,
    pub action_type: Option<String>,
    pub action_status: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}
