//! Application configuration entry models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Configuration entry row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ConfigEntry {
    pub id: Uuid,
    pub config_key: String,
    pub config_value: String,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/update request for a configuration entry
#[derive(Debug, Deserialize, Validate)]
pub struct ConfigEntryRequest {
    #[validate(length(min = 1, max = 100, message = "config_key must be 1-100 characters"))]
    pub config_key: String,

    #[validate(length(min = 1, max = 500, message = "config_value must be 1-500 characters"))]
    pub config_value: String,

    #[validate(length(max = 1000, message = "description must be at most 1000 characters"))]
    pub description: Option<String>,

    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Query parameters for the status toggle endpoint
#[derive(Debug, Deserialize)]
pub struct ToggleStatusQuery {
    pub active: bool,
}

/// Configuration entry response
#[derive(Debug, Serialize)]
pub struct ConfigEntryResponse {
    pub id: Uuid,
    pub config_key: String,
    pub config_value: String,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ConfigEntry> for ConfigEntryResponse {
    fn from(entry: ConfigEntry) -> Self {
        Self {
            id: entry.id,
            config_key: entry.config_key,
            config_value: entry.config_value,
            description: entry.description,
            active: entry.active,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        }
    }
}
