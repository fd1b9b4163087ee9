//! Audit recording
//!
//! Every state change and authentication attempt leaves an immutable trail
//! entry. Two hard rules hold throughout:
//!
//! 1. Snapshots are redacted before they leave this module. A value whose key
//!    looks secret-bearing is replaced with a fixed marker; the original
//!    never reaches storage.
//! 2. A failed audit write never fails the business operation. It is logged
//!    and counted, and the caller proceeds.

use crate::{
    auth::middleware::AuthContext,
    error::AppError,
    models::audit::{ActionStatus, ActionType, AuditTrail, AuditTrailFilters, NewAuditEntry},
    models::config_entry::ConfigEntry,
    repository::audit_repo::AuditRepository,
};
use axum::http::{header, HeaderMap};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// Replaces any secret-bearing value in stored snapshots
pub const REDACTION_MARKER: &str = "*****";

/// Client-side request metadata captured alongside each entry
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub auth_method: Option<String>,
}

impl RequestMeta {
    /// Derive metadata from request headers. The client address is the first
    /// hop of `x-forwarded-for`, falling back to `x-real-ip`.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let ip_address = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .or_else(|| {
                headers
                    .get("x-real-ip")
                    .and_then(|v| v.to_str().ok())
                    .map(|v| v.trim().to_string())
            });

        let user_agent = headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());

        let auth_method = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .filter(|v| v.starts_with("Bearer "))
            .map(|_| "JWT".to_string());

        Self {
            ip_address,
            user_agent,
            auth_method,
        }
    }
}

/// True when a key plausibly names a secret. Matching is case-insensitive
/// containment, so `dbPassword` and `API_TOKEN` both qualify.
pub fn is_sensitive_key(key: &str) -> bool {
    let lowered = key.to_lowercase();
    ["password", "secret", "token"]
        .iter()
        .any(|marker| lowered.contains(marker))
}

pub struct AuditService {
    repo: Arc<AuditRepository>,
}

impl AuditService {
    pub fn new(repo: Arc<AuditRepository>) -> Self {
        Self { repo }
    }

    /// Redacted JSON snapshot of a configuration entry. Serialization goes
    /// through `serde_json`'s ordered maps, so equal entries always produce
    /// byte-identical snapshots.
    pub fn snapshot(entry: &ConfigEntry) -> serde_json::Value {
        let sensitive = is_sensitive_key(&entry.config_key);
        json!({
            "config_key": entry.config_key,
            "config_value": if sensitive {
                REDACTION_MARKER.to_string()
            } else {
                entry.config_value.clone()
            },
            "description": entry.description,
            "active": entry.active,
        })
    }

    /// Record a configuration change. `old` is absent on create, `new` on
    /// delete. The returned future resolves once the write attempt finishes
    /// either way; errors stop here.
    pub async fn record_config_change(
        &self,
        actor: &AuthContext,
        action: ActionType,
        entry_id: Uuid,
        old: Option<&ConfigEntry>,
        new: Option<&ConfigEntry>,
        description: String,
        meta: &RequestMeta,
    ) {
        let sensitive = old
            .map(|e| is_sensitive_key(&e.config_key))
            .or_else(|| new.map(|e| is_sensitive_key(&e.config_key)))
            .unwrap_or(false);

        let entry = NewAuditEntry {
            actor_id: actor.user_id,
            actor_name: actor.display_name.clone(),
            action_type: action,
            target_entity: "AppConfig".to_string(),
            target_entity_id: Some(entry_id),
            old_value: old.map(Self::snapshot),
            new_value: new.map(Self::snapshot),
            action_description: description,
            action_status: ActionStatus::Success,
            error_message: None,
            ip_address: meta.ip_address.clone(),
            user_agent: meta.user_agent.clone(),
            auth_method: meta.auth_method.clone(),
            sensitive,
        };

        self.record(entry).await;
    }

    /// Record a login attempt, successful or not
    pub async fn record_login(
        &self,
        actor_id: Uuid,
        actor_name: &str,
        status: ActionStatus,
        error_message: Option<String>,
        meta: &RequestMeta,
    ) {
        let description = match status {
            ActionStatus::Success => format!("User {} logged in", actor_name),
            _ => format!("Failed login attempt for {}", actor_name),
        };

        let entry = NewAuditEntry {
            actor_id,
            actor_name: actor_name.to_string(),
            action_type: ActionType::Login,
            target_entity: "UserAccount".to_string(),
            target_entity_id: Some(actor_id),
            old_value: None,
            new_value: None,
            action_description: description,
            action_status: status,
            error_message,
            ip_address: meta.ip_address.clone(),
            user_agent: meta.user_agent.clone(),
            auth_method: Some("PASSWORD".to_string()),
            sensitive: false,
        };

        self.record(entry).await;
    }

    /// Persist an entry. Failures are logged and counted, never propagated;
    /// the audited operation's outcome must not hinge on audit storage.
    async fn record(&self, entry: NewAuditEntry) {
        if let Err(e) = self.repo.insert(&entry).await {
            metrics::counter!("audit_write_failures_total").increment(1);
            tracing::error!(
                action_type = entry.action_type.as_str(),
                target_entity = %entry.target_entity,
                error = %e,
                "Failed to persist audit entry"
            );
        }
    }

    pub async fn query(
        &self,
        filters: &AuditTrailFilters,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AuditTrail>, AppError> {
        self.repo.query(filters, limit, offset).await
    }

    pub async fn count(&self, filters: &AuditTrailFilters) -> Result<i64, AppError> {
        self.repo.count(filters).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(key: &str, value: &str) -> ConfigEntry {
        ConfigEntry {
            id: Uuid::new_v4(),
            config_key: key.to_string(),
            config_value: value.to_string(),
            description: Some("test entry".to_string()),
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_sensitive_key_detection() {
        assert!(is_sensitive_key("db.password"));
        assert!(is_sensitive_key("API_TOKEN"));
        assert!(is_sensitive_key("clientSecret"));
        assert!(is_sensitive_key("PASSWORD"));
        assert!(!is_sensitive_key("feature.flag"));
        assert!(!is_sensitive_key("max_connections"));
    }

    #[test]
    fn test_snapshot_redacts_sensitive_value() {
        let snap = AuditService::snapshot(&entry("smtp.password", "hunter2"));
        assert_eq!(snap["config_value"], REDACTION_MARKER);
        assert_eq!(snap["config_key"], "smtp.password");
        assert!(!snap.to_string().contains("hunter2"));
    }

    #[test]
    fn test_snapshot_keeps_plain_value() {
        let snap = AuditService::snapshot(&entry("feature.flag", "enabled"));
        assert_eq!(snap["config_value"], "enabled");
    }

    #[test]
    fn test_snapshot_is_deterministic() {
        let e = entry("feature.flag", "enabled");
        let a = AuditService::snapshot(&e).to_string();
        let b = AuditService::snapshot(&e).to_string();
        assert_eq!(a, b);
    }

    #[test]
    fn test_redaction_is_idempotent() {
        // A snapshot whose value is already the marker stays the marker
        let snap = AuditService::snapshot(&entry("api.token", REDACTION_MARKER));
        assert_eq!(snap["config_value"], REDACTION_MARKER);
    }

    #[test]
    fn test_meta_takes_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.9, 10.0.0.1".parse().unwrap());
        headers.insert(header::USER_AGENT, "curl/8.0".parse().unwrap());
        headers.insert(header::AUTHORIZATION, "Bearer abc".parse().unwrap());

        let meta = RequestMeta::from_headers(&headers);
        assert_eq!(meta.ip_address.as_deref(), Some("203.0.113.9"));
        assert_eq!(meta.user_agent.as_deref(), Some("curl/8.0"));
        assert_eq!(meta.auth_method.as_deref(), Some("JWT"));
    }

    #[test]
    fn test_meta_falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "198.51.100.7".parse().unwrap());

        let meta = RequestMeta::from_headers(&headers);
        assert_eq!(meta.ip_address.as_deref(), Some("198.51.100.7"));
        assert_eq!(meta.auth_method, None);
    }
}
