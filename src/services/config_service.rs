//! Application configuration management
//!
//! Every mutation records a before/after audit entry through the audit
//! service; the audit write happens after the data change commits and its
//! failure does not undo the change.

use crate::{
    auth::middleware::AuthContext,
    error::AppError,
    models::{
        audit::ActionType,
        config_entry::{ConfigEntry, ConfigEntryRequest},
    },
    repository::config_entry_repo::ConfigEntryRepository,
    services::audit_service::{AuditService, RequestMeta},
};
use std::sync::Arc;
use uuid::Uuid;

pub struct ConfigService {
    repo: Arc<ConfigEntryRepository>,
    audit: Arc<AuditService>,
}

impl ConfigService {
    pub fn new(repo: Arc<ConfigEntryRepository>, audit: Arc<AuditService>) -> Self {
        Self { repo, audit }
    }

    pub async fn list(&self) -> Result<Vec<ConfigEntry>, AppError> {
        self.repo.list().await
    }

    pub async fn get(&self, id: Uuid) -> Result<ConfigEntry, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Configuration {} not found", id)))
    }

    pub async fn get_by_key(&self, key: &str) -> Result<ConfigEntry, AppError> {
        self.repo
            .find_by_key(key)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Configuration '{}' not found", key)))
    }

    pub async fn create(
        &self,
        actor: &AuthContext,
        req: &ConfigEntryRequest,
        meta: &RequestMeta,
    ) -> Result<ConfigEntry, AppError> {
        if self.repo.exists_by_key(&req.config_key).await? {
            return Err(AppError::Conflict(format!(
                "Configuration key '{}' already exists",
                req.config_key
            )));
        }

        let entry = self.repo.insert(req).await?;

        self.audit
            .record_config_change(
                actor,
                ActionType::Create,
                entry.id,
                None,
                Some(&entry),
                format!("Created configuration '{}'", entry.config_key),
                meta,
            )
            .await;

        tracing::info!(config_key = %entry.config_key, "Configuration created");
        Ok(entry)
    }

    pub async fn update(
        &self,
        actor: &AuthContext,
        id: Uuid,
        req: &ConfigEntryRequest,
        meta: &RequestMeta,
    ) -> Result<ConfigEntry, AppError> {
        let before = self.get(id).await?;

        // Renaming onto an existing key would break the uniqueness invariant
        if before.config_key != req.config_key && self.repo.exists_by_key(&req.config_key).await? {
            return Err(AppError::Conflict(format!(
                "Configuration key '{}' already exists",
                req.config_key
            )));
        }

        let after = self
            .repo
            .update(id, req)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Configuration {} not found", id)))?;

        self.audit
            .record_config_change(
                actor,
                ActionType::Update,
                after.id,
                Some(&before),
                Some(&after),
                format!("Updated configuration '{}'", after.config_key),
                meta,
            )
            .await;

        Ok(after)
    }

    pub async fn toggle_status(
        &self,
        actor: &AuthContext,
        id: Uuid,
        active: bool,
        meta: &RequestMeta,
    ) -> Result<ConfigEntry, AppError> {
        let before = self.get(id).await?;

        let after = self
            .repo
            .set_active(id, active)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Configuration {} not found", id)))?;

        self.audit
            .record_config_change(
                actor,
                ActionType::Update,
                after.id,
                Some(&before),
                Some(&after),
                format!(
                    "Set configuration '{}' {}",
                    after.config_key,
                    if active { "active" } else { "inactive" }
                ),
                meta,
            )
            .await;

        Ok(after)
    }

    /// Soft delete: the row is deactivated, never removed, so past audit
    /// snapshots keep resolving.
    pub async fn delete(
        &self,
        actor: &AuthContext,
        id: Uuid,
        meta: &RequestMeta,
    ) -> Result<(), AppError> {
        let before = self.get(id).await?;

        self.repo
            .set_active(id, false)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Configuration {} not found", id)))?;

        self.audit
            .record_config_change(
                actor,
                ActionType::Delete,
                before.id,
                Some(&before),
                None,
                format!("Deleted configuration '{}'", before.config_key),
                meta,
            )
            .await;

        tracing::info!(config_key = %before.config_key, "Configuration deleted");
        Ok(())
    }
}
