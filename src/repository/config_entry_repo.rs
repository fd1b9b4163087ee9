//! Application configuration entry queries
//!
//! Deletion is a soft deactivate; rows never leave the table, which keeps
//! historical audit snapshots resolvable.

use crate::{
    error::AppError,
    models::config_entry::{ConfigEntry, ConfigEntryRequest},
};
use sqlx::PgPool;
use uuid::Uuid;

pub struct ConfigEntryRepository {
    pool: PgPool,
}

impl ConfigEntryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<ConfigEntry>, AppError> {
        let entries = sqlx::query_as::<_, ConfigEntry>(
            r#"
            SELECT id, config_key, config_value, description, active,
                   created_at, updated_at
            FROM app_configs
            ORDER BY config_key
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ConfigEntry>, AppError> {
        let entry = sqlx::query_as::<_, ConfigEntry>(
            r#"
            SELECT id, config_key, config_value, description, active,
                   created_at, updated_at
            FROM app_configs
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    pub async fn find_by_key(&self, key: &str) -> Result<Option<ConfigEntry>, AppError> {
        let entry = sqlx::query_as::<_, ConfigEntry>(
            r#"
            SELECT id, config_key, config_value, description, active,
                   created_at, updated_at
            FROM app_configs
            WHERE config_key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    pub async fn exists_by_key(&self, key: &str) -> Result<bool, AppError> {
        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM app_configs WHERE config_key = $1)")
                .bind(key)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists.0)
    }

    pub async fn insert(&self, req: &ConfigEntryRequest) -> Result<ConfigEntry, AppError> {
        let entry = sqlx::query_as::<_, ConfigEntry>(
            r#"
            INSERT INTO app_configs (id, config_key, config_value, description, active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, config_key, config_value, description, active,
                      created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&req.config_key)
        .bind(&req.config_value)
        .bind(&req.description)
        .bind(req.active)
        .fetch_one(&self.pool)
        .await?;

        Ok(entry)
    }

    pub async fn update(
        &self,
        id: Uuid,
        req: &ConfigEntryRequest,
    ) -> Result<Option<ConfigEntry>, AppError> {
        let entry = sqlx::query_as::<_, ConfigEntry>(
            r#"
            UPDATE app_configs
            SET config_key = $2,
                config_value = $3,
                description = $4,
                active = $5,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, config_key, config_value, description, active,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&req.config_key)
        .bind(&req.config_value)
        .bind(&req.description)
        .bind(req.active)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    pub async fn set_active(
        &self,
        id: Uuid,
        active: bool,
    ) -> Result<Option<ConfigEntry>, AppError> {
        let entry = sqlx::query_as::<_, ConfigEntry>(
            r#"
            UPDATE app_configs
            SET active = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, config_key, config_value, description, active,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(active)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }
}
