//! Audit trail persistence
//!
//! The table is append-only: this repository exposes insert and read, nothing
//! that could alter a row after the fact.

use crate::{
    error::AppError,
    models::audit::{AuditTrail, AuditTrailFilters, NewAuditEntry},
};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

pub struct AuditRepository {
    pool: PgPool,
}

impl AuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, entry: &NewAuditEntry) -> Result<AuditTrail, AppError> {
        let row = sqlx::query_as::<_, AuditTrail>(
            r#"
            INSERT INTO audit_trail (
                id, actor_id, actor_name, action_type, target_entity,
                target_entity_id, old_value, new_value, action_description,
                action_status, error_message, ip_address, user_agent,
                auth_method, sensitive
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING id, actor_id, actor_name, action_type, target_entity,
                      target_entity_id, old_value, new_value, action_description,
                      action_status, error_message, ip_address, user_agent,
                      auth_method, sensitive, occurred_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(entry.actor_id)
        .bind(&entry.actor_name)
        .bind(entry.action_type.as_str())
        .bind(&entry.target_entity)
        .bind(entry.target_entity_id)
        .bind(&entry.old_value)
        .bind(&entry.new_value)
        .bind(&entry.action_description)
        .bind(entry.action_status.as_str())
        .bind(&entry.error_message)
        .bind(&entry.ip_address)
        .bind(&entry.user_agent)
        .bind(&entry.auth_method)
        .bind(entry.sensitive)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// List entries matching the filters, newest first
    pub async fn query(
        &self,
        filters: &AuditTrailFilters,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AuditTrail>, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT id, actor_id, actor_name, action_type, target_entity, \
             target_entity_id, old_value, new_value, action_description, \
             action_status, error_message, ip_address, user_agent, \
             auth_method, sensitive, occurred_at \
             FROM audit_trail WHERE 1=1",
        );
        Self::apply_filters(&mut builder, filters);

        builder.push(" ORDER BY occurred_at DESC LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        let rows = builder
            .build_query_as::<AuditTrail>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    pub async fn count(&self, filters: &AuditTrailFilters) -> Result<i64, AppError> {
        let mut builder =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM audit_trail WHERE 1=1");
        Self::apply_filters(&mut builder, filters);

        let (count,): (i64,) = builder.build_query_as().fetch_one(&self.pool).await?;
        Ok(count)
    }

    fn apply_filters(builder: &mut QueryBuilder<'_, Postgres>, filters: &AuditTrailFilters) {
        if let Some(actor_id) = filters.actor_id {
            builder.push(" AND actor_id = ");
            builder.push_bind(actor_id);
        }
        if let Some(target_entity) = &filters.target_entity {
            builder.push(" AND target_entity = ");
            builder.push_bind(target_entity.clone());
        }
        if let Some(target_entity_id) = filters.target_entity_id {
            builder.push(" AND target_entity_id = ");
            builder.push_bind(target_entity_id);
        }
        if let Some(action_type) = &filters.action_type {
            builder.push(" AND action_type = ");
            builder.push_bind(action_type.clone());
        }
        if let Some(action_status) = &filters.action_status {
            builder.push(" AND action_status = ");
            builder.push_bind(action_status.clone());
        }
        if let Some(start_time) = filters.start_time {
            builder.push(" AND occurred_at >= ");
            builder.push_bind(start_time);
        }
        if let Some(end_time) = filters.end_time {
            builder.push(" AND occurred_at <= ");
            builder.push_bind(end_time);
        }
    }
}
