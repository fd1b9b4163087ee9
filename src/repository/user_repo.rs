//! User account queries

use crate::{
    error::AppError,
    models::user::{Principal, UserAccount},
};
use sqlx::PgPool;
use std::collections::HashSet;

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch an active account by email. Deactivated accounts are invisible
    /// here so the caller cannot distinguish them from unknown ones.
    pub async fn find_active_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserAccount>, AppError> {
        let user = sqlx::query_as::<_, UserAccount>(
            r#"
            SELECT id, first_name, last_name, email, phone_number,
                   password_hash, active, created_at, updated_at
            FROM user_accounts
            WHERE email = $1 AND active = TRUE
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Resolve the flattened permission set for an active account in one
    /// round trip. Permissions arriving through several roles collapse into
    /// a single set; an account with no roles yields an empty one.
    pub async fn find_principal_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Principal>, AppError> {
        let rows = sqlx::query_as::<_, PrincipalRow>(
            r#"
            SELECT u.id AS user_id,
                   u.email,
                   u.first_name,
                   u.last_name,
                   p.name AS permission
            FROM user_accounts u
            LEFT JOIN user_account_roles ur ON ur.user_id = u.id
            LEFT JOIN role_permissions rp ON rp.role_id = ur.role_id
            LEFT JOIN permissions p ON p.id = rp.permission_id
            WHERE u.email = $1 AND u.active = TRUE
            "#,
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await?;

        let Some(first) = rows.first() else {
            return Ok(None);
        };

        let mut permissions = HashSet::new();
        let display_name = format!("{} {}", first.first_name, first.last_name);
        let principal_base = (first.user_id, first.email.clone());

        for row in &rows {
            if let Some(name) = &row.permission {
                permissions.insert(name.clone());
            }
        }

        Ok(Some(Principal {
            user_id: principal_base.0,
            email: principal_base.1,
            display_name,
            permissions,
        }))
    }
}

#[derive(sqlx::FromRow)]
struct PrincipalRow {
    user_id: uuid::Uuid,
    email: String,
    first_name: String,
    last_name: String,
    permission: Option<String>,
}
