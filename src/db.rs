//! Database pool, migrations and bootstrap seeding

use crate::{
    auth::password::{validate_password_policy, PasswordHasher},
    config::{AppConfig, DatabaseConfig},
    error::AppError,
};
use secrecy::ExposeSecret;
use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use std::time::Duration;

/// Create the PostgreSQL connection pool
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, AppError> {
    tracing::debug!("Creating database connection pool...");

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .test_before_acquire(true)
        .connect(config.url.expose_secret())
        .await?;

    tracing::info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Database pool created"
    );

    Ok(pool)
}

/// Run pending migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    tracing::info!("Running database migrations...");

    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| AppError::Internal(format!("Migration failed: {}", e)))?;

    tracing::info!("Migrations completed");
    Ok(())
}

/// Database health check
pub async fn health_check(pool: &PgPool) -> HealthStatus {
    match sqlx::query("SELECT 1").fetch_one(pool).await {
        Ok(_) => HealthStatus::Healthy,
        Err(e) => {
            tracing::warn!("Database health check failed: {}", e);
            HealthStatus::Unhealthy(e.to_string())
        }
    }
}

/// Health status
#[derive(Debug, Clone)]
pub enum HealthStatus {
    Healthy,
    Unhealthy(String),
}

/// Create the bootstrap admin account when the user table is empty.
/// The migration seeds the permission catalog and the ADMIN role; the
/// account itself needs a runtime password hash, so it is created here.
pub async fn seed_bootstrap_admin(pool: &PgPool, config: &AppConfig) -> Result<(), AppError> {
    let user_count: i64 = sqlx::query("SELECT COUNT(*) FROM user_accounts")
        .fetch_one(pool)
        .await?
        .get(0);

    if user_count > 0 {
        return Ok(());
    }

    let email = &config.security.bootstrap_admin_email;
    let password = config.security.bootstrap_admin_password.expose_secret();

    validate_password_policy(password, &config.security)?;
    let password_hash = PasswordHasher::new().hash(password)?;

    let mut tx = pool.begin().await?;

    let admin_id: uuid::Uuid = sqlx::query(
        r#"
        INSERT INTO user_accounts (first_name, last_name, email, phone_number, password_hash)
        VALUES ('System', 'Administrator', $1, '+0000000000', $2)
        RETURNING id
        "#,
    )
    .bind(email)
    .bind(&password_hash)
    .fetch_one(&mut *tx)
    .await?
    .get(0);

    sqlx::query(
        r#"
        INSERT INTO user_account_roles (user_id, role_id)
        SELECT $1, id FROM roles WHERE name = 'ADMIN'
        "#,
    )
    .bind(admin_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(email = %email, "Bootstrap admin account created");
    Ok(())
}
