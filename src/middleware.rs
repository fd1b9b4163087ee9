//! Shared application state and request tracking

use crate::{
    auth::jwt::JwtService,
    config::AppConfig,
    error::AppError,
    repository::{
        audit_repo::AuditRepository, config_entry_repo::ConfigEntryRepository,
        user_repo::UserRepository,
    },
    services::{
        audit_service::AuditService, auth_service::AuthService, config_service::ConfigService,
        principal_service::PrincipalService,
    },
};
use axum::{extract::Request, middleware::Next, response::Response};
use sqlx::PgPool;
use std::{sync::Arc, time::Instant};
use tracing::Instrument;
use uuid::Uuid;

/// Process-wide state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: PgPool,
    pub jwt: Arc<JwtService>,
    pub auth_service: Arc<AuthService>,
    pub config_service: Arc<ConfigService>,
    pub audit_service: Arc<AuditService>,
    pub principal_service: Arc<PrincipalService>,
}

impl AppState {
    /// Wire services to repositories. Performs no I/O; the pool may still be
    /// unconnected at this point.
    pub fn build(config: AppConfig, db: PgPool) -> Result<Self, AppError> {
        let jwt = Arc::new(JwtService::from_config(&config)?);

        let users = Arc::new(UserRepository::new(db.clone()));
        let configs = Arc::new(ConfigEntryRepository::new(db.clone()));
        let audits = Arc::new(AuditRepository::new(db.clone()));

        let audit_service = Arc::new(AuditService::new(audits));
        let auth_service = Arc::new(AuthService::new(
            users.clone(),
            jwt.clone(),
            audit_service.clone(),
        ));
        let config_service = Arc::new(ConfigService::new(configs, audit_service.clone()));
        let principal_service = Arc::new(PrincipalService::new(users));

        Ok(Self {
            config: Arc::new(config),
            db,
            jwt,
            auth_service,
            config_service,
            audit_service,
            principal_service,
        })
    }
}

/// Assign trace/request ids, time the request, and emit per-request metrics.
/// Both ids are echoed back as response headers for client-side correlation.
pub async fn request_tracking_middleware(req: Request, next: Next) -> Response {
    let trace_id = Uuid::new_v4().to_string();
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let span = tracing::info_span!(
        "http_request",
        trace_id = %trace_id,
        request_id = %request_id,
        method = %method,
        path = %path,
    );

    let start = Instant::now();
    let mut response = next.run(req).instrument(span.clone()).await;
    let elapsed = start.elapsed();

    let status = response.status().as_u16();
    metrics::counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
    )
    .increment(1);
    metrics::histogram!("http_request_duration_seconds").record(elapsed.as_secs_f64());

    span.in_scope(|| {
        tracing::info!(
            status = status,
            elapsed_ms = elapsed.as_millis() as u64,
            "Request completed"
        );
    });

    let headers = response.headers_mut();
    if let Ok(v) = trace_id.parse() {
        headers.insert("x-trace-id", v);
    }
    if let Ok(v) = request_id.parse() {
        headers.insert("x-request-id", v);
    }

    response
}
