//! Application configuration endpoints
//!
//! Every route is guarded by an explicit permission check before any data
//! access happens. Guards fail with a bare 403; which permission was missing
//! is logged, never returned.

use crate::{
    auth::{middleware::AuthContext, permission},
    error::AppError,
    middleware::AppState,
    models::config_entry::{ConfigEntryRequest, ConfigEntryResponse, ToggleStatusQuery},
    services::audit_service::RequestMeta,
};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use uuid::Uuid;
use validator::Validate;

/// GET /api/v1/app-configs
pub async fn list(
    State(state): State<AppState>,
    ctx: AuthContext,
) -> Result<Json<Vec<ConfigEntryResponse>>, AppError> {
    permission::require_all(&ctx, &["CONFIG_READ"])?;

    let entries = state.config_service.list().await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

/// GET /api/v1/app-configs/{id}
pub async fn get(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<Json<ConfigEntryResponse>, AppError> {
    permission::require_all(&ctx, &["CONFIG_READ"])?;

    let entry = state.config_service.get(id).await?;
    Ok(Json(entry.into()))
}

/// GET /api/v1/app-configs/key/{key}
pub async fn get_by_key(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(key): Path<String>,
) -> Result<Json<ConfigEntryResponse>, AppError> {
    permission::require_all(&ctx, &["CONFIG_READ"])?;

    let entry = state.config_service.get_by_key(&key).await?;
    Ok(Json(entry.into()))
}

/// POST /api/v1/app-configs
pub async fn create(
    State(state): State<AppState>,
    ctx: AuthContext,
    headers: HeaderMap,
    Json(req): Json<ConfigEntryRequest>,
) -> Result<(StatusCode, Json<ConfigEntryResponse>), AppError> {
    permission::require_all(&ctx, &["CONFIG_CREATE"])?;
    req.validate()?;

    let meta = RequestMeta::from_headers(&headers);
    let entry = state.config_service.create(&ctx, &req, &meta).await?;
    Ok((StatusCode::CREATED, Json(entry.into())))
}

/// PUT /api/v1/app-configs/{id}
pub async fn update(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<ConfigEntryRequest>,
) -> Result<Json<ConfigEntryResponse>, AppError> {
    permission::require_all(&ctx, &["CONFIG_UPDATE"])?;
    req.validate()?;

    let meta = RequestMeta::from_headers(&headers);
    let entry = state.config_service.update(&ctx, id, &req, &meta).await?;
    Ok(Json(entry.into()))
}

/// PATCH /api/v1/app-configs/{id}/status?active=
pub async fn toggle_status(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    Query(query): Query<ToggleStatusQuery>,
    headers: HeaderMap,
) -> Result<Json<ConfigEntryResponse>, AppError> {
    permission::require_all(&ctx, &["CONFIG_STATUS_UPDATE"])?;

    let meta = RequestMeta::from_headers(&headers);
    let entry = state
        .config_service
        .toggle_status(&ctx, id, query.active, &meta)
        .await?;
    Ok(Json(entry.into()))
}

/// DELETE /api/v1/app-configs/{id}
pub async fn delete(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    permission::require_all(&ctx, &["CONFIG_DELETE"])?;

    let meta = RequestMeta::from_headers(&headers);
    state.config_service.delete(&ctx, id, &meta).await?;
    Ok(StatusCode::NO_CONTENT)
}
