//! Authentication endpoints

use crate::{
    auth::middleware::AuthContext,
    error::AppError,
    middleware::AppState,
    models::auth::{LoginRequest, LoginResponse},
    services::audit_service::RequestMeta,
};
use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use validator::Validate;

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    req.validate()?;

    let meta = RequestMeta::from_headers(&headers);
    let response = state.auth_service.login(&req, &meta).await?;
    Ok(Json(response))
}

#[derive(Serialize)]
pub struct CurrentUserResponse {
    pub user_id: uuid::Uuid,
    pub email: String,
    pub display_name: String,
    pub permissions: Vec<String>,
}

/// GET /api/v1/auth/me
///
/// Echoes the authenticated identity as seen by the server, permissions as
/// carried by the presented token.
pub async fn me(ctx: AuthContext) -> impl IntoResponse {
    let mut permissions: Vec<String> = ctx.permissions.into_iter().collect();
    permissions.sort();

    Json(CurrentUserResponse {
        user_id: ctx.user_id,
        email: ctx.email,
        display_name: ctx.display_name,
        permissions,
    })
}
