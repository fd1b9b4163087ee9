//! Router assembly
//!
//! The authentication middleware wraps the whole API surface; public routes
//! simply never demand an [`AuthContext`](crate::auth::middleware::AuthContext),
//! while protected handlers reject at extraction time when none is attached.

use crate::{
    auth::middleware::optional_auth_middleware,
    handlers::{app_config, audit, auth, health},
    middleware::{request_tracking_middleware, AppState},
};
use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer};

const MAX_BODY_BYTES: usize = 256 * 1024;

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        .route("/app-configs", get(app_config::list))
        .route("/app-configs", post(app_config::create))
        .route("/app-configs/key/{key}", get(app_config::get_by_key))
        .route("/app-configs/{id}", get(app_config::get))
        .route("/app-configs/{id}", put(app_config::update))
        .route("/app-configs/{id}/status", patch(app_config::toggle_status))
        .route("/app-configs/{id}", delete(app_config::delete))
        .route("/audit-trail", get(audit::list));

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .nest("/api/v1", api)
        .layer(from_fn_with_state(state.clone(), optional_auth_middleware))
        .layer(axum::middleware::from_fn(request_tracking_middleware))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
