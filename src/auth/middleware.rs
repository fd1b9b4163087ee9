//! Request authentication middleware
//!
//! Runs ahead of every protected route. A request without a Bearer credential
//! passes through unauthenticated; handlers that need an identity reject it
//! at extraction time. A request that does present a credential must survive
//! full verification or the pipeline ends right here with a 401.

use crate::{error::AppError, middleware::AppState};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use std::collections::HashSet;
use uuid::Uuid;

/// Authenticated caller identity, attached as a request extension
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub email: String,
    pub display_name: String,
    /// Permissions as embedded in the presented token
    pub permissions: HashSet<String>,
}

impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(AppError::MissingCredentials)
    }
}

/// Pull the token out of `Authorization: Bearer <token>`. Any other scheme
/// (or no header at all) counts as an absent credential, not a bad one.
fn extract_bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Authenticate the request when a Bearer credential is present.
///
/// With a credential: verify the token, confirm the subject still resolves to
/// an active account, and attach [`AuthContext`]. Verification or resolution
/// failure short-circuits with a 401 carrying the request path. Without a
/// credential: pass through untouched.
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let (parts, body) = req.into_parts();

    let token = match extract_bearer_token(&parts) {
        Some(token) => token.to_string(),
        None => return next.run(Request::from_parts(parts, body)).await,
    };

    let path = parts.uri.path().to_string();

    match authenticate(&state, &token).await {
        Ok(ctx) => {
            tracing::debug!(user_id = %ctx.user_id, "Request authenticated");
            let mut req = Request::from_parts(parts, body);
            req.extensions_mut().insert(ctx);
            next.run(req).await
        }
        Err(err) => {
            tracing::warn!(path = %path, error = %err, "Authentication failed");
            err.into_response_with_path(&path)
        }
    }
}

async fn authenticate(state: &AppState, token: &str) -> Result<AuthContext, AppError> {
    let claims = state.jwt.verify(token)?;

    // The subject must still be an active account; its current grants do not
    // override the ones embedded in the token.
    let principal = state.principal_service.resolve(&claims.sub).await?;

    Ok(AuthContext {
        user_id: principal.user_id,
        email: principal.email,
        display_name: principal.display_name,
        permissions: claims.permissions.into_iter().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request as HttpRequest;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = HttpRequest::builder().uri("/api/v1/app-configs");
        if let Some(v) = value {
            builder = builder.header(header::AUTHORIZATION, v);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token_extracted() {
        let parts = parts_with_auth(Some("Bearer abc.def.ghi"));
        assert_eq!(extract_bearer_token(&parts), Some("abc.def.ghi"));
    }

    #[test]
    fn test_missing_header_is_absent_credential() {
        let parts = parts_with_auth(None);
        assert_eq!(extract_bearer_token(&parts), None);
    }

    #[test]
    fn test_other_scheme_is_absent_credential() {
        let parts = parts_with_auth(Some("Basic dXNlcjpwYXNz"));
        assert_eq!(extract_bearer_token(&parts), None);

        // Scheme prefix is case-sensitive
        let parts = parts_with_auth(Some("bearer abc.def.ghi"));
        assert_eq!(extract_bearer_token(&parts), None);
    }
}
