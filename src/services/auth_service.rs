//! Login flow

use crate::{
    auth::{jwt::JwtService, password::PasswordHasher},
    error::AppError,
    models::{
        audit::ActionStatus,
        auth::{LoginRequest, LoginResponse},
    },
    repository::user_repo::UserRepository,
    services::audit_service::{AuditService, RequestMeta},
};
use std::sync::Arc;

pub struct AuthService {
    users: Arc<UserRepository>,
    hasher: PasswordHasher,
    jwt: Arc<JwtService>,
    audit: Arc<AuditService>,
}

impl AuthService {
    pub fn new(
        users: Arc<UserRepository>,
        jwt: Arc<JwtService>,
        audit: Arc<AuditService>,
    ) -> Self {
        Self {
            users,
            hasher: PasswordHasher::new(),
            jwt,
            audit,
        }
    }

    /// Authenticate by email and password and issue a token. Unknown email
    /// and wrong password produce the same generic failure; only the wrong
    /// password case leaves an audit entry, since only then is there an
    /// account to attribute it to.
    pub async fn login(
        &self,
        req: &LoginRequest,
        meta: &RequestMeta,
    ) -> Result<LoginResponse, AppError> {
        let user = self
            .users
            .find_active_by_email(&req.email)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !self.hasher.verify(&req.password, &user.password_hash) {
            self.audit
                .record_login(
                    user.id,
                    &user.full_name(),
                    ActionStatus::Failure,
                    Some("Invalid credentials".to_string()),
                    meta,
                )
                .await;
            return Err(AppError::Unauthorized);
        }

        // Flattened role permissions become the token's authority
        let principal = self
            .users
            .find_principal_by_email(&req.email)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let token = self.jwt.issue(&principal)?;

        self.audit
            .record_login(user.id, &user.full_name(), ActionStatus::Success, None, meta)
            .await;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(LoginResponse {
            token,
            expires_in: self.jwt.token_exp_secs(),
        })
    }
}
