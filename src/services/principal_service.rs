//! Principal resolution
//!
//! Turns a token subject into a living account with its flattened permission
//! set. Unknown, deleted and deactivated subjects all collapse into the same
//! generic credential failure, so a stolen token cannot be used to probe
//! which accounts exist.

use crate::{error::AppError, models::user::Principal, repository::user_repo::UserRepository};
use std::sync::Arc;

pub struct PrincipalService {
    users: Arc<UserRepository>,
}

impl PrincipalService {
    pub fn new(users: Arc<UserRepository>) -> Self {
        Self { users }
    }

    pub async fn resolve(&self, email: &str) -> Result<Principal, AppError> {
        match self.users.find_principal_by_email(email).await? {
            Some(principal) => Ok(principal),
            None => {
                tracing::warn!("Token subject does not resolve to an active account");
                Err(AppError::Unauthorized)
            }
        }
    }
}
