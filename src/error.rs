//! Unified error model
//! Defines the application error type and the JSON error response format.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed JWT token")]
    MalformedToken,

    #[error("Invalid JWT signature")]
    InvalidSignature,

    #[error("JWT token expired")]
    TokenExpired,

    #[error("Unsupported JWT token")]
    UnsupportedToken,

    #[error("Authentication failed")]
    Unauthorized,

    #[error("Authentication required")]
    MissingCredentials,

    #[error("Access denied")]
    Forbidden,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Resource already exists: {0}")]
    Conflict(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// One field/message pair of a validation failure
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl AppError {
    /// HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MalformedToken
            | AppError::InvalidSignature
            | AppError::TokenExpired
            | AppError::UnsupportedToken
            | AppError::Unauthorized
            | AppError::MissingCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Config(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Short machine-readable label, one per failure cause
    pub fn error_label(&self) -> &'static str {
        match self {
            AppError::MalformedToken => "Malformed JWT",
            AppError::InvalidSignature => "Invalid JWT Signature",
            AppError::TokenExpired => "JWT Expired",
            AppError::UnsupportedToken => "Unsupported JWT",
            AppError::Unauthorized | AppError::MissingCredentials => "Unauthorized",
            AppError::Forbidden => "Forbidden",
            AppError::NotFound(_) => "Not Found",
            AppError::Conflict(_) => "Conflict",
            AppError::BadRequest(_) => "Bad Request",
            AppError::Validation(_) => "Validation Failed",
            AppError::Database(_) | AppError::Config(_) | AppError::Internal(_) => {
                "Internal Server Error"
            }
        }
    }

    /// User-facing message. Never reveals whether a referenced account
    /// exists and never leaks internals.
    pub fn user_message(&self) -> String {
        match self {
            AppError::MalformedToken => "JWT token is malformed or corrupted".to_string(),
            AppError::InvalidSignature => {
                "JWT signature does not match locally computed signature".to_string()
            }
            AppError::TokenExpired => "JWT token has expired".to_string(),
            AppError::UnsupportedToken => "The specified JWT is not supported".to_string(),
            AppError::Unauthorized => "Authentication failed".to_string(),
            AppError::MissingCredentials => {
                "Full authentication is required to access this resource".to_string()
            }
            AppError::Forbidden => {
                "You don't have permission to access this resource".to_string()
            }
            AppError::NotFound(msg) => msg.clone(),
            AppError::Conflict(msg) => msg.clone(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Validation(_) => "Validation failed".to_string(),
            AppError::Database(_) => "Database error occurred".to_string(),
            AppError::Config(_) => "Configuration error".to_string(),
            AppError::Internal(_) => "An unexpected error occurred".to_string(),
        }
    }

    // Convenience constructors
    pub fn not_found(msg: &str) -> Self {
        AppError::NotFound(msg.to_string())
    }

    pub fn conflict(msg: &str) -> Self {
        AppError::Conflict(msg.to_string())
    }

    pub fn internal(msg: &str) -> Self {
        AppError::Internal(msg.to_string())
    }

    /// Build the error response body, with the request path when the call
    /// site has one (middleware does, handlers do not).
    pub fn to_api_error(&self, path: Option<&str>) -> ApiError {
        let details = match self {
            AppError::Validation(errors) => Some(errors.clone()),
            _ => None,
        };

        ApiError {
            timestamp: Utc::now(),
            status: self.status_code().as_u16(),
            error: self.error_label().to_string(),
            message: self.user_message(),
            path: path.map(|p| p.to_string()),
            details,
        }
    }

    /// Render a response carrying the request path
    pub fn into_response_with_path(self, path: &str) -> Response {
        let status = self.status_code();
        let body = self.to_api_error(Some(path));

        tracing::warn!(
            status = body.status,
            error = %body.error,
            path = %path,
            "Request rejected"
        );

        (status, Json(body)).into_response()
    }
}

/// Error response DTO
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub timestamp: DateTime<Utc>,
    pub status: u16,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = self.to_api_error(None);

        tracing::error!(
            status = body.status,
            error = %body.error,
            message = %self,
            "Application error"
        );

        (status, Json(body)).into_response()
    }
}

impl From<config::ConfigError> for AppError {
    fn from(e: config::ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details = Vec::new();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors {
                details.push(FieldError {
                    field: field.to_string(),
                    message: error
                        .message
                        .clone()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| error.code.to_string()),
                });
            }
        }
        AppError::Validation(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::MalformedToken.status_code().as_u16(), 401);
        assert_eq!(AppError::InvalidSignature.status_code().as_u16(), 401);
        assert_eq!(AppError::TokenExpired.status_code().as_u16(), 401);
        assert_eq!(AppError::UnsupportedToken.status_code().as_u16(), 401);
        assert_eq!(AppError::Unauthorized.status_code().as_u16(), 401);
        assert_eq!(AppError::Forbidden.status_code().as_u16(), 403);
        assert_eq!(AppError::not_found("x").status_code().as_u16(), 404);
        assert_eq!(AppError::conflict("x").status_code().as_u16(), 409);
        assert_eq!(AppError::Validation(vec![]).status_code().as_u16(), 400);
    }

    #[test]
    fn test_token_errors_have_distinct_labels() {
        let labels = [
            AppError::MalformedToken.error_label(),
            AppError::InvalidSignature.error_label(),
            AppError::TokenExpired.error_label(),
            AppError::UnsupportedToken.error_label(),
        ];
        for (i, a) in labels.iter().enumerate() {
            for b in labels.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_unauthorized_message_does_not_leak_account_state() {
        let message = AppError::Unauthorized.user_message();
        assert_eq!(message, "Authentication failed");
        assert!(!message.contains("user"));
        assert!(!message.contains("password"));
    }

    #[test]
    fn test_database_message_hides_internals() {
        let error = AppError::Database(sqlx::Error::RowNotFound);
        assert_eq!(error.user_message(), "Database error occurred");
    }
}
