//! Request-level tests for the authentication pipeline and error surface.
//!
//! The pool is created lazily and never connected: every request exercised
//! here is rejected (or answered) before any database I/O happens, so the
//! full middleware and error-rendering stack runs without infrastructure.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use secrecy::Secret;
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use switch_admin::{
    config::{AppConfig, DatabaseConfig, LoggingConfig, SecurityConfig, ServerConfig},
    middleware::AppState,
    routes::build_router,
};
use tower::ServiceExt;

const JWT_SECRET: &str = "integration_test_secret_32_bytes!!";

fn test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            addr: "127.0.0.1:0".to_string(),
            graceful_shutdown_timeout_secs: 5,
        },
        database: DatabaseConfig {
            url: Secret::new("postgresql://localhost:1/unreachable".to_string()),
            max_connections: 2,
            min_connections: 0,
            acquire_timeout_secs: 1,
            idle_timeout_secs: 60,
            max_lifetime_secs: 600,
        },
        logging: LoggingConfig {
            level: "error".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            jwt_secret: Secret::new(JWT_SECRET.to_string()),
            token_exp_secs: 3600,
            password_min_length: 8,
            password_require_uppercase: true,
            password_require_digit: true,
            password_require_special: false,
            bootstrap_admin_email: "admin@example.com".to_string(),
            bootstrap_admin_password: Secret::new("ChangeMe123!".to_string()),
        },
    }
}

fn test_app() -> Router {
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect_lazy("postgresql://localhost:1/unreachable")
        .expect("lazy pool");
    let state = AppState::build(test_config(), pool).expect("state");
    build_router(state)
}

#[derive(Serialize)]
struct TestClaims {
    sub: String,
    permissions: Vec<String>,
    iat: i64,
    exp: i64,
}

fn make_token(secret: &str, algorithm: Algorithm, exp_offset_secs: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = TestClaims {
        sub: "admin@example.com".to_string(),
        permissions: vec!["ALL".to_string()],
        iat: now,
        exp: now + exp_offset_secs,
    };
    encode(
        &Header::new(algorithm),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("token")
}

async fn call(app: Router, auth_header: Option<&str>) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder()
        .method("GET")
        .uri("/api/v1/app-configs");
    if let Some(value) = auth_header {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    let request = builder.body(Body::empty()).expect("request");

    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

#[tokio::test]
async fn health_responds_without_auth() {
    let app = test_app();
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn protected_route_requires_credentials() {
    let (status, body) = call(test_app(), None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");
    assert_eq!(
        body["message"],
        "Full authentication is required to access this resource"
    );
}

#[tokio::test]
async fn non_bearer_scheme_counts_as_no_credentials() {
    let (status, body) = call(test_app(), Some("Basic dXNlcjpwYXNz")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body["message"],
        "Full authentication is required to access this resource"
    );
}

#[tokio::test]
async fn gibberish_token_is_malformed() {
    let (status, body) = call(test_app(), Some("Bearer not-a-token")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Malformed JWT");
    assert_eq!(body["path"], "/api/v1/app-configs");
}

#[tokio::test]
async fn tampered_token_fails_signature_check() {
    let token = make_token(JWT_SECRET, Algorithm::HS256, 3600);

    // Corrupt the first character of the signature segment
    let dot = token.rfind('.').unwrap();
    let sig_char = token.as_bytes()[dot + 1] as char;
    let replacement = if sig_char == 'A' { "B" } else { "A" };
    let mut tampered = token.clone();
    tampered.replace_range(dot + 1..dot + 2, replacement);
    assert_ne!(token, tampered);

    let (status, body) = call(test_app(), Some(&format!("Bearer {}", tampered))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid JWT Signature");
}

#[tokio::test]
async fn foreign_key_token_fails_signature_check() {
    let token = make_token("a_completely_different_32b_secret!", Algorithm::HS256, 3600);
    let (status, body) = call(test_app(), Some(&format!("Bearer {}", token))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid JWT Signature");
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let token = make_token(JWT_SECRET, Algorithm::HS256, -120);
    let (status, body) = call(test_app(), Some(&format!("Bearer {}", token))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "JWT Expired");
}

#[tokio::test]
async fn wrong_algorithm_is_unsupported() {
    let token = make_token(JWT_SECRET, Algorithm::HS384, 3600);
    let (status, body) = call(test_app(), Some(&format!("Bearer {}", token))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unsupported JWT");
}

#[tokio::test]
async fn error_body_carries_standard_fields() {
    let (status, body) = call(test_app(), Some("Bearer nope")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], 401);
    assert!(body["timestamp"].is_string());
    assert!(body["error"].is_string());
    assert!(body["message"].is_string());
    assert_eq!(body["path"], "/api/v1/app-configs");
}
