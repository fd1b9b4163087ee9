//! JWT issuing and verification
//!
//! Tokens are self-contained HS256 credentials carrying the subject and the
//! principal's permission names. Verification classifies every failure cause
//! separately so the error surface can map each to its own 401 label.

use crate::{config::AppConfig, error::AppError, models::user::Principal};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

/// Token claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user email)
    pub sub: String,

    /// Permission names granted at issuance time
    pub permissions: Vec<String>,

    /// Issued at (unix seconds)
    pub iat: i64,

    /// Expiration (unix seconds); the instant equal to `exp` is rejected
    pub exp: i64,
}

/// JWT service owning the process-wide signing key
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_exp_secs: u64,
}

impl JwtService {
    /// Create the service from config. Fails fast on an undersized secret;
    /// this is a startup-time invariant, never a per-request error.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let secret = config.security.jwt_secret.expose_secret();

        // HS256 requires at least 256 bits of key material
        if secret.len() < 32 {
            return Err(AppError::Config(
                "JWT secret must be at least 32 bytes (256 bits)".to_string(),
            ));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_exp_secs: config.security.token_exp_secs,
        })
    }

    /// Token lifetime in seconds
    pub fn token_exp_secs(&self) -> u64 {
        self.token_exp_secs
    }

    /// Issue a signed token for a resolved principal. The permission list is
    /// sorted so two tokens for the same principal carry identical claims.
    pub fn issue(&self, principal: &Principal) -> Result<String, AppError> {
        let mut permissions: Vec<String> = principal.permissions.iter().cloned().collect();
        permissions.sort();

        let now = Utc::now();
        let claims = Claims {
            sub: principal.email.clone(),
            permissions,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.token_exp_secs as i64)).timestamp(),
        };

        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::default(), claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode token: {:?}", e);
            AppError::Internal(format!("Failed to encode token: {}", e))
        })
    }

    /// Verify signature, structure and expiration, and return the claims.
    /// Failure causes, in order of precedence: malformed structure, bad
    /// signature, expired, unsupported algorithm.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // "Not expired" means strictly before `exp`; no clock slack.
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| {
                tracing::debug!("Token verification failed: {:?}", e);
                classify_jwt_error(e.kind())
            })?
            .claims;

        // The library's expiry check is `exp < now`, which accepts a token
        // for the whole second `exp` falls in. Validity ends strictly before
        // `exp`, so the expiration instant itself must already be rejected.
        if claims.exp <= Utc::now().timestamp() {
            return Err(AppError::TokenExpired);
        }

        if claims.sub.trim().is_empty() {
            return Err(AppError::MalformedToken);
        }

        Ok(claims)
    }
}

/// Map jsonwebtoken failure kinds onto the credential error taxonomy
fn classify_jwt_error(kind: &ErrorKind) -> AppError {
    match kind {
        ErrorKind::InvalidSignature => AppError::InvalidSignature,
        ErrorKind::ExpiredSignature => AppError::TokenExpired,
        ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
            AppError::UnsupportedToken
        }
        _ => AppError::MalformedToken,
    }
}
