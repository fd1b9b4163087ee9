//! Password hashing and password policy
//!
//! Argon2id with OWASP-recommended parameters (19 MiB memory, 2 iterations).
//! Hashes are stored in PHC string format so parameters travel with the hash.

use crate::{config::SecurityConfig, error::AppError};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Argon2, Params, Version,
};

pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    pub fn new() -> Self {
        // m=19456 KiB, t=2, p=1
        let params = Params::new(19456, 2, 1, None)
            .unwrap_or_else(|_| Params::default());
        Self {
            argon2: Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    }

    /// Check a candidate password against a stored PHC hash. A hash that
    /// fails to parse counts as a mismatch, not an internal error, so a
    /// corrupted row cannot be probed apart from a wrong password.
    pub fn verify(&self, password: &str, stored_hash: &str) -> bool {
        match PasswordHash::new(stored_hash) {
            Ok(parsed) => self
                .argon2
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::error!("Stored password hash failed to parse: {}", e);
                false
            }
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate a plaintext password against the configured policy, returning
/// every violated rule at once.
pub fn validate_password_policy(
    password: &str,
    config: &SecurityConfig,
) -> Result<(), AppError> {
    let mut violations = Vec::new();

    if password.len() < config.password_min_length {
        violations.push(format!(
            "must be at least {} characters long",
            config.password_min_length
        ));
    }
    if config.password_require_uppercase && !password.chars().any(|c| c.is_ascii_uppercase()) {
        violations.push("must contain at least one uppercase letter".to_string());
    }
    if config.password_require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
        violations.push("must contain at least one digit".to_string());
    }
    if config.password_require_special
        && !password.chars().any(|c| !c.is_ascii_alphanumeric())
    {
        violations.push("must contain at least one special character".to_string());
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "Password {}",
            violations.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::Secret;

    fn policy() -> SecurityConfig {
        SecurityConfig {
            jwt_secret: Secret::new("test_secret_key_32_characters_long!".to_string()),
            token_exp_secs: 3600,
            password_min_length: 8,
            password_require_uppercase: true,
            password_require_digit: true,
            password_require_special: false,
            bootstrap_admin_email: "admin@example.com".to_string(),
            bootstrap_admin_password: Secret::new("ChangeMe123!".to_string()),
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash("Correct1Horse").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("Correct1Horse", &hash));
        assert!(!hasher.verify("Wrong1Horse", &hash));
    }

    #[test]
    fn test_corrupted_hash_is_mismatch() {
        let hasher = PasswordHasher::new();
        assert!(!hasher.verify("anything", "not-a-phc-string"));
    }

    #[test]
    fn test_policy_accepts_compliant_password() {
        assert!(validate_password_policy("Sufficient1", &policy()).is_ok());
    }

    #[test]
    fn test_policy_reports_all_violations() {
        let err = validate_password_policy("abc", &policy()).unwrap_err();
        match err {
            AppError::BadRequest(msg) => {
                assert!(msg.contains("8 characters"));
                assert!(msg.contains("uppercase"));
                assert!(msg.contains("digit"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
