//! Configuration system
//! Loads all settings from environment variables, wrapping secrets so they
//! cannot leak into logs.

use config::{Config, ConfigError, Environment};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Listen address, e.g. "0.0.0.0:8080"
    pub addr: String,
    /// Graceful shutdown timeout in seconds
    pub graceful_shutdown_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL (wrapped so it never appears in logs)
    pub url: Secret<String>,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: json, pretty
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// HMAC-SHA256 signing secret; must decode to at least 256 bits
    pub jwt_secret: Secret<String>,
    /// Access token lifetime in seconds (fixed, not refreshable)
    pub token_exp_secs: u64,

    // Password policy
    pub password_min_length: usize,
    pub password_require_uppercase: bool,
    pub password_require_digit: bool,
    pub password_require_special: bool,

    // Bootstrap admin account, created on first start when no user exists
    pub bootstrap_admin_email: String,
    pub bootstrap_admin_password: Secret<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut settings = Config::builder();

        settings = settings
            .set_default("server.addr", "0.0.0.0:8080")?
            .set_default("server.graceful_shutdown_timeout_secs", 30)?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout_secs", 30)?
            .set_default("database.idle_timeout_secs", 600)?
            .set_default("database.max_lifetime_secs", 1800)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?
            .set_default(
                "security.jwt_secret",
                "change-this-secret-in-production-min-32-chars!",
            )?
            .set_default("security.token_exp_secs", 3600)?
            .set_default("security.password_min_length", 8)?
            .set_default("security.password_require_uppercase", true)?
            .set_default("security.password_require_digit", true)?
            .set_default("security.password_require_special", false)?
            .set_default("security.bootstrap_admin_email", "admin@example.com")?
            .set_default("security.bootstrap_admin_password", "ChangeMe123!")?;

        // Environment variables with the ADMIN_ prefix, e.g.
        // ADMIN_SECURITY__JWT_SECRET
        settings = settings.add_source(
            Environment::with_prefix("ADMIN")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = settings.build()?.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration invariants. Any failure here is fatal at
    /// startup; none of these are recoverable per-request.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    self.logging.level
                )))
            }
        }

        match self.logging.format.to_lowercase().as_str() {
            "json" | "pretty" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log format: {}. Must be one of: json, pretty",
                    self.logging.format
                )))
            }
        }

        if self.database.max_connections < self.database.min_connections {
            return Err(ConfigError::Message(
                "max_connections must be >= min_connections".to_string(),
            ));
        }

        // HS256 requires a key of at least 256 bits
        if self.security.jwt_secret.expose_secret().len() < 32 {
            return Err(ConfigError::Message(
                "JWT secret must be at least 32 bytes (256 bits) long".to_string(),
            ));
        }

        if self.security.token_exp_secs < 60 || self.security.token_exp_secs > 86400 {
            return Err(ConfigError::Message(
                "token_exp_secs must be between 60 and 86400 (1 minute to 24 hours)".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AppConfig {
        AppConfig {
            server: ServerConfig {
                addr: "127.0.0.1:8080".to_string(),
                graceful_shutdown_timeout_secs: 30,
            },
            database: DatabaseConfig {
                url: Secret::new("postgresql://localhost/test".to_string()),
                max_connections: 10,
                min_connections: 1,
                acquire_timeout_secs: 30,
                idle_timeout_secs: 600,
                max_lifetime_secs: 1800,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "json".to_string(),
            },
            security: SecurityConfig {
                jwt_secret: Secret::new("test_secret_key_32_characters_long!".to_string()),
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

    #[test]
    fn test_valid_config_passes_validation() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_short_jwt_secret_is_fatal() {
        let mut config = base_config();
        config.security.jwt_secret = Secret::new("short".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let mut config = base_config();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_token_lifetime_bounds() {
        let mut config = base_config();
        config.security.token_exp_secs = 30;
        assert!(config.validate().is_err());

        config.security.token_exp_secs = 100_000;
        assert!(config.validate().is_err());
    }
}
