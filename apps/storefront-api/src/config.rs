//! Storefront API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use storefront_core::MAX_PAGE_SIZE;
use storefront_db::{DbConfig, RetryPolicy};

/// Signing secret used when `JWT_SECRET` is unset. Development only.
pub const DEV_JWT_SECRET: &str = "storefront-dev-secret-change-in-production";

/// Storefront API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Address the HTTP server listens on
    pub bind_addr: SocketAddr,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Connection pool size
    pub db_max_connections: u32,

    /// JWT secret key for verifying tokens (HS256)
    pub jwt_secret: String,

    /// Lifetime of tokens minted by `JwtManager::issue`, in seconds
    pub jwt_lifetime_secs: i64,

    /// Results per page on list endpoints
    pub page_size: u32,

    /// Attempts at an order transaction before giving up on lock conflicts
    pub order_max_attempts: u32,

    /// First retry delay in milliseconds
    pub order_initial_backoff_ms: u64,

    /// Retry delay ceiling in milliseconds
    pub order_max_backoff_ms: u64,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = ApiConfig {
            bind_addr: parse_var(&lookup, "STOREFRONT_BIND_ADDR", "0.0.0.0:8000")?,

            database_path: lookup("DATABASE_PATH")
                .unwrap_or_else(|| "./storefront.db".to_string())
                .into(),

            db_max_connections: parse_var(&lookup, "DB_MAX_CONNECTIONS", "5")?,

            jwt_secret: lookup("JWT_SECRET").unwrap_or_else(|| DEV_JWT_SECRET.to_string()),

            jwt_lifetime_secs: parse_var(&lookup, "JWT_LIFETIME_SECS", "3600")?, // 1 hour

            page_size: parse_var(&lookup, "PAGE_SIZE", "10")?,

            order_max_attempts: parse_var(&lookup, "ORDER_MAX_ATTEMPTS", "5")?,

            order_initial_backoff_ms: parse_var(&lookup, "ORDER_INITIAL_BACKOFF_MS", "25")?,

            order_max_backoff_ms: parse_var(&lookup, "ORDER_MAX_BACKOFF_MS", "500")?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()));
        }

        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::InvalidValue("PAGE_SIZE".to_string()));
        }

        if self.order_max_attempts == 0 {
            return Err(ConfigError::InvalidValue("ORDER_MAX_ATTEMPTS".to_string()));
        }

        if self.jwt_secret.is_empty() {
            return Err(ConfigError::MissingRequired("JWT_SECRET".to_string()));
        }

        if self.jwt_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("JWT_LIFETIME_SECS".to_string()));
        }

        Ok(())
    }

    /// Whether the built-in development secret is in use.
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    /// Database settings derived from this configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path).max_connections(self.db_max_connections)
    }

    /// Retry policy for order placement.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.order_max_attempts,
            Duration::from_millis(self.order_initial_backoff_ms),
            Duration::from_millis(self.order_max_backoff_ms),
        )
    }
}

fn parse_var<T, F>(lookup: &F, name: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .unwrap_or_else(|| default.to_string())
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(name.to_string()))
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),

    #[error("Missing required environment variable: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:8000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.database_path, PathBuf::from("./storefront.db"));
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.page_size, 10);
        assert_eq!(config.jwt_lifetime_secs, 3600);
        assert!(config.uses_dev_secret());

        let policy = config.retry_policy();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.initial_backoff, Duration::from_millis(25));
        assert_eq!(policy.max_backoff, Duration::from_millis(500));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("STOREFRONT_BIND_ADDR", "127.0.0.1:9000"),
            ("DATABASE_PATH", "/tmp/shop.db"),
            ("JWT_SECRET", "s3cret"),
            ("PAGE_SIZE", "25"),
            ("ORDER_MAX_ATTEMPTS", "3"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.db_config().database_path, PathBuf::from("/tmp/shop.db"));
        assert_eq!(config.page_size, 25);
        assert_eq!(config.retry_policy().max_attempts, 3);
        assert!(!config.uses_dev_secret());
    }

    #[test]
    fn test_invalid_values() {
        let err = config_from(&[("PAGE_SIZE", "ten")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(name) if name == "PAGE_SIZE"));

        let err = config_from(&[("PAGE_SIZE", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(name) if name == "PAGE_SIZE"));

        let err = config_from(&[("STOREFRONT_BIND_ADDR", "nowhere")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(name) if name == "STOREFRONT_BIND_ADDR"));

        let err = config_from(&[("ORDER_MAX_ATTEMPTS", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(name) if name == "ORDER_MAX_ATTEMPTS"));

        let err = config_from(&[("JWT_SECRET", "")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired(name) if name == "JWT_SECRET"));
    }
}
