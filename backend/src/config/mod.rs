//! Central module for application-wide configuration settings.
//!
//! This module handles loading and managing configuration parameters such as
//! the database URL, server port, session signing secret and token lifetime.

use crate::utils::password::{MAX_COST, MIN_COST};
use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Default session lifetime: 36 hours.
pub const DEFAULT_TOKEN_LIFETIME_SECONDS: u64 = 36 * 60 * 60;

/// Secrets shorter than this still work but are logged as weak.
const MIN_SECRET_BYTES: usize = 32;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub jwt_secret: String,
    pub jwt_expires_in_seconds: u64,
    pub bcrypt_cost: u32,
    pub store_timeout_seconds: u64,
    pub server_port: u16,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL not set")?;

        let max_connections = parse_or(&lookup, "DB_MAX_CONNECTIONS", 5)?;
        let acquire_timeout_seconds = parse_or(&lookup, "DB_ACQUIRE_TIMEOUT_SECONDS", 3)?;

        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET not set")?;
        if jwt_secret.is_empty() {
            anyhow::bail!("JWT_SECRET must not be empty");
        }
        if jwt_secret.len() < MIN_SECRET_BYTES {
            tracing::warn!(
                "JWT_SECRET is shorter than {} bytes; use a longer random secret in production",
                MIN_SECRET_BYTES
            );
        }

        let jwt_expires_in_seconds = parse_or(
            &lookup,
            "JWT_EXPIRES_IN_SECONDS",
            DEFAULT_TOKEN_LIFETIME_SECONDS,
        )?;
        let bcrypt_cost = parse_or(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(MIN_COST..=MAX_COST).contains(&bcrypt_cost) {
            anyhow::bail!(
                "BCRYPT_COST must be between {} and {}",
                MIN_COST,
                MAX_COST
            );
        }
        let store_timeout_seconds = parse_or(&lookup, "STORE_TIMEOUT_SECONDS", 10)?;
        let server_port = parse_or(&lookup, "SERVER_PORT", 8080)?;

        Ok(Config {
            database_url,
            max_connections,
            acquire_timeout_seconds,
            jwt_secret,
            jwt_expires_in_seconds,
            bcrypt_cost,
            store_timeout_seconds,
            server_port,
        })
    }

    pub fn token_lifetime(&self) -> Duration {
        Duration::from_secs(self.jwt_expires_in_seconds)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_seconds)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .parse::<T>()
            .ok()
            .with_context(|| format!("{} must be a valid number", key)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("JWT_SECRET", "0123456789abcdef0123456789abcdef"),
        ]))
        .unwrap();

        assert_eq!(config.max_connections, 5);
        assert_eq!(config.acquire_timeout_seconds, 3);
        assert_eq!(config.jwt_expires_in_seconds, DEFAULT_TOKEN_LIFETIME_SECONDS);
        assert_eq!(config.token_lifetime(), Duration::from_secs(129_600));
        assert_eq!(config.bcrypt_cost, bcrypt::DEFAULT_COST);
        assert_eq!(config.store_timeout(), Duration::from_secs(10));
        assert_eq!(config.server_port, 8080);
    }

    #[test]
    fn test_overrides_parsed() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite://uriel.db"),
            ("JWT_SECRET", "secret"),
            ("JWT_EXPIRES_IN_SECONDS", "60"),
            ("BCRYPT_COST", "4"),
            ("STORE_TIMEOUT_SECONDS", "2"),
            ("SERVER_PORT", "9000"),
        ]))
        .unwrap();

        assert_eq!(config.jwt_expires_in_seconds, 60);
        assert_eq!(config.bcrypt_cost, 4);
        assert_eq!(config.store_timeout_seconds, 2);
        assert_eq!(config.server_port, 9000);
    }

    #[test]
    fn test_missing_secret_rejected() {
        let result = Config::from_lookup(lookup_from(&[("DATABASE_URL", "sqlite::memory:")]));
        assert!(result.is_err());

        let result = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("JWT_SECRET", ""),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        let result = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("JWT_SECRET", "secret"),
            ("SERVER_PORT", "not-a-port"),
        ]));
        assert!(result.is_err());

        let result = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("JWT_SECRET", "secret"),
            ("BCRYPT_COST", "99"),
        ]));
        assert!(result.is_err());
    }
}
