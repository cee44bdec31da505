//! Configuration loading and representation.
//!
//! Everything comes from the process environment; see [`AppConfig::from_env`].

use std::net::SocketAddr;

use chrono::Duration;
use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_JWT_SECRET: &str = "dev-secret";
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 60;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime configuration for the API process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    /// Postgres connection string; `None` selects the in-memory stores.
    pub database_url: Option<String>,
}

impl AppConfig {
    /// Read `SCRIBE_BIND_ADDR`, `JWT_SECRET`, `TOKEN_TTL_MINUTES` and `DATABASE_URL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_raw = lookup("SCRIBE_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse().map_err(|e: std::net::AddrParseError| ConfigError::InvalidValue {
            key: "SCRIBE_BIND_ADDR",
            value: bind_raw.clone(),
            reason: e.to_string(),
        })?;

        let jwt_secret = match lookup("JWT_SECRET").filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None => {
                tracing::warn!("JWT_SECRET not set; using insecure dev default");
                DEFAULT_JWT_SECRET.to_string()
            }
        };

        let token_ttl = match lookup("TOKEN_TTL_MINUTES") {
            Some(raw) => {
                let minutes: i64 = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
                    ConfigError::InvalidValue {
                        key: "TOKEN_TTL_MINUTES",
                        value: raw.clone(),
                        reason: e.to_string(),
                    }
                })?;
                if minutes <= 0 {
                    return Err(ConfigError::InvalidValue {
                        key: "TOKEN_TTL_MINUTES",
                        value: raw,
                        reason: "must be positive".to_string(),
                    });
                }
                Duration::minutes(minutes)
            }
            None => Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES),
        };

        let database_url = lookup("DATABASE_URL").filter(|s| !s.trim().is_empty());

        Ok(Self {
            bind_addr,
            jwt_secret,
            token_ttl,
            database_url,
        })
    }

    /// In-memory configuration for tests and local experiments.
    pub fn in_memory(jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            jwt_secret: jwt_secret.into(),
            token_ttl: Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES),
            database_url: None,
        }
    }
}
