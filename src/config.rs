// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local development.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite connection string (e.g. `sqlite://activities.db`)
    pub database_url: String,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Upper bound on pooled database connections
    pub db_max_connections: u32,
    /// How long a statement waits on a locked database before failing
    pub db_busy_timeout: Duration,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            db_max_connections: 1,
            db_busy_timeout: Duration::from_secs(5),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let db_max_connections = parse_var("DB_MAX_CONNECTIONS", 5)?;
        if db_max_connections == 0 {
            // A zero-sized pool would hang on the first acquire.
            return Err(ConfigError::Invalid {
                name: "DB_MAX_CONNECTIONS",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://activities.db".to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: parse_var("PORT", 8080)?,
            db_max_connections,
            db_busy_timeout: Duration::from_secs(parse_var("DB_BUSY_TIMEOUT_SECS", 5)?),
        })
    }
}

/// Read an optional variable, falling back to `default` when it is unset.
fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}
