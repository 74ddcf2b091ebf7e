// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Configuration loading from environment variables.

use std::net::SocketAddr;

/// Default upper bound for `maxX` / `maxY` of a matrix.
pub const DEFAULT_MAX_MATRIX_SIZE: i32 = 100;

/// Limits applied by the drone and matrix handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLimits {
    /// Largest accepted `maxX` / `maxY`.
    pub max_matrix_size: i32,
}

impl Default for GridLimits {
    fn default() -> Self {
        Self {
            max_matrix_size: DEFAULT_MAX_MATRIX_SIZE,
        }
    }
}

/// AeroMatrix configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL or SQLite connection URL
    pub database_url: String,
    /// HTTP server address
    pub http_addr: SocketAddr,
    /// Grid limits enforced on matrix create/update
    pub limits: GridLimits,
    /// Database pool size
    pub db_max_connections: u32,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `AEROMATRIX_DATABASE_URL`: PostgreSQL or SQLite connection string
    ///
    /// Optional (with defaults):
    /// - `AEROMATRIX_HTTP_PORT`: HTTP server port (default: 8080)
    /// - `AEROMATRIX_MAX_MATRIX_SIZE`: Largest matrix dimension (default: 100)
    /// - `AEROMATRIX_DB_MAX_CONNECTIONS`: Pool size (default: 10)
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = std::env::var("AEROMATRIX_DATABASE_URL")
            .map_err(|_| ConfigError::Missing("AEROMATRIX_DATABASE_URL"))?;

        let http_port: u16 = std::env::var("AEROMATRIX_HTTP_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| {
                ConfigError::Invalid("AEROMATRIX_HTTP_PORT", "must be a valid port number")
            })?;

        let max_matrix_size: i32 = std::env::var("AEROMATRIX_MAX_MATRIX_SIZE")
            .unwrap_or_else(|_| DEFAULT_MAX_MATRIX_SIZE.to_string())
            .parse()
            .ok()
            .filter(|size| *size >= 1)
            .ok_or(ConfigError::Invalid(
                "AEROMATRIX_MAX_MATRIX_SIZE",
                "must be a positive integer",
            ))?;

        let db_max_connections: u32 = std::env::var("AEROMATRIX_DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .ok()
            .filter(|n| *n >= 1)
            .ok_or(ConfigError::Invalid(
                "AEROMATRIX_DB_MAX_CONNECTIONS",
                "must be a positive integer",
            ))?;

        Ok(Self {
            database_url,
            http_addr: SocketAddr::from(([0, 0, 0, 0], http_port)),
            limits: GridLimits { max_matrix_size },
            db_max_connections,
        })
    }

    /// Whether the database URL points at SQLite rather than PostgreSQL.
    pub fn is_sqlite(&self) -> bool {
        self.database_url.starts_with("sqlite:")
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),

    /// An environment variable has an invalid value.
    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, &'static str),
}
