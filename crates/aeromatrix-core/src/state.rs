// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Shared handler state and health reporting.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::config::GridLimits;
use crate::persistence::Persistence;

/// Shared state for drone, matrix and flight handlers.
///
/// Contains the persistence implementation plus server metadata for health checks.
#[derive(Clone)]
pub struct HandlerState {
    /// Persistence implementation.
    pub persistence: Arc<dyn Persistence>,
    /// Matrix dimension limits.
    pub limits: GridLimits,
    /// When the server started (for uptime calculation).
    pub start_time: Instant,
    /// Server version string.
    pub version: String,
}

impl HandlerState {
    /// Create handler state with default limits.
    pub fn new(persistence: Arc<dyn Persistence>) -> Self {
        Self::with_limits(persistence, GridLimits::default())
    }

    /// Create handler state with explicit matrix limits.
    pub fn with_limits(persistence: Arc<dyn Persistence>, limits: GridLimits) -> Self {
        Self {
            persistence,
            limits,
            start_time: Instant::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Get the server uptime in milliseconds.
    pub fn uptime_ms(&self) -> i64 {
        self.start_time.elapsed().as_millis() as i64
    }
}

/// Health status returned by [`health_check`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    /// Whether the database answered.
    pub healthy: bool,
    /// Server version.
    pub version: String,
    /// Milliseconds since start.
    pub uptime_ms: i64,
}

/// Report database connectivity, version and uptime.
#[instrument(skip(state))]
pub async fn health_check(state: &HandlerState) -> HealthReport {
    debug!("Health check requested");

    let healthy = state.persistence.health_check_db().await.unwrap_or(false);

    HealthReport {
        healthy,
        version: state.version.clone(),
        uptime_ms: state.uptime_ms(),
    }
}
