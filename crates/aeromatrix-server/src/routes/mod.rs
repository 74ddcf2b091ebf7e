// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Route handlers grouped by resource.

pub mod drones;
pub mod flights;
pub mod matrices;

use aeromatrix_core::HandlerState;
use aeromatrix_core::state::{self, HealthReport};
use axum::Json;
use axum::extract::State;

/// `GET /health`
pub async fn health(State(handler_state): State<HandlerState>) -> Json<HealthReport> {
    Json(state::health_check(&handler_state).await)
}
