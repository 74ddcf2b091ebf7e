// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! AeroMatrix HTTP server.
//!
//! Exposes matrices, drones and flight commands from `aeromatrix-core` as a
//! JSON API.
//!
//! | Method | Path | Success |
//! |--------|------|---------|
//! | POST/GET | `/api/matrices` | 201 / 200 |
//! | GET/PUT/DELETE | `/api/matrices/{matrixId}` | 200 / 200 / 204 |
//! | POST/GET | `/api/drones` | 201 / 200 |
//! | GET/PUT/DELETE | `/api/drones/{droneId}` | 200 |
//! | POST | `/api/flights/drones/{droneId}/commands` | 200 |
//! | POST | `/api/flights/drones/commands?droneIds=1,2` | 200 |
//! | POST | `/api/flights/batch-commands` | 202 |
//! | GET | `/health` | 200 |

#![deny(missing_docs)]

pub mod dto;
pub mod error;
pub mod routes;

use aeromatrix_core::HandlerState;
use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Build the application router.
pub fn router(state: HandlerState) -> Router {
    Router::new()
        .merge(routes::matrices::router())
        .merge(routes::drones::router())
        .merge(routes::flights::router())
        .route("/health", get(routes::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
