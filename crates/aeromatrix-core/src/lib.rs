// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! AeroMatrix Core - Drone Grid Engine
//!
//! This crate owns the domain of the AeroMatrix backend: rectangular matrices,
//! the drones placed on them, and the movement engine that steers drones
//! across a matrix without leaving it or colliding with another drone.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         HTTP Clients                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//!                                    │
//!                                    ▼
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       aeromatrix-server                                  │
//! │              (axum router, DTOs, error → status mapping)                 │
//! │                           Port 8080                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//!                                    │
//!                                    ▼
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     aeromatrix-core (This Crate)                         │
//! │   drone_handlers   matrix_handlers   flight_handlers ──► movement        │
//! └─────────────────────────────────────────────────────────────────────────┘
//!                                    │
//!                                    ▼ Arc<dyn Persistence>
//! ┌───────────────────────┬───────────────────────┬─────────────────────────┐
//! │      PostgreSQL       │        SQLite         │        Memory           │
//! └───────────────────────┴───────────────────────┴─────────────────────────┘
//! ```
//!
//! # Coordinates
//!
//! A matrix `(maxX, maxY)` holds the cells `0..=maxX × 0..=maxY`. North is
//! `y + 1`, east is `x + 1`; the west heading is spelled `O`.
//!
//! # Command Execution
//!
//! | Operation | Description |
//! |-----------|-------------|
//! | [`flight_handlers::execute_commands`] | Apply a command list to one drone, save once |
//! | [`flight_handlers::execute_commands_in_sequence`] | Same list for several drones, stop at first failure |
//! | [`flight_handlers::execute_batch_commands`] | One list per drone, then a shared-cell check |
//!
//! Each drone carries a `version`. Saves are version-checked, and a save that
//! loses the race surfaces as [`error::CoreError::ConcurrencyConflict`]
//! instead of being retried.
//!
//! # Modules
//!
//! - [`config`]: Server configuration from environment variables
//! - [`error`]: Error type and its classification into HTTP-facing kinds
//! - [`movement`]: Orientation, commands and the single-step engine
//! - [`persistence`]: Storage trait and its PostgreSQL, SQLite and in-memory backends
//! - [`drone_handlers`], [`matrix_handlers`], [`flight_handlers`]: Request handlers

#![deny(missing_docs)]

/// Server configuration loaded from environment variables.
pub mod config;

/// Drone create, read, update and delete.
pub mod drone_handlers;

/// Error types for Core operations.
pub mod error;

/// Command execution for single drones, drone lists and batches.
pub mod flight_handlers;

/// Matrix create, read, update and delete.
pub mod matrix_handlers;

/// Embedded database migrations.
pub mod migrations;

/// Orientation state machine and movement engine.
pub mod movement;

/// Storage abstraction and backends.
pub mod persistence;

/// Shared handler state and health check.
pub mod state;

pub use error::{CoreError, ErrorKind};
pub use state::HandlerState;
