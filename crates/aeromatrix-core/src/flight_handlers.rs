// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Flight handlers: command execution for one drone, a list of drones, or a batch.
//!
//! Commands are applied to an in-memory copy of the drone and the final state
//! is written once through a version-checked save. A failed execution
//! therefore leaves the stored drone untouched, while drones committed
//! earlier in a sequence or batch stay committed.

use tracing::{debug, info, instrument, warn};

use crate::error::{CoreError, Result};
use crate::movement::{MovementCommand, apply_command};
use crate::persistence::{Drone, Persistence, SaveOutcome};
use crate::state::HandlerState;

/// Commands addressed to a single drone inside a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroneCommands {
    /// Target drone.
    pub drone_id: i64,
    /// Commands, applied in order.
    pub commands: Vec<MovementCommand>,
}

impl DroneCommands {
    /// Pair a drone with its command list.
    pub fn new(drone_id: i64, commands: Vec<MovementCommand>) -> Self {
        Self { drone_id, commands }
    }
}

// ============================================================================
// Single Drone
// ============================================================================

/// Apply `commands` to one drone, in order, and persist the result.
///
/// # Errors
///
/// - `EmptyCommands` if `commands` is empty (checked before any lookup)
/// - `DroneNotFound` / `MatrixNotFound` if the drone or its matrix is missing
/// - `OutOfBounds`, `Collision` or `UnsupportedCommand` from the first failing command
/// - `ConcurrencyConflict` if the drone was modified while the commands ran
#[instrument(skip(state, commands), fields(command_count = commands.len()))]
pub async fn execute_commands(
    state: &HandlerState,
    drone_id: i64,
    commands: &[MovementCommand],
) -> Result<Drone> {
    if commands.is_empty() {
        return Err(CoreError::EmptyCommands { drone_id: None });
    }

    let persistence = state.persistence.as_ref();

    let mut drone = persistence
        .get_drone(drone_id)
        .await?
        .ok_or(CoreError::DroneNotFound { drone_id })?;
    let matrix = persistence
        .get_matrix(drone.matrix_id)
        .await?
        .ok_or(CoreError::MatrixNotFound {
            matrix_id: drone.matrix_id,
        })?;

    for command in commands {
        apply_command(persistence, &matrix, &mut drone, command).await?;
    }

    match persistence.save_drone(&drone).await? {
        SaveOutcome::Saved(saved) => {
            info!(
                x = saved.x,
                y = saved.y,
                orientation = %saved.orientation,
                version = saved.version,
                "Commands executed"
            );
            Ok(saved)
        }
        SaveOutcome::VersionConflict => {
            warn!("Drone changed while commands were running");
            Err(CoreError::ConcurrencyConflict { drone_id })
        }
    }
}

// ============================================================================
// Multiple Drones
// ============================================================================

/// Apply the same command list to each drone in `drone_ids`, in order.
///
/// Stops at the first failing drone. Drones processed before it keep their
/// new state.
#[instrument(skip(state, drone_ids, commands), fields(drone_count = drone_ids.len(), command_count = commands.len()))]
pub async fn execute_commands_in_sequence(
    state: &HandlerState,
    drone_ids: &[i64],
    commands: &[MovementCommand],
) -> Result<()> {
    if commands.is_empty() {
        return Err(CoreError::EmptyCommands { drone_id: None });
    }

    for &drone_id in drone_ids {
        execute_commands(state, drone_id, commands).await?;
    }

    debug!("Sequence completed");
    Ok(())
}

/// Execute per-drone command lists in input order, fail-fast.
///
/// Each pair is validated (non-empty list, existing drone), executed, and
/// then checked against every drone sharing its final cell.
#[instrument(skip(state, batch), fields(batch_size = batch.len()))]
pub async fn execute_batch_commands(state: &HandlerState, batch: &[DroneCommands]) -> Result<()> {
    let persistence = state.persistence.as_ref();

    for entry in batch {
        let drone_id = entry.drone_id;

        if entry.commands.is_empty() {
            return Err(CoreError::EmptyCommands {
                drone_id: Some(drone_id),
            });
        }
        if persistence.get_drone(drone_id).await?.is_none() {
            return Err(CoreError::DroneNotFound { drone_id });
        }

        let drone = execute_commands(state, drone_id, &entry.commands).await?;
        check_global_collisions(persistence, &drone).await?;
    }

    info!("Batch completed");
    Ok(())
}

/// Fail if another drone is stored on the same cell of the same matrix as `drone`.
pub async fn check_global_collisions(persistence: &dyn Persistence, drone: &Drone) -> Result<()> {
    let occupants = persistence
        .find_drones_at(drone.x, drone.y, drone.matrix_id)
        .await?;

    if let Some(other) = occupants.iter().find(|other| other.id != drone.id) {
        warn!(
            drone_id = drone.id,
            other_id = other.id,
            x = drone.x,
            y = drone.y,
            "Drones share a cell"
        );
        return Err(CoreError::Collision {
            drone_id: drone.id,
            other_id: other.id,
            x: drone.x,
            y: drone.y,
        });
    }

    Ok(())
}
