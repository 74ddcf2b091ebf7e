// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Drone CRUD handlers.
//!
//! Placement rules shared by create and update: the matrix must exist, the
//! cell must lie inside it (inclusive upper bound) and no other drone may be
//! stored on it. Names and models are not required to be unique.

use tracing::{info, instrument};

use crate::error::{CoreError, Result};
use crate::movement::Orientation;
use crate::persistence::{Drone, Matrix, NewDrone, Persistence, SaveOutcome};
use crate::state::HandlerState;

/// Longest accepted drone name or model.
pub const MAX_LABEL_LEN: usize = 50;

/// Fields supplied when creating or updating a drone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroneInput {
    /// Matrix to place the drone on.
    pub matrix_id: i64,
    /// Display name.
    pub name: String,
    /// Hardware model.
    pub model: String,
    /// X coordinate.
    pub x: i32,
    /// Y coordinate.
    pub y: i32,
    /// Heading.
    pub orientation: Orientation,
}

fn validate_label(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CoreError::validation(field, "must not be blank"));
    }
    if value.chars().count() > MAX_LABEL_LEN {
        return Err(CoreError::validation(
            field,
            format!("must be at most {MAX_LABEL_LEN} characters"),
        ));
    }
    Ok(())
}

fn validate_input(input: &DroneInput) -> Result<()> {
    validate_label("name", &input.name)?;
    validate_label("model", &input.model)?;
    if input.x < 0 {
        return Err(CoreError::validation("x", "must be zero or positive"));
    }
    if input.y < 0 {
        return Err(CoreError::validation("y", "must be zero or positive"));
    }
    Ok(())
}

/// Resolve the target matrix and check the cell lies inside it.
async fn placement_matrix(
    persistence: &dyn Persistence,
    drone_id: Option<i64>,
    input: &DroneInput,
) -> Result<Matrix> {
    let matrix = persistence
        .get_matrix(input.matrix_id)
        .await?
        .ok_or(CoreError::MatrixNotFound {
            matrix_id: input.matrix_id,
        })?;

    let (x, y) = (i64::from(input.x), i64::from(input.y));
    if !matrix.contains(x, y) {
        return Err(CoreError::OutOfBounds {
            drone_id,
            matrix_id: matrix.id,
            x,
            y,
            max_x: matrix.max_x,
            max_y: matrix.max_y,
        });
    }

    Ok(matrix)
}

async fn ensure_unoccupied(
    persistence: &dyn Persistence,
    drone_id: Option<i64>,
    input: &DroneInput,
) -> Result<()> {
    let occupants = persistence
        .find_drones_at(input.x, input.y, input.matrix_id)
        .await?;

    match occupants.iter().find(|d| Some(d.id) != drone_id) {
        Some(occupant) => Err(CoreError::PositionOccupied {
            matrix_id: input.matrix_id,
            x: input.x,
            y: input.y,
            occupant_id: occupant.id,
        }),
        None => Ok(()),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Place a new drone.
#[instrument(skip(state, input), fields(matrix_id = input.matrix_id))]
pub async fn create_drone(state: &HandlerState, input: DroneInput) -> Result<Drone> {
    validate_input(&input)?;

    let persistence = state.persistence.as_ref();
    placement_matrix(persistence, None, &input).await?;
    ensure_unoccupied(persistence, None, &input).await?;

    let drone = persistence
        .insert_drone(&NewDrone::new(
            input.name,
            input.model,
            input.x,
            input.y,
            input.orientation,
            input.matrix_id,
        ))
        .await?;

    info!(drone_id = drone.id, x = drone.x, y = drone.y, "Drone created");
    Ok(drone)
}

/// Fetch a drone.
#[instrument(skip(state))]
pub async fn get_drone(state: &HandlerState, drone_id: i64) -> Result<Drone> {
    state
        .persistence
        .get_drone(drone_id)
        .await?
        .ok_or(CoreError::DroneNotFound { drone_id })
}

/// All drones ordered by id.
#[instrument(skip(state))]
pub async fn list_drones(state: &HandlerState) -> Result<Vec<Drone>> {
    state.persistence.list_drones().await
}

/// Replace every field of an existing drone, possibly moving it to another matrix.
///
/// The drone's own stored cell never counts as occupied.
#[instrument(skip(state, input), fields(matrix_id = input.matrix_id))]
pub async fn update_drone(state: &HandlerState, drone_id: i64, input: DroneInput) -> Result<Drone> {
    validate_input(&input)?;

    let persistence = state.persistence.as_ref();
    let current = get_drone(state, drone_id).await?;
    placement_matrix(persistence, Some(drone_id), &input).await?;
    ensure_unoccupied(persistence, Some(drone_id), &input).await?;

    let updated = Drone {
        name: input.name,
        model: input.model,
        x: input.x,
        y: input.y,
        orientation: input.orientation,
        matrix_id: input.matrix_id,
        ..current
    };

    match persistence.save_drone(&updated).await? {
        SaveOutcome::Saved(saved) => {
            info!(x = saved.x, y = saved.y, "Drone updated");
            Ok(saved)
        }
        SaveOutcome::VersionConflict => Err(CoreError::ConcurrencyConflict { drone_id }),
    }
}

/// Remove a drone and return it as it was stored.
#[instrument(skip(state))]
pub async fn delete_drone(state: &HandlerState, drone_id: i64) -> Result<Drone> {
    let drone = get_drone(state, drone_id).await?;

    if !state.persistence.delete_drone(drone_id).await? {
        return Err(CoreError::DroneNotFound { drone_id });
    }

    info!("Drone deleted");
    Ok(drone)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::error::ErrorKind;
    use crate::persistence::{MemoryPersistence, SqlitePersistence};

    async fn sqlite_state() -> HandlerState {
        let persistence = SqlitePersistence::connect("sqlite::memory:", 1)
            .await
            .unwrap();
        HandlerState::new(Arc::new(persistence))
    }

    fn input(matrix_id: i64, x: i32, y: i32) -> DroneInput {
        DroneInput {
            matrix_id,
            name: "Alpha".to_string(),
            model: "X1".to_string(),
            x,
            y,
            orientation: Orientation::N,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let state = sqlite_state().await;
        let m = state.persistence.insert_matrix(5, 5).await.unwrap();

        let drone = create_drone(&state, input(m.id, 5, 5)).await.unwrap();
        assert_eq!((drone.x, drone.y, drone.version), (5, 5, 0));
        assert_eq!(get_drone(&state, drone.id).await.unwrap(), drone);
    }

    #[tokio::test]
    async fn test_create_validation() {
        let state = sqlite_state().await;
        let m = state.persistence.insert_matrix(5, 5).await.unwrap();

        let blank = DroneInput {
            name: "   ".to_string(),
            ..input(m.id, 0, 0)
        };
        let long = DroneInput {
            model: "m".repeat(MAX_LABEL_LEN + 1),
            ..input(m.id, 0, 0)
        };
        let negative = input(m.id, -1, 0);

        for bad in [blank, long, negative] {
            let err = create_drone(&state, bad).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::BadRequest, "{err}");
        }
        assert!(list_drones(&state).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_placement_errors() {
        let state = sqlite_state().await;
        let m = state.persistence.insert_matrix(5, 5).await.unwrap();
        let first = create_drone(&state, input(m.id, 1, 1)).await.unwrap();

        let err = create_drone(&state, input(99, 1, 1)).await.unwrap_err();
        assert!(matches!(err, CoreError::MatrixNotFound { matrix_id: 99 }));

        let err = create_drone(&state, input(m.id, 6, 1)).await.unwrap_err();
        assert!(matches!(err, CoreError::OutOfBounds { drone_id: None, .. }));
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let err = create_drone(&state, input(m.id, 1, 1)).await.unwrap_err();
        assert!(
            matches!(err, CoreError::PositionOccupied { occupant_id, .. } if occupant_id == first.id)
        );
    }

    #[tokio::test]
    async fn test_names_need_not_be_unique() {
        let state = sqlite_state().await;
        let m = state.persistence.insert_matrix(5, 5).await.unwrap();
        create_drone(&state, input(m.id, 0, 0)).await.unwrap();
        create_drone(&state, input(m.id, 0, 1)).await.unwrap();
        assert_eq!(list_drones(&state).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_in_place_and_move() {
        let state = sqlite_state().await;
        let m = state.persistence.insert_matrix(5, 5).await.unwrap();
        let other = state.persistence.insert_matrix(3, 3).await.unwrap();
        let drone = create_drone(&state, input(m.id, 2, 2)).await.unwrap();

        // same cell, new name
        let renamed = update_drone(
            &state,
            drone.id,
            DroneInput {
                name: "Bravo".to_string(),
                ..input(m.id, 2, 2)
            },
        )
        .await
        .unwrap();
        assert_eq!(renamed.name, "Bravo");
        assert_eq!(renamed.version, 1);

        let moved = update_drone(&state, drone.id, input(other.id, 3, 3))
            .await
            .unwrap();
        assert_eq!((moved.matrix_id, moved.x, moved.y), (other.id, 3, 3));
    }

    #[tokio::test]
    async fn test_noop_update_is_accepted() {
        let state = sqlite_state().await;
        let m = state.persistence.insert_matrix(5, 5).await.unwrap();
        let drone = create_drone(&state, input(m.id, 2, 2)).await.unwrap();

        let same = update_drone(&state, drone.id, input(m.id, 2, 2))
            .await
            .unwrap();
        assert_eq!(
            (same.name, same.x, same.y, same.orientation),
            (drone.name, drone.x, drone.y, drone.orientation)
        );
    }

    #[tokio::test]
    async fn test_update_rejections() {
        let state = sqlite_state().await;
        let m = state.persistence.insert_matrix(5, 5).await.unwrap();
        let a = create_drone(&state, input(m.id, 0, 0)).await.unwrap();
        let b = create_drone(&state, input(m.id, 1, 0)).await.unwrap();

        let err = update_drone(&state, 500, input(m.id, 4, 4)).await.unwrap_err();
        assert!(matches!(err, CoreError::DroneNotFound { drone_id: 500 }));

        let err = update_drone(&state, a.id, input(m.id, 1, 0)).await.unwrap_err();
        assert!(matches!(err, CoreError::PositionOccupied { occupant_id, .. } if occupant_id == b.id));

        let err = update_drone(&state, a.id, input(m.id, 0, 6)).await.unwrap_err();
        assert!(matches!(err, CoreError::OutOfBounds { drone_id: Some(id), .. } if id == a.id));

        assert_eq!(get_drone(&state, a.id).await.unwrap(), a);
    }

    #[tokio::test]
    async fn test_update_conflict() {
        let store = MemoryPersistence::new();
        let state = HandlerState::new(Arc::new(store.clone()));
        let m = store.insert_matrix(5, 5).await.unwrap();
        let drone = create_drone(&state, input(m.id, 0, 0)).await.unwrap();

        store.fail_next_save(drone.id).await;
        let err = update_drone(&state, drone.id, input(m.id, 1, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ConcurrencyConflict { .. }));
    }

    #[tokio::test]
    async fn test_delete_returns_drone() {
        let state = sqlite_state().await;
        let m = state.persistence.insert_matrix(5, 5).await.unwrap();
        let drone = create_drone(&state, input(m.id, 0, 0)).await.unwrap();

        assert_eq!(delete_drone(&state, drone.id).await.unwrap(), drone);
        assert!(matches!(
            delete_drone(&state, drone.id).await,
            Err(CoreError::DroneNotFound { .. })
        ));
    }
}
