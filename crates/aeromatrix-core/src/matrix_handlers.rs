// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Matrix CRUD handlers.

use tracing::{info, instrument, warn};

use crate::error::{CoreError, Result};
use crate::persistence::{Drone, Matrix};
use crate::state::HandlerState;

/// A matrix together with the drones placed on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixWithDrones {
    /// The matrix.
    pub matrix: Matrix,
    /// Its drones, ordered by id.
    pub drones: Vec<Drone>,
}

fn validate_dimensions(state: &HandlerState, max_x: i32, max_y: i32) -> Result<()> {
    let limit = state.limits.max_matrix_size;
    for (field, value) in [("maxX", max_x), ("maxY", max_y)] {
        if !(1..=limit).contains(&value) {
            return Err(CoreError::validation(
                field,
                format!("must be between 1 and {limit}"),
            ));
        }
    }
    Ok(())
}

async fn with_drones(state: &HandlerState, matrix: Matrix) -> Result<MatrixWithDrones> {
    let drones = state.persistence.find_drones_by_matrix(matrix.id).await?;
    Ok(MatrixWithDrones { matrix, drones })
}

async fn require_matrix(state: &HandlerState, matrix_id: i64) -> Result<Matrix> {
    state
        .persistence
        .get_matrix(matrix_id)
        .await?
        .ok_or(CoreError::MatrixNotFound { matrix_id })
}

/// Create an empty matrix.
#[instrument(skip(state))]
pub async fn create_matrix(state: &HandlerState, max_x: i32, max_y: i32) -> Result<MatrixWithDrones> {
    validate_dimensions(state, max_x, max_y)?;

    let matrix = state.persistence.insert_matrix(max_x, max_y).await?;
    info!(matrix_id = matrix.id, "Matrix created");

    Ok(MatrixWithDrones {
        matrix,
        drones: Vec::new(),
    })
}

/// Fetch a matrix with its drones.
#[instrument(skip(state))]
pub async fn get_matrix(state: &HandlerState, matrix_id: i64) -> Result<MatrixWithDrones> {
    let matrix = require_matrix(state, matrix_id).await?;
    with_drones(state, matrix).await
}

/// All matrices ordered by id, each with its drones.
#[instrument(skip(state))]
pub async fn list_matrices(state: &HandlerState) -> Result<Vec<MatrixWithDrones>> {
    let matrices = state.persistence.list_matrices().await?;

    let mut result = Vec::with_capacity(matrices.len());
    for matrix in matrices {
        result.push(with_drones(state, matrix).await?);
    }
    Ok(result)
}

/// Resize a matrix.
///
/// Refused while any drone would end up outside the new bounds.
#[instrument(skip(state))]
pub async fn update_matrix(
    state: &HandlerState,
    matrix_id: i64,
    max_x: i32,
    max_y: i32,
) -> Result<MatrixWithDrones> {
    validate_dimensions(state, max_x, max_y)?;
    require_matrix(state, matrix_id).await?;

    let drones = state.persistence.find_drones_by_matrix(matrix_id).await?;
    if let Some(outside) = drones.iter().find(|d| d.x > max_x || d.y > max_y) {
        warn!(drone_id = outside.id, "Resize would strand a drone");
        return Err(CoreError::MatrixShrinkConflict {
            matrix_id,
            drone_id: outside.id,
            max_x,
            max_y,
        });
    }

    let matrix = state
        .persistence
        .update_matrix(matrix_id, max_x, max_y)
        .await?
        .ok_or(CoreError::MatrixNotFound { matrix_id })?;

    info!("Matrix resized");
    Ok(MatrixWithDrones { matrix, drones })
}

/// Delete a matrix that has no drones left.
#[instrument(skip(state))]
pub async fn delete_matrix(state: &HandlerState, matrix_id: i64) -> Result<()> {
    require_matrix(state, matrix_id).await?;

    let drones = state.persistence.find_drones_by_matrix(matrix_id).await?;
    if !drones.is_empty() {
        return Err(CoreError::MatrixNotEmpty {
            matrix_id,
            drone_ids: drones.iter().map(|d| d.id).collect(),
        });
    }

    if !state.persistence.delete_matrix(matrix_id).await? {
        return Err(CoreError::MatrixNotFound { matrix_id });
    }

    info!("Matrix deleted");
    Ok(())
}
