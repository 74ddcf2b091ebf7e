// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! In-memory persistence for testing.
//!
//! Keeps matrices and drones in ordered maps behind a single mutex and
//! honours the same version-checked save contract as the SQL backends.
//! Tests can force a version conflict on the next save of a given drone to
//! simulate a concurrent writer.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::CoreError;

use super::{Drone, Matrix, NewDrone, Persistence, SaveOutcome};

#[derive(Debug, Default)]
struct MemoryState {
    matrices: BTreeMap<i64, Matrix>,
    drones: BTreeMap<i64, Drone>,
    next_matrix_id: i64,
    next_drone_id: i64,
    conflict_on_next_save: HashSet<i64>,
    saves: u64,
}

/// In-memory persistence backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryPersistence {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryPersistence {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `save_drone` for `drone_id` report a version conflict.
    pub async fn fail_next_save(&self, drone_id: i64) {
        self.state
            .lock()
            .await
            .conflict_on_next_save
            .insert(drone_id);
    }

    /// Number of drone saves applied so far.
    pub async fn save_count(&self) -> u64 {
        self.state.lock().await.saves
    }
}

#[async_trait]
impl Persistence for MemoryPersistence {
    async fn insert_matrix(&self, max_x: i32, max_y: i32) -> Result<Matrix, CoreError> {
        let mut state = self.state.lock().await;
        state.next_matrix_id += 1;
        let matrix = Matrix {
            id: state.next_matrix_id,
            max_x,
            max_y,
        };
        state.matrices.insert(matrix.id, matrix.clone());
        Ok(matrix)
    }

    async fn get_matrix(&self, matrix_id: i64) -> Result<Option<Matrix>, CoreError> {
        Ok(self.state.lock().await.matrices.get(&matrix_id).cloned())
    }

    async fn list_matrices(&self) -> Result<Vec<Matrix>, CoreError> {
        Ok(self.state.lock().await.matrices.values().cloned().collect())
    }

    async fn update_matrix(
        &self,
        matrix_id: i64,
        max_x: i32,
        max_y: i32,
    ) -> Result<Option<Matrix>, CoreError> {
        let mut state = self.state.lock().await;
        Ok(state.matrices.get_mut(&matrix_id).map(|matrix| {
            matrix.max_x = max_x;
            matrix.max_y = max_y;
            matrix.clone()
        }))
    }

    async fn delete_matrix(&self, matrix_id: i64) -> Result<bool, CoreError> {
        let mut state = self.state.lock().await;
        if state.drones.values().any(|d| d.matrix_id == matrix_id) {
            // mirrors the foreign key on the SQL backends
            return Err(CoreError::DatabaseError {
                operation: "delete_matrix".to_string(),
                details: format!("matrix {} is still referenced by drones", matrix_id),
            });
        }
        Ok(state.matrices.remove(&matrix_id).is_some())
    }

    async fn insert_drone(&self, drone: &NewDrone) -> Result<Drone, CoreError> {
        let mut state = self.state.lock().await;
        state.next_drone_id += 1;
        let drone = Drone {
            id: state.next_drone_id,
            name: drone.name.clone(),
            model: drone.model.clone(),
            x: drone.x,
            y: drone.y,
            orientation: drone.orientation,
            matrix_id: drone.matrix_id,
            version: 0,
        };
        state.drones.insert(drone.id, drone.clone());
        Ok(drone)
    }

    async fn get_drone(&self, drone_id: i64) -> Result<Option<Drone>, CoreError> {
        Ok(self.state.lock().await.drones.get(&drone_id).cloned())
    }

    async fn list_drones(&self) -> Result<Vec<Drone>, CoreError> {
        Ok(self.state.lock().await.drones.values().cloned().collect())
    }

    async fn find_drones_at(
        &self,
        x: i32,
        y: i32,
        matrix_id: i64,
    ) -> Result<Vec<Drone>, CoreError> {
        Ok(self
            .state
            .lock()
            .await
            .drones
            .values()
            .filter(|d| d.matrix_id == matrix_id && d.x == x && d.y == y)
            .cloned()
            .collect())
    }

    async fn find_drones_by_matrix(&self, matrix_id: i64) -> Result<Vec<Drone>, CoreError> {
        Ok(self
            .state
            .lock()
            .await
            .drones
            .values()
            .filter(|d| d.matrix_id == matrix_id)
            .cloned()
            .collect())
    }

    async fn save_drone(&self, drone: &Drone) -> Result<SaveOutcome, CoreError> {
        let mut state = self.state.lock().await;
        if state.conflict_on_next_save.remove(&drone.id) {
            return Ok(SaveOutcome::VersionConflict);
        }

        let Some(stored) = state.drones.get_mut(&drone.id) else {
            return Ok(SaveOutcome::VersionConflict);
        };
        if stored.version != drone.version {
            return Ok(SaveOutcome::VersionConflict);
        }

        let saved = Drone {
            version: drone.version + 1,
            ..drone.clone()
        };
        *stored = saved.clone();
        state.saves += 1;
        Ok(SaveOutcome::Saved(saved))
    }

    async fn delete_drone(&self, drone_id: i64) -> Result<bool, CoreError> {
        Ok(self.state.lock().await.drones.remove(&drone_id).is_some())
    }

    async fn health_check_db(&self) -> Result<bool, CoreError> {
        Ok(true)
    }
}
