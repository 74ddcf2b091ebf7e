//! Persistence interfaces and backends for aeromatrix-core.
//!
//! This module defines the storage abstraction consumed by the movement
//! engine and handlers, plus the PostgreSQL, SQLite and in-memory backends.
//!
//! Drone writes are version-checked: [`Persistence::save_drone`] only
//! succeeds when the stored `version` still matches the one that was read,
//! and reports [`SaveOutcome::VersionConflict`] otherwise.

pub mod memory;
pub mod postgres;
pub mod sqlite;

pub use self::memory::MemoryPersistence;
pub use self::postgres::PostgresPersistence;
pub use self::sqlite::SqlitePersistence;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::CoreError;
use crate::movement::Orientation;

/// Bounded grid `[0..=max_x] × [0..=max_y]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Matrix {
    /// Database primary key.
    pub id: i64,
    /// Largest valid X coordinate.
    pub max_x: i32,
    /// Largest valid Y coordinate.
    pub max_y: i32,
}

impl Matrix {
    /// Whether `(x, y)` is a cell of this matrix (inclusive upper bound).
    pub fn contains(&self, x: i64, y: i64) -> bool {
        (0..=i64::from(self.max_x)).contains(&x) && (0..=i64::from(self.max_y)).contains(&y)
    }
}

/// Drone placed on a matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Drone {
    /// Database primary key.
    pub id: i64,
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
    /// Owning matrix.
    pub matrix_id: i64,
    /// Optimistic-lock counter, bumped by every successful save.
    pub version: i64,
}

/// Fields of a drone that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDrone {
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
    /// Owning matrix.
    pub matrix_id: i64,
}

impl NewDrone {
    /// Convenience constructor.
    pub fn new(
        name: impl Into<String>,
        model: impl Into<String>,
        x: i32,
        y: i32,
        orientation: Orientation,
        matrix_id: i64,
    ) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            x,
            y,
            orientation,
            matrix_id,
        }
    }
}

/// Result of a version-checked drone write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The write was applied; carries the drone with its new version.
    Saved(Drone),
    /// The stored record was modified or deleted since it was read.
    VersionConflict,
}

/// Drone row as stored; orientation is kept as its single-letter code.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct DroneRow {
    pub id: i64,
    pub name: String,
    pub model: String,
    pub pos_x: i32,
    pub pos_y: i32,
    pub orientation: String,
    pub matrix_id: i64,
    pub version: i64,
}

impl TryFrom<DroneRow> for Drone {
    type Error = CoreError;

    fn try_from(row: DroneRow) -> Result<Self, CoreError> {
        let orientation = row
            .orientation
            .parse()
            .map_err(|_| CoreError::DatabaseError {
                operation: "decode_drone".to_string(),
                details: format!(
                    "drone {} has unknown orientation '{}'",
                    row.id, row.orientation
                ),
            })?;

        Ok(Drone {
            id: row.id,
            name: row.name,
            model: row.model,
            x: row.pos_x,
            y: row.pos_y,
            orientation,
            matrix_id: row.matrix_id,
            version: row.version,
        })
    }
}

pub(crate) fn rows_to_drones(rows: Vec<DroneRow>) -> Result<Vec<Drone>, CoreError> {
    rows.into_iter().map(Drone::try_from).collect()
}

/// Persistence interface used by the movement engine and handlers.
#[async_trait]
pub trait Persistence: Send + Sync {
    /// Create a matrix.
    async fn insert_matrix(&self, max_x: i32, max_y: i32) -> Result<Matrix, CoreError>;

    /// Fetch a matrix by id.
    async fn get_matrix(&self, matrix_id: i64) -> Result<Option<Matrix>, CoreError>;

    /// All matrices ordered by id.
    async fn list_matrices(&self) -> Result<Vec<Matrix>, CoreError>;

    /// Resize a matrix. Returns `None` if it does not exist.
    async fn update_matrix(
        &self,
        matrix_id: i64,
        max_x: i32,
        max_y: i32,
    ) -> Result<Option<Matrix>, CoreError>;

    /// Delete a matrix. Returns false if it did not exist.
    async fn delete_matrix(&self, matrix_id: i64) -> Result<bool, CoreError>;

    /// Create a drone with version 0.
    async fn insert_drone(&self, drone: &NewDrone) -> Result<Drone, CoreError>;

    /// Fetch a drone by id.
    async fn get_drone(&self, drone_id: i64) -> Result<Option<Drone>, CoreError>;

    /// All drones ordered by id.
    async fn list_drones(&self) -> Result<Vec<Drone>, CoreError>;

    /// Drones stored at exactly `(x, y)` on `matrix_id`, ordered by id.
    async fn find_drones_at(
        &self,
        x: i32,
        y: i32,
        matrix_id: i64,
    ) -> Result<Vec<Drone>, CoreError>;

    /// Drones placed on `matrix_id`, ordered by id.
    async fn find_drones_by_matrix(&self, matrix_id: i64) -> Result<Vec<Drone>, CoreError>;

    /// Write every mutable field of `drone` if the stored version equals `drone.version`.
    async fn save_drone(&self, drone: &Drone) -> Result<SaveOutcome, CoreError>;

    /// Delete a drone. Returns false if it did not exist.
    async fn delete_drone(&self, drone_id: i64) -> Result<bool, CoreError>;

    /// Whether the backing store answers queries.
    async fn health_check_db(&self) -> Result<bool, CoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_contains_is_inclusive() {
        let matrix = Matrix {
            id: 1,
            max_x: 3,
            max_y: 2,
        };
        assert!(matrix.contains(0, 0));
        assert!(matrix.contains(3, 2));
        assert!(!matrix.contains(4, 2));
        assert!(!matrix.contains(3, 3));
        assert!(!matrix.contains(-1, 0));
        assert!(!matrix.contains(0, -1));
    }

    #[test]
    fn test_drone_row_decoding() {
        let row = DroneRow {
            id: 7,
            name: "Alpha".to_string(),
            model: "X1".to_string(),
            pos_x: 1,
            pos_y: 2,
            orientation: "E".to_string(),
            matrix_id: 3,
            version: 4,
        };
        let drone = Drone::try_from(row.clone()).unwrap();
        assert_eq!(drone.orientation, Orientation::E);
        assert_eq!((drone.x, drone.y, drone.version), (1, 2, 4));

        let bad = DroneRow {
            orientation: "Q".to_string(),
            ..row
        };
        assert!(matches!(
            Drone::try_from(bad),
            Err(CoreError::DatabaseError { .. })
        ));
    }
}
