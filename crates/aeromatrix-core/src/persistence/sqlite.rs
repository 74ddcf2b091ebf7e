//! SQLite-backed persistence implementation.

use std::path::Path;

use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use crate::error::CoreError;
use crate::migrations;

use super::{
    Drone, DroneRow, Matrix, NewDrone, Persistence, SaveOutcome, rows_to_drones,
};

/// SQLite-backed persistence provider.
#[derive(Clone)]
pub struct SqlitePersistence {
    pool: SqlitePool,
}

impl SqlitePersistence {
    /// Create a new SQLite persistence provider from an existing pool.
    ///
    /// Migrations are expected to have been applied already.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to `url`, run migrations and return the provider.
    ///
    /// `sqlite::memory:` databases live inside a single connection, so use
    /// `max_connections = 1` for them.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, CoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|e| CoreError::DatabaseError {
                operation: "connect".to_string(),
                details: format!("Failed to connect to SQLite at {}: {}", url, e),
            })?;

        migrations::run_sqlite(&pool).await?;

        Ok(Self { pool })
    }

    /// Create and initialize a new SQLite persistence from a file path.
    ///
    /// Creates parent directories and the database file when missing, then
    /// runs all migrations.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let persistence = SqlitePersistence::from_path(".data/aeromatrix.db").await?;
    /// ```
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| CoreError::DatabaseError {
                operation: "create_dir".to_string(),
                details: format!("Failed to create directory {:?}: {}", parent, e),
            })?;
        }

        let url = format!("sqlite:{}?mode=rwc", path.to_string_lossy());
        Self::connect(&url, 5).await
    }

    /// Underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl Persistence for SqlitePersistence {
    async fn insert_matrix(&self, max_x: i32, max_y: i32) -> Result<Matrix, CoreError> {
        let matrix = sqlx::query_as::<_, Matrix>(
            r#"
            INSERT INTO matrix (max_x, max_y)
            VALUES (?, ?)
            RETURNING id, max_x, max_y
            "#,
        )
        .bind(max_x)
        .bind(max_y)
        .fetch_one(&self.pool)
        .await?;

        Ok(matrix)
    }

    async fn get_matrix(&self, matrix_id: i64) -> Result<Option<Matrix>, CoreError> {
        let matrix = sqlx::query_as::<_, Matrix>(
            r#"
            SELECT id, max_x, max_y
            FROM matrix
            WHERE id = ?
            "#,
        )
        .bind(matrix_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(matrix)
    }

    async fn list_matrices(&self) -> Result<Vec<Matrix>, CoreError> {
        let matrices = sqlx::query_as::<_, Matrix>(
            r#"
            SELECT id, max_x, max_y
            FROM matrix
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(matrices)
    }

    async fn update_matrix(
        &self,
        matrix_id: i64,
        max_x: i32,
        max_y: i32,
    ) -> Result<Option<Matrix>, CoreError> {
        let matrix = sqlx::query_as::<_, Matrix>(
            r#"
            UPDATE matrix
            SET max_x = ?, max_y = ?
            WHERE id = ?
            RETURNING id, max_x, max_y
            "#,
        )
        .bind(max_x)
        .bind(max_y)
        .bind(matrix_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(matrix)
    }

    async fn delete_matrix(&self, matrix_id: i64) -> Result<bool, CoreError> {
        let result = sqlx::query("DELETE FROM matrix WHERE id = ?")
            .bind(matrix_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_drone(&self, drone: &NewDrone) -> Result<Drone, CoreError> {
        let row = sqlx::query_as::<_, DroneRow>(
            r#"
            INSERT INTO drones (name, model, pos_x, pos_y, orientation, matrix_id, version)
            VALUES (?, ?, ?, ?, ?, ?, 0)
            RETURNING id, name, model, pos_x, pos_y, orientation, matrix_id, version
            "#,
        )
        .bind(&drone.name)
        .bind(&drone.model)
        .bind(drone.x)
        .bind(drone.y)
        .bind(drone.orientation.as_str())
        .bind(drone.matrix_id)
        .fetch_one(&self.pool)
        .await?;

        Drone::try_from(row)
    }

    async fn get_drone(&self, drone_id: i64) -> Result<Option<Drone>, CoreError> {
        let row = sqlx::query_as::<_, DroneRow>(
            r#"
            SELECT id, name, model, pos_x, pos_y, orientation, matrix_id, version
            FROM drones
            WHERE id = ?
            "#,
        )
        .bind(drone_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Drone::try_from).transpose()
    }

    async fn list_drones(&self) -> Result<Vec<Drone>, CoreError> {
        let rows = sqlx::query_as::<_, DroneRow>(
            r#"
            SELECT id, name, model, pos_x, pos_y, orientation, matrix_id, version
            FROM drones
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows_to_drones(rows)
    }

    async fn find_drones_at(
        &self,
        x: i32,
        y: i32,
        matrix_id: i64,
    ) -> Result<Vec<Drone>, CoreError> {
        let rows = sqlx::query_as::<_, DroneRow>(
            r#"
            SELECT id, name, model, pos_x, pos_y, orientation, matrix_id, version
            FROM drones
            WHERE matrix_id = ? AND pos_x = ? AND pos_y = ?
            ORDER BY id
            "#,
        )
        .bind(matrix_id)
        .bind(x)
        .bind(y)
        .fetch_all(&self.pool)
        .await?;

        rows_to_drones(rows)
    }

    async fn find_drones_by_matrix(&self, matrix_id: i64) -> Result<Vec<Drone>, CoreError> {
        let rows = sqlx::query_as::<_, DroneRow>(
            r#"
            SELECT id, name, model, pos_x, pos_y, orientation, matrix_id, version
            FROM drones
            WHERE matrix_id = ?
            ORDER BY id
            "#,
        )
        .bind(matrix_id)
        .fetch_all(&self.pool)
        .await?;

        rows_to_drones(rows)
    }

    async fn save_drone(&self, drone: &Drone) -> Result<SaveOutcome, CoreError> {
        let result = sqlx::query(
            r#"
            UPDATE drones
            SET name = ?, model = ?, pos_x = ?, pos_y = ?, orientation = ?,
                matrix_id = ?, version = version + 1
            WHERE id = ? AND version = ?
            "#,
        )
        .bind(&drone.name)
        .bind(&drone.model)
        .bind(drone.x)
        .bind(drone.y)
        .bind(drone.orientation.as_str())
        .bind(drone.matrix_id)
        .bind(drone.id)
        .bind(drone.version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(SaveOutcome::VersionConflict);
        }

        Ok(SaveOutcome::Saved(Drone {
            version: drone.version + 1,
            ..drone.clone()
        }))
    }

    async fn delete_drone(&self, drone_id: i64) -> Result<bool, CoreError> {
        let result = sqlx::query("DELETE FROM drones WHERE id = ?")
            .bind(drone_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn health_check_db(&self) -> Result<bool, CoreError> {
        let row: (i32,) = sqlx::query_as("SELECT 1").fetch_one(&self.pool).await?;
        Ok(row.0 == 1)
    }
}
