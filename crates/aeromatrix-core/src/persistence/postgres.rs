// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! PostgreSQL persistence for aeromatrix-core.
//!
//! Storage access is written as free functions over a `PgPool`; the
//! [`Persistence`] impl at the bottom delegates to them.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::error::CoreError;
use crate::migrations;

use super::{
    Drone, DroneRow, Matrix, NewDrone, Persistence, SaveOutcome, rows_to_drones,
};

/// PostgreSQL-backed persistence implementation.
#[derive(Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    /// Create a new Postgres-backed persistence implementation.
    ///
    /// Migrations are expected to have been applied already.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to `url`, run migrations and return the provider.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, CoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|e| CoreError::DatabaseError {
                operation: "connect".to_string(),
                details: format!("Failed to connect to PostgreSQL: {}", e),
            })?;

        migrations::run_postgres(&pool).await?;

        Ok(Self { pool })
    }

    /// Underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// ============================================================================
// Matrix Operations
// ============================================================================

/// Create a matrix.
pub async fn insert_matrix(pool: &PgPool, max_x: i32, max_y: i32) -> Result<Matrix, CoreError> {
    let matrix = sqlx::query_as::<_, Matrix>(
        r#"
        INSERT INTO matrix (max_x, max_y)
        VALUES ($1, $2)
        RETURNING id, max_x, max_y
        "#,
    )
    .bind(max_x)
    .bind(max_y)
    .fetch_one(pool)
    .await?;

    Ok(matrix)
}

/// Fetch a matrix by id.
pub async fn get_matrix(pool: &PgPool, matrix_id: i64) -> Result<Option<Matrix>, CoreError> {
    let matrix = sqlx::query_as::<_, Matrix>(
        r#"
        SELECT id, max_x, max_y
        FROM matrix
        WHERE id = $1
        "#,
    )
    .bind(matrix_id)
    .fetch_optional(pool)
    .await?;

    Ok(matrix)
}

/// All matrices ordered by id.
pub async fn list_matrices(pool: &PgPool) -> Result<Vec<Matrix>, CoreError> {
    let matrices = sqlx::query_as::<_, Matrix>(
        r#"
        SELECT id, max_x, max_y
        FROM matrix
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(matrices)
}

/// Resize a matrix.
pub async fn update_matrix(
    pool: &PgPool,
    matrix_id: i64,
    max_x: i32,
    max_y: i32,
) -> Result<Option<Matrix>, CoreError> {
    let matrix = sqlx::query_as::<_, Matrix>(
        r#"
        UPDATE matrix
        SET max_x = $1, max_y = $2
        WHERE id = $3
        RETURNING id, max_x, max_y
        "#,
    )
    .bind(max_x)
    .bind(max_y)
    .bind(matrix_id)
    .fetch_optional(pool)
    .await?;

    Ok(matrix)
}

/// Delete a matrix.
pub async fn delete_matrix(pool: &PgPool, matrix_id: i64) -> Result<bool, CoreError> {
    let result = sqlx::query("DELETE FROM matrix WHERE id = $1")
        .bind(matrix_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

// ============================================================================
// Drone Operations
// ============================================================================

/// Create a drone with version 0.
pub async fn insert_drone(pool: &PgPool, drone: &NewDrone) -> Result<Drone, CoreError> {
    let row = sqlx::query_as::<_, DroneRow>(
        r#"
        INSERT INTO drones (name, model, pos_x, pos_y, orientation, matrix_id, version)
        VALUES ($1, $2, $3, $4, $5, $6, 0)
        RETURNING id, name, model, pos_x, pos_y, orientation, matrix_id, version
        "#,
    )
    .bind(&drone.name)
    .bind(&drone.model)
    .bind(drone.x)
    .bind(drone.y)
    .bind(drone.orientation.as_str())
    .bind(drone.matrix_id)
    .fetch_one(pool)
    .await?;

    Drone::try_from(row)
}

/// Fetch a drone by id.
pub async fn get_drone(pool: &PgPool, drone_id: i64) -> Result<Option<Drone>, CoreError> {
    let row = sqlx::query_as::<_, DroneRow>(
        r#"
        SELECT id, name, model, pos_x, pos_y, orientation, matrix_id, version
        FROM drones
        WHERE id = $1
        "#,
    )
    .bind(drone_id)
    .fetch_optional(pool)
    .await?;

    row.map(Drone::try_from).transpose()
}

/// All drones ordered by id.
pub async fn list_drones(pool: &PgPool) -> Result<Vec<Drone>, CoreError> {
    let rows = sqlx::query_as::<_, DroneRow>(
        r#"
        SELECT id, name, model, pos_x, pos_y, orientation, matrix_id, version
        FROM drones
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows_to_drones(rows)
}

/// Drones stored at `(x, y)` on a matrix.
pub async fn find_drones_at(
    pool: &PgPool,
    x: i32,
    y: i32,
    matrix_id: i64,
) -> Result<Vec<Drone>, CoreError> {
    let rows = sqlx::query_as::<_, DroneRow>(
        r#"
        SELECT id, name, model, pos_x, pos_y, orientation, matrix_id, version
        FROM drones
        WHERE matrix_id = $1 AND pos_x = $2 AND pos_y = $3
        ORDER BY id
        "#,
    )
    .bind(matrix_id)
    .bind(x)
    .bind(y)
    .fetch_all(pool)
    .await?;

    rows_to_drones(rows)
}

/// Drones placed on a matrix.
pub async fn find_drones_by_matrix(pool: &PgPool, matrix_id: i64) -> Result<Vec<Drone>, CoreError> {
    let rows = sqlx::query_as::<_, DroneRow>(
        r#"
        SELECT id, name, model, pos_x, pos_y, orientation, matrix_id, version
        FROM drones
        WHERE matrix_id = $1
        ORDER BY id
        "#,
    )
    .bind(matrix_id)
    .fetch_all(pool)
    .await?;

    rows_to_drones(rows)
}

/// Version-checked write of a drone.
///
/// Zero affected rows means another writer bumped the version (or deleted
/// the row) after `drone` was read.
pub async fn save_drone(pool: &PgPool, drone: &Drone) -> Result<SaveOutcome, CoreError> {
    let result = sqlx::query(
        r#"
        UPDATE drones
        SET name = $1, model = $2, pos_x = $3, pos_y = $4, orientation = $5,
            matrix_id = $6, version = version + 1
        WHERE id = $7 AND version = $8
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
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(SaveOutcome::VersionConflict);
    }

    Ok(SaveOutcome::Saved(Drone {
        version: drone.version + 1,
        ..drone.clone()
    }))
}

/// Delete a drone.
pub async fn delete_drone(pool: &PgPool, drone_id: i64) -> Result<bool, CoreError> {
    let result = sqlx::query("DELETE FROM drones WHERE id = $1")
        .bind(drone_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Check database connectivity.
pub async fn health_check_db(pool: &PgPool) -> Result<bool, CoreError> {
    let row: (i32,) = sqlx::query_as("SELECT 1").fetch_one(pool).await?;
    Ok(row.0 == 1)
}

#[async_trait::async_trait]
impl Persistence for PostgresPersistence {
    async fn insert_matrix(&self, max_x: i32, max_y: i32) -> Result<Matrix, CoreError> {
        insert_matrix(&self.pool, max_x, max_y).await
    }

    async fn get_matrix(&self, matrix_id: i64) -> Result<Option<Matrix>, CoreError> {
        get_matrix(&self.pool, matrix_id).await
    }

    async fn list_matrices(&self) -> Result<Vec<Matrix>, CoreError> {
        list_matrices(&self.pool).await
    }

    async fn update_matrix(
        &self,
        matrix_id: i64,
        max_x: i32,
        max_y: i32,
    ) -> Result<Option<Matrix>, CoreError> {
        update_matrix(&self.pool, matrix_id, max_x, max_y).await
    }

    async fn delete_matrix(&self, matrix_id: i64) -> Result<bool, CoreError> {
        delete_matrix(&self.pool, matrix_id).await
    }

    async fn insert_drone(&self, drone: &NewDrone) -> Result<Drone, CoreError> {
        insert_drone(&self.pool, drone).await
    }

    async fn get_drone(&self, drone_id: i64) -> Result<Option<Drone>, CoreError> {
        get_drone(&self.pool, drone_id).await
    }

    async fn list_drones(&self) -> Result<Vec<Drone>, CoreError> {
        list_drones(&self.pool).await
    }

    async fn find_drones_at(
        &self,
        x: i32,
        y: i32,
        matrix_id: i64,
    ) -> Result<Vec<Drone>, CoreError> {
        find_drones_at(&self.pool, x, y, matrix_id).await
    }

    async fn find_drones_by_matrix(&self, matrix_id: i64) -> Result<Vec<Drone>, CoreError> {
        find_drones_by_matrix(&self.pool, matrix_id).await
    }

    async fn save_drone(&self, drone: &Drone) -> Result<SaveOutcome, CoreError> {
        save_drone(&self.pool, drone).await
    }

    async fn delete_drone(&self, drone_id: i64) -> Result<bool, CoreError> {
        delete_drone(&self.pool, drone_id).await
    }

    async fn health_check_db(&self) -> Result<bool, CoreError> {
        health_check_db(&self.pool).await
    }
}
