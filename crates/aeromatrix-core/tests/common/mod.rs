// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Common test infrastructure for aeromatrix-core PostgreSQL tests.

#![allow(dead_code)]

use std::sync::Arc;

use aeromatrix_core::HandlerState;
use aeromatrix_core::movement::Orientation;
use aeromatrix_core::persistence::{Drone, Matrix, NewDrone, Persistence, PostgresPersistence};

/// Test context backed by the database at `TEST_DATABASE_URL`.
pub struct TestContext {
    pub persistence: Arc<PostgresPersistence>,
    pub state: HandlerState,
}

impl TestContext {
    /// Connect and migrate. Returns `None` when no test database is available.
    pub async fn new() -> Option<Self> {
        let database_url = std::env::var("TEST_DATABASE_URL").ok()?;
        let persistence = Arc::new(PostgresPersistence::connect(&database_url, 2).await.ok()?);
        let state = HandlerState::new(persistence.clone());
        Some(Self { persistence, state })
    }

    /// Fresh matrix so tests sharing the database never see each other's drones.
    pub async fn matrix(&self, max_x: i32, max_y: i32) -> Matrix {
        self.persistence
            .insert_matrix(max_x, max_y)
            .await
            .expect("Failed to create matrix")
    }

    /// Insert a drone without placement checks.
    pub async fn drone(&self, matrix: &Matrix, x: i32, y: i32, orientation: Orientation) -> Drone {
        self.persistence
            .insert_drone(&NewDrone::new("Test", "T-1", x, y, orientation, matrix.id))
            .await
            .expect("Failed to create drone")
    }

    /// Current stored state of a drone.
    pub async fn stored(&self, drone_id: i64) -> Drone {
        self.persistence
            .get_drone(drone_id)
            .await
            .expect("Failed to load drone")
            .expect("Drone not found")
    }

    /// Remove a matrix and its drones.
    pub async fn cleanup(&self, matrix: &Matrix) {
        for drone in self
            .persistence
            .find_drones_by_matrix(matrix.id)
            .await
            .unwrap_or_default()
        {
            let _ = self.persistence.delete_drone(drone.id).await;
        }
        let _ = self.persistence.delete_matrix(matrix.id).await;
    }
}

/// Skip test if database URL is not set.
#[macro_export]
macro_rules! skip_if_no_db {
    () => {
        if std::env::var("TEST_DATABASE_URL").is_err() {
            eprintln!("Skipping test: TEST_DATABASE_URL not set");
            return;
        }
    };
}
