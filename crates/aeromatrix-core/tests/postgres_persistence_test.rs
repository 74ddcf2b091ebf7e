// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! PostgreSQL persistence tests.

mod common;

use aeromatrix_core::movement::Orientation;
use aeromatrix_core::persistence::{Persistence, SaveOutcome};
use common::*;

#[tokio::test]
async fn test_matrix_round_trip() {
    skip_if_no_db!();
    let Some(ctx) = TestContext::new().await else {
        eprintln!("Skipping test: failed to create test context");
        return;
    };

    let matrix = ctx.matrix(7, 3).await;
    let loaded = ctx.persistence.get_matrix(matrix.id).await.unwrap();
    assert_eq!(loaded, Some(matrix.clone()));

    let resized = ctx
        .persistence
        .update_matrix(matrix.id, 9, 9)
        .await
        .unwrap()
        .unwrap();
    assert_eq!((resized.max_x, resized.max_y), (9, 9));

    assert!(ctx.persistence.delete_matrix(matrix.id).await.unwrap());
    assert!(ctx.persistence.get_matrix(matrix.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_orientation_is_stored_as_letter() {
    skip_if_no_db!();
    let Some(ctx) = TestContext::new().await else {
        eprintln!("Skipping test: failed to create test context");
        return;
    };

    let matrix = ctx.matrix(5, 5).await;
    let drone = ctx.drone(&matrix, 1, 1, Orientation::O).await;

    let (raw,): (String,) = sqlx::query_as("SELECT orientation FROM drones WHERE id = $1")
        .bind(drone.id)
        .fetch_one(ctx.persistence.pool())
        .await
        .unwrap();
    assert_eq!(raw, "O");
    assert_eq!(ctx.stored(drone.id).await.orientation, Orientation::O);

    ctx.cleanup(&matrix).await;
}

#[tokio::test]
async fn test_find_drones_at_is_scoped_to_matrix() {
    skip_if_no_db!();
    let Some(ctx) = TestContext::new().await else {
        eprintln!("Skipping test: failed to create test context");
        return;
    };

    let a = ctx.matrix(5, 5).await;
    let b = ctx.matrix(5, 5).await;
    let in_a = ctx.drone(&a, 2, 2, Orientation::N).await;
    ctx.drone(&b, 2, 2, Orientation::N).await;

    let found = ctx.persistence.find_drones_at(2, 2, a.id).await.unwrap();
    assert_eq!(found, vec![in_a]);
    assert_eq!(
        ctx.persistence.find_drones_by_matrix(b.id).await.unwrap().len(),
        1
    );

    ctx.cleanup(&a).await;
    ctx.cleanup(&b).await;
}

#[tokio::test]
async fn test_stale_save_is_a_version_conflict() {
    skip_if_no_db!();
    let Some(ctx) = TestContext::new().await else {
        eprintln!("Skipping test: failed to create test context");
        return;
    };

    let matrix = ctx.matrix(5, 5).await;
    let drone = ctx.drone(&matrix, 0, 0, Orientation::N).await;

    let SaveOutcome::Saved(saved) = ctx.persistence.save_drone(&drone).await.unwrap() else {
        panic!("first save should apply");
    };
    assert_eq!(saved.version, drone.version + 1);

    assert_eq!(
        ctx.persistence.save_drone(&drone).await.unwrap(),
        SaveOutcome::VersionConflict
    );

    ctx.cleanup(&matrix).await;
}

#[tokio::test]
async fn test_delete_matrix_with_drones_fails() {
    skip_if_no_db!();
    let Some(ctx) = TestContext::new().await else {
        eprintln!("Skipping test: failed to create test context");
        return;
    };

    let matrix = ctx.matrix(5, 5).await;
    ctx.drone(&matrix, 0, 0, Orientation::N).await;

    assert!(ctx.persistence.delete_matrix(matrix.id).await.is_err());

    ctx.cleanup(&matrix).await;
}

#[tokio::test]
async fn test_health_check() {
    skip_if_no_db!();
    let Some(ctx) = TestContext::new().await else {
        eprintln!("Skipping test: failed to create test context");
        return;
    };

    assert!(ctx.persistence.health_check_db().await.unwrap());
}
