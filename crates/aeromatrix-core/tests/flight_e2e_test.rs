// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Flight handler tests against PostgreSQL.

mod common;

use aeromatrix_core::CoreError;
use aeromatrix_core::flight_handlers::{
    DroneCommands, execute_batch_commands, execute_commands, execute_commands_in_sequence,
};
use aeromatrix_core::movement::{MovementCommand, Orientation};
use common::*;

use MovementCommand::{MoveForward, TurnLeft, TurnRight};

#[tokio::test]
async fn test_execute_commands_persists_final_state() {
    skip_if_no_db!();
    let Some(ctx) = TestContext::new().await else {
        eprintln!("Skipping test: failed to create test context");
        return;
    };

    let matrix = ctx.matrix(10, 10).await;
    let drone = ctx.drone(&matrix, 5, 5, Orientation::N).await;

    let moved = execute_commands(&ctx.state, drone.id, &[MoveForward, TurnRight, MoveForward])
        .await
        .unwrap();
    assert_eq!((moved.x, moved.y, moved.orientation), (6, 6, Orientation::E));
    assert_eq!(ctx.stored(drone.id).await, moved);

    ctx.cleanup(&matrix).await;
}

#[tokio::test]
async fn test_boundary_failure_leaves_record_untouched() {
    skip_if_no_db!();
    let Some(ctx) = TestContext::new().await else {
        eprintln!("Skipping test: failed to create test context");
        return;
    };

    let matrix = ctx.matrix(3, 3).await;
    let drone = ctx.drone(&matrix, 0, 3, Orientation::N).await;

    let err = execute_commands(&ctx.state, drone.id, &[TurnLeft, TurnRight, MoveForward])
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::OutOfBounds { .. }));
    assert_eq!(ctx.stored(drone.id).await, drone);

    ctx.cleanup(&matrix).await;
}

#[tokio::test]
async fn test_sequence_stops_at_collision() {
    skip_if_no_db!();
    let Some(ctx) = TestContext::new().await else {
        eprintln!("Skipping test: failed to create test context");
        return;
    };

    let matrix = ctx.matrix(10, 10).await;
    let first = ctx.drone(&matrix, 0, 0, Orientation::E).await;
    let second = ctx.drone(&matrix, 4, 4, Orientation::E).await;
    ctx.drone(&matrix, 5, 4, Orientation::N).await;

    let err = execute_commands_in_sequence(&ctx.state, &[first.id, second.id], &[MoveForward])
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Collision { drone_id, .. } if drone_id == second.id));
    assert_eq!(ctx.stored(first.id).await.x, 1);
    assert_eq!(ctx.stored(second.id).await, second);

    ctx.cleanup(&matrix).await;
}

#[tokio::test]
async fn test_batch_moves_each_drone() {
    skip_if_no_db!();
    let Some(ctx) = TestContext::new().await else {
        eprintln!("Skipping test: failed to create test context");
        return;
    };

    let matrix = ctx.matrix(10, 10).await;
    let a = ctx.drone(&matrix, 1, 1, Orientation::N).await;
    let b = ctx.drone(&matrix, 8, 8, Orientation::S).await;

    execute_batch_commands(
        &ctx.state,
        &[
            DroneCommands::new(a.id, vec![MoveForward]),
            DroneCommands::new(b.id, vec![MoveForward, MoveForward]),
        ],
    )
    .await
    .unwrap();

    assert_eq!(ctx.stored(a.id).await.y, 2);
    assert_eq!(ctx.stored(b.id).await.y, 6);

    ctx.cleanup(&matrix).await;
}
