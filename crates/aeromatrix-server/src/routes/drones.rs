// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! `/api/drones` routes.

use aeromatrix_core::HandlerState;
use aeromatrix_core::drone_handlers::{self, DroneInput};
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::dto::{CreateDroneRequest, DroneDto, MessageResponse, UpdateDroneRequest};
use crate::error::ApiError;

async fn create_drone(
    State(state): State<HandlerState>,
    payload: Result<Json<CreateDroneRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DroneDto>), ApiError> {
    let Json(request) = payload?;
    let drone = drone_handlers::create_drone(&state, DroneInput::try_from(request)?).await?;
    Ok((StatusCode::CREATED, Json(drone.into())))
}

async fn list_drones(State(state): State<HandlerState>) -> Result<Json<Vec<DroneDto>>, ApiError> {
    let drones = drone_handlers::list_drones(&state).await?;
    Ok(Json(drones.into_iter().map(DroneDto::from).collect()))
}

async fn get_drone(
    State(state): State<HandlerState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<DroneDto>, ApiError> {
    let Path(drone_id) = path?;
    let drone = drone_handlers::get_drone(&state, drone_id).await?;
    Ok(Json(drone.into()))
}

async fn update_drone(
    State(state): State<HandlerState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateDroneRequest>, JsonRejection>,
) -> Result<Json<DroneDto>, ApiError> {
    let Path(drone_id) = path?;
    let Json(request) = payload?;
    let drone =
        drone_handlers::update_drone(&state, drone_id, DroneInput::try_from(request)?).await?;
    Ok(Json(drone.into()))
}

async fn delete_drone(
    State(state): State<HandlerState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(drone_id) = path?;
    let drone = drone_handlers::delete_drone(&state, drone_id).await?;
    Ok(Json(MessageResponse {
        message: format!("Drone {} deleted", drone.id),
    }))
}

/// Routes for the drone endpoints.
pub fn router() -> Router<HandlerState> {
    Router::new()
        .route("/api/drones", get(list_drones).post(create_drone))
        .route(
            "/api/drones/{drone_id}",
            get(get_drone).put(update_drone).delete(delete_drone),
        )
}
