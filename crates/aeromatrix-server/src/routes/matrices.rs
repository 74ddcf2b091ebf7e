// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! `/api/matrices` routes.

use aeromatrix_core::HandlerState;
use aeromatrix_core::matrix_handlers;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::dto::{CreateMatrixRequest, MatrixDto, UpdateMatrixRequest};
use crate::error::ApiError;

async fn create_matrix(
    State(state): State<HandlerState>,
    payload: Result<Json<CreateMatrixRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MatrixDto>), ApiError> {
    let Json(request) = payload?;
    let (max_x, max_y) = request.dimensions()?;
    let created = matrix_handlers::create_matrix(&state, max_x, max_y).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

async fn list_matrices(
    State(state): State<HandlerState>,
) -> Result<Json<Vec<MatrixDto>>, ApiError> {
    let matrices = matrix_handlers::list_matrices(&state).await?;
    Ok(Json(matrices.into_iter().map(MatrixDto::from).collect()))
}

async fn get_matrix(
    State(state): State<HandlerState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<MatrixDto>, ApiError> {
    let Path(matrix_id) = path?;
    let matrix = matrix_handlers::get_matrix(&state, matrix_id).await?;
    Ok(Json(matrix.into()))
}

async fn update_matrix(
    State(state): State<HandlerState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateMatrixRequest>, JsonRejection>,
) -> Result<Json<MatrixDto>, ApiError> {
    let Path(matrix_id) = path?;
    let Json(request) = payload?;
    let (max_x, max_y) = request.dimensions()?;
    let updated = matrix_handlers::update_matrix(&state, matrix_id, max_x, max_y).await?;
    Ok(Json(updated.into()))
}

async fn delete_matrix(
    State(state): State<HandlerState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(matrix_id) = path?;
    matrix_handlers::delete_matrix(&state, matrix_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Routes for the matrix endpoints.
pub fn router() -> Router<HandlerState> {
    Router::new()
        .route("/api/matrices", get(list_matrices).post(create_matrix))
        .route(
            "/api/matrices/{matrix_id}",
            get(get_matrix).put(update_matrix).delete(delete_matrix),
        )
}
