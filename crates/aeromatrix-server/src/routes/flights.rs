// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! `/api/flights` routes.

use aeromatrix_core::HandlerState;
use aeromatrix_core::flight_handlers;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use crate::dto::{BatchCommandsRequest, CommandsRequest, DroneDto};
use crate::error::ApiError;

/// Query string of the multi-drone command endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DroneIdsQuery {
    /// Comma-separated drone ids, e.g. `1,2,3`.
    drone_ids: Option<String>,
}

impl DroneIdsQuery {
    /// Parse `droneIds`; a missing or blank parameter is rejected.
    fn parse(&self) -> Result<Vec<i64>, ApiError> {
        let ids = self
            .drone_ids
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<i64>().map_err(|_| {
                    ApiError::InvalidInput(format!("'{part}' is not a valid drone id."))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if ids.is_empty() {
            return Err(ApiError::InvalidInput("droneIds is required.".to_string()));
        }
        Ok(ids)
    }
}

async fn execute_commands(
    State(state): State<HandlerState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<CommandsRequest>, JsonRejection>,
) -> Result<Json<DroneDto>, ApiError> {
    let Path(drone_id) = path?;
    let Json(request) = payload?;
    let drone = flight_handlers::execute_commands(&state, drone_id, request.commands()).await?;
    Ok(Json(drone.into()))
}

async fn execute_commands_in_sequence(
    State(state): State<HandlerState>,
    query: Result<Query<DroneIdsQuery>, QueryRejection>,
    payload: Result<Json<CommandsRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Query(query) = query?;
    let drone_ids = query.parse()?;
    let Json(request) = payload?;
    flight_handlers::execute_commands_in_sequence(&state, &drone_ids, request.commands()).await?;
    Ok(StatusCode::OK)
}

async fn execute_batch_commands(
    State(state): State<HandlerState>,
    payload: Result<Json<BatchCommandsRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(request) = payload?;
    flight_handlers::execute_batch_commands(&state, &request.into_batch()).await?;
    Ok(StatusCode::ACCEPTED)
}

/// Routes for the flight command endpoints.
pub fn router() -> Router<HandlerState> {
    Router::new()
        .route(
            "/api/flights/drones/{drone_id}/commands",
            post(execute_commands),
        )
        .route(
            "/api/flights/drones/commands",
            post(execute_commands_in_sequence),
        )
        .route("/api/flights/batch-commands", post(execute_batch_commands))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drone_ids_parsing() {
        let query = DroneIdsQuery {
            drone_ids: Some("1, 2,,3".to_string()),
        };
        assert_eq!(query.parse().unwrap(), vec![1, 2, 3]);

        for missing in [None, Some(""), Some(" , ")] {
            let query = DroneIdsQuery {
                drone_ids: missing.map(str::to_string),
            };
            assert!(matches!(query.parse(), Err(ApiError::InvalidInput(_))));
        }

        let bad = DroneIdsQuery {
            drone_ids: Some("1,x".to_string()),
        };
        assert!(matches!(bad.parse(), Err(ApiError::InvalidInput(_))));
    }
}
