// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Request and response bodies (camelCase on the wire).

use aeromatrix_core::CoreError;
use aeromatrix_core::drone_handlers::DroneInput;
use aeromatrix_core::flight_handlers::DroneCommands;
use aeromatrix_core::matrix_handlers::MatrixWithDrones;
use aeromatrix_core::movement::{MovementCommand, Orientation};
use aeromatrix_core::persistence::Drone;
use serde::{Deserialize, Serialize};

/// A drone as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DroneDto {
    /// Database id.
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
}

impl From<Drone> for DroneDto {
    fn from(drone: Drone) -> Self {
        Self {
            id: drone.id,
            name: drone.name,
            model: drone.model,
            x: drone.x,
            y: drone.y,
            orientation: drone.orientation,
            matrix_id: drone.matrix_id,
        }
    }
}

/// A matrix with its drones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixDto {
    /// Database id.
    pub id: i64,
    /// Largest valid X coordinate.
    pub max_x: i32,
    /// Largest valid Y coordinate.
    pub max_y: i32,
    /// Drones placed on the matrix.
    pub drones: Vec<DroneDto>,
}

impl From<MatrixWithDrones> for MatrixDto {
    fn from(value: MatrixWithDrones) -> Self {
        Self {
            id: value.matrix.id,
            max_x: value.matrix.max_x,
            max_y: value.matrix.max_y,
            drones: value.drones.into_iter().map(DroneDto::from).collect(),
        }
    }
}

/// Body of drone create and update requests.
///
/// Every field is optional on the wire so that a missing one is reported
/// as a validation error naming the field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DroneRequest {
    /// Matrix to place the drone on.
    pub matrix_id: Option<i64>,
    /// Display name.
    pub name: Option<String>,
    /// Hardware model.
    pub model: Option<String>,
    /// X coordinate.
    pub x: Option<i32>,
    /// Y coordinate.
    pub y: Option<i32>,
    /// Heading.
    pub orientation: Option<Orientation>,
}

/// Body of `POST /api/drones`.
pub type CreateDroneRequest = DroneRequest;
/// Body of `PUT /api/drones/{droneId}`.
pub type UpdateDroneRequest = DroneRequest;

fn required<T>(value: Option<T>, field: &str) -> Result<T, CoreError> {
    value.ok_or_else(|| CoreError::validation(field, "is required"))
}

impl TryFrom<DroneRequest> for DroneInput {
    type Error = CoreError;

    fn try_from(request: DroneRequest) -> Result<Self, CoreError> {
        Ok(DroneInput {
            matrix_id: required(request.matrix_id, "matrixId")?,
            name: required(request.name, "name")?,
            model: required(request.model, "model")?,
            x: required(request.x, "x")?,
            y: required(request.y, "y")?,
            orientation: required(request.orientation, "orientation")?,
        })
    }
}

/// Body of matrix create and update requests.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixRequest {
    /// Largest valid X coordinate.
    pub max_x: Option<i32>,
    /// Largest valid Y coordinate.
    pub max_y: Option<i32>,
}

/// Body of `POST /api/matrices`.
pub type CreateMatrixRequest = MatrixRequest;
/// Body of `PUT /api/matrices/{matrixId}`.
pub type UpdateMatrixRequest = MatrixRequest;

impl MatrixRequest {
    /// `(maxX, maxY)`, failing on a missing field.
    pub fn dimensions(&self) -> Result<(i32, i32), CoreError> {
        Ok((
            required(self.max_x, "maxX")?,
            required(self.max_y, "maxY")?,
        ))
    }
}

/// Body of the single-drone and multi-drone command endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommandsRequest {
    /// `null` and a missing field both count as an empty list.
    #[serde(default)]
    pub commands: Option<Vec<MovementCommand>>,
}

impl CommandsRequest {
    /// The command list, empty when absent.
    pub fn commands(&self) -> &[MovementCommand] {
        self.commands.as_deref().unwrap_or_default()
    }
}

/// One entry of a batch request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DroneCommandsDto {
    /// Target drone.
    pub drone_id: i64,
    /// Commands, applied in order.
    #[serde(default)]
    pub commands: Option<Vec<MovementCommand>>,
}

/// Body of `POST /api/flights/batch-commands`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchCommandsRequest {
    /// One entry per drone; `null` is an empty batch.
    #[serde(default)]
    pub commands: Option<Vec<DroneCommandsDto>>,
}

impl BatchCommandsRequest {
    /// Convert into core batch entries; a missing list is an empty batch.
    pub fn into_batch(self) -> Vec<DroneCommands> {
        self.commands
            .unwrap_or_default()
            .into_iter()
            .map(|entry| DroneCommands::new(entry.drone_id, entry.commands.unwrap_or_default()))
            .collect()
    }
}

/// Body of `DELETE /api/drones/{droneId}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Confirmation text.
    pub message: String,
}
