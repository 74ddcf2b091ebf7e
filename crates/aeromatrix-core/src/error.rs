// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for aeromatrix-core.
//!
//! Every failure carries structured context and a stable error code. The
//! HTTP layer maps [`ErrorKind`] to a status code; nothing below it recovers
//! or retries.

use thiserror::Error;

/// Result type using CoreError
pub type Result<T> = std::result::Result<T, CoreError>;

/// Taxonomy used by the HTTP boundary to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced drone or matrix does not exist.
    NotFound,
    /// The request is well-formed but violates a grid invariant.
    Conflict,
    /// The request itself is malformed.
    BadRequest,
    /// Storage failure.
    Internal,
}

/// Core errors that can occur while validating or executing requests.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum CoreError {
    /// Drone was not found.
    #[error("Drone ID {drone_id} not found")]
    DroneNotFound {
        /// The drone ID that was not found.
        drone_id: i64,
    },

    /// Matrix was not found.
    #[error("Matrix ID {matrix_id} not found")]
    MatrixNotFound {
        /// The matrix ID that was not found.
        matrix_id: i64,
    },

    /// A position lies outside the matrix bounds.
    #[error(
        "Position ({x},{y}) is outside matrix {matrix_id} (limits: 0-{max_x}, 0-{max_y}){}",
        drone_suffix(.drone_id)
    )]
    OutOfBounds {
        /// Drone being moved or placed, if it already exists.
        drone_id: Option<i64>,
        /// The matrix whose bounds were violated.
        matrix_id: i64,
        /// Requested X coordinate.
        x: i64,
        /// Requested Y coordinate.
        y: i64,
        /// Matrix upper X bound (inclusive).
        max_x: i32,
        /// Matrix upper Y bound (inclusive).
        max_y: i32,
    },

    /// Two drones would share a cell.
    #[error("Collision detected between drone {drone_id} and drone {other_id} at position ({x},{y})")]
    Collision {
        /// The drone being moved.
        drone_id: i64,
        /// The drone already occupying the cell.
        other_id: i64,
        /// X coordinate of the contested cell.
        x: i32,
        /// Y coordinate of the contested cell.
        y: i32,
    },

    /// A create or update targets an occupied cell.
    #[error("Position ({x},{y}) in matrix {matrix_id} is occupied by drone {occupant_id}")]
    PositionOccupied {
        /// The matrix containing the cell.
        matrix_id: i64,
        /// X coordinate.
        x: i32,
        /// Y coordinate.
        y: i32,
        /// Drone currently at the cell.
        occupant_id: i64,
    },

    /// The drone record changed since it was read.
    #[error("Concurrency conflict on drone {drone_id}")]
    ConcurrencyConflict {
        /// The drone whose write was rejected.
        drone_id: i64,
    },

    /// A matrix cannot be deleted while drones remain on it.
    #[error("Cannot delete matrix {matrix_id}. Active drones: {}", join_ids(.drone_ids))]
    MatrixNotEmpty {
        /// The matrix.
        matrix_id: i64,
        /// Drones still placed on the matrix.
        drone_ids: Vec<i64>,
    },

    /// A matrix cannot shrink below an existing drone.
    #[error(
        "Drone {drone_id} is out of bounds for new size of matrix {matrix_id} (maxX: {max_x}, maxY: {max_y})"
    )]
    MatrixShrinkConflict {
        /// The matrix.
        matrix_id: i64,
        /// First drone that would end up outside.
        drone_id: i64,
        /// Requested X bound.
        max_x: i32,
        /// Requested Y bound.
        max_y: i32,
    },

    /// A command list was null or empty.
    #[error("{}", empty_commands_message(.drone_id))]
    EmptyCommands {
        /// Drone the list was meant for, when known.
        drone_id: Option<i64>,
    },

    /// A command value is not one of the supported movements.
    #[error("Unsupported command: {command}")]
    UnsupportedCommand {
        /// Raw command value (`null` when missing).
        command: String,
    },

    /// Input validation failed.
    #[error("Validation error for '{field}': {message}")]
    ValidationError {
        /// The field that failed validation.
        field: String,
        /// The validation error message.
        message: String,
    },

    /// Database operation failed.
    #[error("Database error during '{operation}': {details}")]
    DatabaseError {
        /// The operation that failed.
        operation: String,
        /// Error details.
        details: String,
    },
}

fn drone_suffix(drone_id: &Option<i64>) -> String {
    drone_id
        .map(|id| format!(" for drone {id}"))
        .unwrap_or_default()
}

fn empty_commands_message(drone_id: &Option<i64>) -> String {
    match drone_id {
        Some(id) => format!("Drone {id} has no commands to execute"),
        None => "Command list must not be empty".to_string(),
    }
}

fn join_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl CoreError {
    /// Shorthand for a [`CoreError::ValidationError`].
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Get the error code string for this error type.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DroneNotFound { .. } => "DRONE_NOT_FOUND",
            Self::MatrixNotFound { .. } => "MATRIX_NOT_FOUND",
            Self::OutOfBounds { .. } => "OUT_OF_BOUNDS",
            Self::Collision { .. } => "COLLISION",
            Self::PositionOccupied { .. } => "POSITION_OCCUPIED",
            Self::ConcurrencyConflict { .. } => "CONCURRENCY_CONFLICT",
            Self::MatrixNotEmpty { .. } => "MATRIX_NOT_EMPTY",
            Self::MatrixShrinkConflict { .. } => "MATRIX_SHRINK_CONFLICT",
            Self::EmptyCommands { .. } => "EMPTY_COMMANDS",
            Self::UnsupportedCommand { .. } => "UNSUPPORTED_COMMAND",
            Self::ValidationError { .. } => "VALIDATION_ERROR",
            Self::DatabaseError { .. } => "DATABASE_ERROR",
        }
    }

    /// Classify this error for the HTTP boundary.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DroneNotFound { .. } | Self::MatrixNotFound { .. } => ErrorKind::NotFound,
            Self::OutOfBounds { .. }
            | Self::Collision { .. }
            | Self::PositionOccupied { .. }
            | Self::ConcurrencyConflict { .. }
            | Self::MatrixNotEmpty { .. }
            | Self::MatrixShrinkConflict { .. } => ErrorKind::Conflict,
            Self::EmptyCommands { .. }
            | Self::UnsupportedCommand { .. }
            | Self::ValidationError { .. } => ErrorKind::BadRequest,
            Self::DatabaseError { .. } => ErrorKind::Internal,
        }
    }
}

impl From<sqlx::Error> for CoreError {
    fn from(err: sqlx::Error) -> Self {
        CoreError::DatabaseError {
            operation: "query".to_string(),
            details: err.to_string(),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for CoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        CoreError::DatabaseError {
            operation: "migrate".to_string(),
            details: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let test_cases = vec![
            (CoreError::DroneNotFound { drone_id: 1 }, ErrorKind::NotFound),
            (CoreError::MatrixNotFound { matrix_id: 1 }, ErrorKind::NotFound),
            (
                CoreError::OutOfBounds {
                    drone_id: Some(1),
                    matrix_id: 1,
                    x: 5,
                    y: 11,
                    max_x: 10,
                    max_y: 10,
                },
                ErrorKind::Conflict,
            ),
            (
                CoreError::Collision {
                    drone_id: 1,
                    other_id: 2,
                    x: 0,
                    y: 0,
                },
                ErrorKind::Conflict,
            ),
            (
                CoreError::ConcurrencyConflict { drone_id: 3 },
                ErrorKind::Conflict,
            ),
            (
                CoreError::MatrixNotEmpty {
                    matrix_id: 1,
                    drone_ids: vec![1, 2],
                },
                ErrorKind::Conflict,
            ),
            (
                CoreError::EmptyCommands { drone_id: None },
                ErrorKind::BadRequest,
            ),
            (
                CoreError::UnsupportedCommand {
                    command: "JUMP".to_string(),
                },
                ErrorKind::BadRequest,
            ),
            (
                CoreError::validation("name", "must not be blank"),
                ErrorKind::BadRequest,
            ),
            (
                CoreError::DatabaseError {
                    operation: "insert".to_string(),
                    details: "connection refused".to_string(),
                },
                ErrorKind::Internal,
            ),
        ];

        for (error, expected) in test_cases {
            assert_eq!(error.kind(), expected, "wrong kind for {:?}", error);
            assert!(!error.to_string().is_empty());
        }
    }

    #[test]
    fn test_error_display() {
        let err = CoreError::DroneNotFound { drone_id: 42 };
        assert_eq!(err.to_string(), "Drone ID 42 not found");

        let err = CoreError::OutOfBounds {
            drone_id: Some(7),
            matrix_id: 3,
            x: 5,
            y: 11,
            max_x: 10,
            max_y: 10,
        };
        assert_eq!(
            err.to_string(),
            "Position (5,11) is outside matrix 3 (limits: 0-10, 0-10) for drone 7"
        );

        let err = CoreError::OutOfBounds {
            drone_id: None,
            matrix_id: 3,
            x: -1,
            y: 0,
            max_x: 10,
            max_y: 10,
        };
        assert_eq!(
            err.to_string(),
            "Position (-1,0) is outside matrix 3 (limits: 0-10, 0-10)"
        );

        let err = CoreError::MatrixNotEmpty {
            matrix_id: 9,
            drone_ids: vec![4, 5, 6],
        };
        assert_eq!(
            err.to_string(),
            "Cannot delete matrix 9. Active drones: 4, 5, 6"
        );

        let err = CoreError::EmptyCommands { drone_id: Some(2) };
        assert_eq!(err.to_string(), "Drone 2 has no commands to execute");

        let err = CoreError::EmptyCommands { drone_id: None };
        assert_eq!(err.to_string(), "Command list must not be empty");
    }

    #[test]
    fn test_error_code_method() {
        assert_eq!(
            CoreError::ConcurrencyConflict { drone_id: 1 }.error_code(),
            "CONCURRENCY_CONFLICT"
        );
        assert_eq!(
            CoreError::validation("x", "y").error_code(),
            "VALIDATION_ERROR"
        );
    }
}
