// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Movement engine.
//!
//! A drone understands three commands: turn left, turn right and move one
//! cell forward. Turning always succeeds. Moving is validated against the
//! matrix bounds (inclusive upper bound) and against every other drone
//! stored on the same matrix before the new position is written into the
//! in-memory drone.
//!
//! ```text
//!            N (y+1)
//!               ▲
//!   O (x-1) ◄───┼───► E (x+1)
//!               ▼
//!            S (y-1)
//!
//!   turn_right: N → E → S → O → N
//!   turn_left:  N → O → S → E → N
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};
use tracing::debug;

use crate::error::{CoreError, Result};
use crate::persistence::{Drone, Matrix, Persistence};

/// Compass heading of a drone. `O` is west.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    /// North, towards larger `y`.
    N,
    /// South, towards smaller `y`.
    S,
    /// East, towards larger `x`.
    E,
    /// West, towards smaller `x`.
    O,
}

impl Orientation {
    /// All orientations in clockwise order, starting at north.
    pub const CLOCKWISE: [Orientation; 4] = [Self::N, Self::E, Self::S, Self::O];

    /// Rotate 90° counter-clockwise.
    pub fn turn_left(self) -> Self {
        match self {
            Self::N => Self::O,
            Self::O => Self::S,
            Self::S => Self::E,
            Self::E => Self::N,
        }
    }

    /// Rotate 90° clockwise.
    pub fn turn_right(self) -> Self {
        match self {
            Self::N => Self::E,
            Self::E => Self::S,
            Self::S => Self::O,
            Self::O => Self::N,
        }
    }

    /// Unit step `(dx, dy)` taken by a forward move.
    pub fn step(self) -> (i32, i32) {
        match self {
            Self::N => (0, 1),
            Self::S => (0, -1),
            Self::E => (1, 0),
            Self::O => (-1, 0),
        }
    }

    /// Single-letter storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::N => "N",
            Self::S => "S",
            Self::E => "E",
            Self::O => "O",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Orientation {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "N" => Ok(Self::N),
            "S" => Ok(Self::S),
            "E" => Ok(Self::E),
            "O" => Ok(Self::O),
            other => Err(CoreError::validation(
                "orientation",
                format!("'{other}' is not valid. Accepted values are: N, S, E, O"),
            )),
        }
    }
}

/// A single flight command.
///
/// Unknown strings and JSON `null` deserialize into [`MovementCommand::Unsupported`]
/// so that the engine, not the decoder, rejects them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "Option<String>")]
pub enum MovementCommand {
    /// Rotate counter-clockwise.
    TurnLeft,
    /// Rotate clockwise.
    TurnRight,
    /// Step one cell in the current orientation.
    MoveForward,
    /// Anything else, keeping the raw value (`None` for a missing command).
    Unsupported(Option<String>),
}

impl MovementCommand {
    /// Wire representation, `None` for a missing command.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::TurnLeft => Some("TURN_LEFT"),
            Self::TurnRight => Some("TURN_RIGHT"),
            Self::MoveForward => Some("MOVE_FORWARD"),
            Self::Unsupported(raw) => raw.as_deref(),
        }
    }
}

impl From<Option<String>> for MovementCommand {
    fn from(raw: Option<String>) -> Self {
        match raw.as_deref() {
            Some("TURN_LEFT") => Self::TurnLeft,
            Some("TURN_RIGHT") => Self::TurnRight,
            Some("MOVE_FORWARD") => Self::MoveForward,
            _ => Self::Unsupported(raw),
        }
    }
}

impl Serialize for MovementCommand {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.as_str() {
            Some(value) => serializer.serialize_str(value),
            None => serializer.serialize_none(),
        }
    }
}

impl fmt::Display for MovementCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str().unwrap_or("null"))
    }
}

/// Compute the cell a forward move would land on, checked against the matrix bounds.
pub fn next_position(drone: &Drone, matrix: &Matrix) -> Result<(i32, i32)> {
    let (dx, dy) = drone.orientation.step();
    let x = i64::from(drone.x) + i64::from(dx);
    let y = i64::from(drone.y) + i64::from(dy);

    if !matrix.contains(x, y) {
        return Err(CoreError::OutOfBounds {
            drone_id: Some(drone.id),
            matrix_id: matrix.id,
            x,
            y,
            max_x: matrix.max_x,
            max_y: matrix.max_y,
        });
    }

    // contains() guarantees 0 <= x <= max_x, so both fit in i32
    Ok((x as i32, y as i32))
}

/// Fail if a drone other than `drone_id` is stored at `(x, y)` on `matrix_id`.
pub async fn ensure_cell_free(
    persistence: &dyn Persistence,
    drone_id: i64,
    matrix_id: i64,
    x: i32,
    y: i32,
) -> Result<()> {
    let occupants = persistence.find_drones_at(x, y, matrix_id).await?;
    match occupants.iter().find(|other| other.id != drone_id) {
        Some(other) => Err(CoreError::Collision {
            drone_id,
            other_id: other.id,
            x,
            y,
        }),
        None => Ok(()),
    }
}

/// Apply one command to `drone` in place.
///
/// On failure the drone is left exactly as it was. Nothing is persisted here;
/// the caller decides when to save.
pub async fn apply_command(
    persistence: &dyn Persistence,
    matrix: &Matrix,
    drone: &mut Drone,
    command: &MovementCommand,
) -> Result<()> {
    match command {
        MovementCommand::TurnLeft => {
            drone.orientation = drone.orientation.turn_left();
        }
        MovementCommand::TurnRight => {
            drone.orientation = drone.orientation.turn_right();
        }
        MovementCommand::MoveForward => {
            let (x, y) = next_position(drone, matrix)?;
            ensure_cell_free(persistence, drone.id, matrix.id, x, y).await?;
            drone.x = x;
            drone.y = y;
        }
        MovementCommand::Unsupported(_) => {
            return Err(CoreError::UnsupportedCommand {
                command: command.to_string(),
            });
        }
    }

    debug!(
        drone_id = drone.id,
        %command,
        x = drone.x,
        y = drone.y,
        orientation = %drone.orientation,
        "Command applied"
    );
    Ok(())
}
