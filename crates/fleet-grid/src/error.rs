//! Grid/planner/reservation error type.

use fleet_core::{Coord, VehicleId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GridError {
    #[error("grid map is empty")]
    EmptyMap,

    #[error("row {row} has width {found}, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("unrecognized map character {ch:?} at ({x}, {y})")]
    InvalidChar { ch: char, x: u32, y: u32 },

    #[error("station id {0} appears more than once in the map")]
    DuplicateStation(u16),

    #[error("station id {0} has a declared capacity but no cell in the map")]
    MissingStation(u16),

    #[error("exit coordinate {0} is out of bounds")]
    ExitOutOfBounds(Coord),

    #[error("exit cell {0} is not walkable")]
    ExitNotWalkable(Coord),

    #[error("no path exists from {from} to {goal} under current blocks")]
    NoPath { from: Coord, goal: Coord },

    #[error("reservation conflict at tick {tick} cell {coord}: held by {holder}")]
    ReservationConflict {
        tick: u64,
        coord: Coord,
        holder: VehicleId,
    },
}

pub type GridResult<T> = Result<T, GridError>;
