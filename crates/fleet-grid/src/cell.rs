//! Grid cell kinds.

use fleet_core::StationId;

/// The immutable content of one grid cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Cell {
    Empty,
    Obstacle,
    Station(StationId),
    Exit,
}

impl Cell {
    /// Whether a vehicle may occupy this cell (empty, station, or exit).
    #[inline]
    pub fn is_walkable(self) -> bool {
        !matches!(self, Cell::Obstacle)
    }
}
