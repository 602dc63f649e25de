//! The static grid environment and its builder.
//!
//! # Map format
//!
//! Each row of the input is a string of equal length; characters are:
//!
//! | Char  | Meaning                                          |
//! |-------|---------------------------------------------------|
//! | `.`   | `Empty`                                            |
//! | `#`   | `Obstacle`                                         |
//! | `0`-`9` | `Station(StationId(n))` — capacity supplied separately |
//! | `E`   | `Exit`                                             |
//!
//! Row 0 is `y = 0`; within a row, character 0 is `x = 0`.

use fleet_core::{Coord, StationId};

use crate::cell::Cell;
use crate::error::{GridError, GridResult};

/// Neighbor probe order fixed by the tie-break rule: N, E, S, W.
pub const NEIGHBOR_ORDER: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// The static, immutable environment: cells, obstacles, stations, and the exit.
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
    /// Station coordinates, indexed by `StationId`.
    station_coords: Vec<Coord>,
    exit: Coord,
}

impl Grid {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn exit(&self) -> Coord {
        self.exit
    }

    pub fn station_count(&self) -> usize {
        self.station_coords.len()
    }

    pub fn station_coord(&self, id: StationId) -> Coord {
        self.station_coords[id.index()]
    }

    pub fn stations(&self) -> impl Iterator<Item = (StationId, Coord)> + '_ {
        self.station_coords
            .iter()
            .enumerate()
            .map(|(i, &c)| (StationId(i as u16), c))
    }

    #[inline]
    pub fn in_bounds(&self, c: Coord) -> bool {
        c.x < self.width && c.y < self.height
    }

    #[inline]
    fn index(&self, c: Coord) -> usize {
        (c.y * self.width + c.x) as usize
    }

    #[inline]
    pub fn cell(&self, c: Coord) -> Cell {
        self.cells[self.index(c)]
    }

    #[inline]
    pub fn is_walkable(&self, c: Coord) -> bool {
        self.in_bounds(c) && self.cell(c).is_walkable()
    }

    /// Neighbors in fixed N, E, S, W order, filtered to in-bounds and walkable.
    pub fn neighbors4(&self, c: Coord) -> impl Iterator<Item = Coord> + '_ {
        NEIGHBOR_ORDER.iter().filter_map(move |&(dx, dy)| {
            let x = c.x as i64 + dx as i64;
            let y = c.y as i64 + dy as i64;
            if x < 0 || y < 0 {
                return None;
            }
            let cand = Coord::new(x as u32, y as u32);
            self.is_walkable(cand).then_some(cand)
        })
    }
}

/// Builds a [`Grid`] from an ASCII map plus an exit coordinate.
pub struct GridBuilder {
    rows: Vec<String>,
    exit: Coord,
}

impl GridBuilder {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            exit: Coord::new(0, 0),
        }
    }

    /// Parse `map` (one string per row, top row first) and an exit coordinate
    /// into a [`Grid`]. Station ids are assigned by the digit character found
    /// in the map (`'0'..='9'`) and must be contiguous from `0`.
    pub fn from_ascii_map(map: &[&str], exit: Coord) -> GridResult<Grid> {
        if map.is_empty() {
            return Err(GridError::EmptyMap);
        }
        let width = map[0].chars().count() as u32;
        let height = map.len() as u32;

        let mut cells = Vec::with_capacity((width * height) as usize);
        let mut station_coords: Vec<Option<Coord>> = Vec::new();

        for (y, row) in map.iter().enumerate() {
            let found = row.chars().count();
            if found as u32 != width {
                return Err(GridError::RaggedRow {
                    row: y,
                    found,
                    expected: width as usize,
                });
            }
            for (x, ch) in row.chars().enumerate() {
                let cell = match ch {
                    '.' => Cell::Empty,
                    '#' => Cell::Obstacle,
                    'E' => Cell::Exit,
                    '0'..='9' => {
                        let id = ch.to_digit(10).unwrap() as u16;
                        if id as usize >= station_coords.len() {
                            station_coords.resize(id as usize + 1, None);
                        }
                        if station_coords[id as usize].is_some() {
                            return Err(GridError::DuplicateStation(id));
                        }
                        let coord = Coord::new(x as u32, y as u32);
                        station_coords[id as usize] = Some(coord);
                        Cell::Station(StationId(id))
                    }
                    other => {
                        return Err(GridError::InvalidChar {
                            ch: other,
                            x: x as u32,
                            y: y as u32,
                        })
                    }
                };
                cells.push(cell);
            }
        }

        let station_coords: Vec<Coord> = station_coords
            .into_iter()
            .enumerate()
            .map(|(i, c)| c.ok_or(GridError::MissingStation(i as u16)))
            .collect::<GridResult<_>>()?;

        let grid = Grid {
            width,
            height,
            cells,
            station_coords,
            exit,
        };

        if !grid.in_bounds(exit) {
            return Err(GridError::ExitOutOfBounds(exit));
        }
        if !grid.cell(exit).is_walkable() {
            return Err(GridError::ExitNotWalkable(exit));
        }

        Ok(grid)
    }
}

impl Default for GridBuilder {
    fn default() -> Self {
        Self::new()
    }
}
