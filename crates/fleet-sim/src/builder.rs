//! A fluent alternative to [`crate::scenario::build_sim`] for constructing a
//! [`Sim`] directly from in-memory pieces (tests, embedders) rather than a
//! JSON document.

use fleet_core::Coord;
use fleet_grid::Grid;
use fleet_vehicle::BehaviorKind;

use crate::error::{SimError, SimResult};
use crate::sim::{Sim, SimParams};

#[derive(Default)]
pub struct SimBuilder {
    grid: Option<Grid>,
    station_capacities: Option<Vec<u32>>,
    vehicles: Vec<(Coord, f32, BehaviorKind)>,
    params: Option<SimParams>,
    seed: u64,
}

impl SimBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grid(mut self, grid: Grid) -> Self {
        self.grid = Some(grid);
        self
    }

    /// Capacity of station `n` at index `n`. If omitted, every station
    /// defaults to capacity 1.
    pub fn station_capacities(mut self, capacities: Vec<u32>) -> Self {
        self.station_capacities = Some(capacities);
        self
    }

    pub fn vehicle(mut self, coord: Coord, initial_battery: f32, behavior: BehaviorKind) -> Self {
        self.vehicles.push((coord, initial_battery, behavior));
        self
    }

    pub fn params(mut self, params: SimParams) -> Self {
        self.params = Some(params);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(self) -> SimResult<Sim> {
        let grid = self
            .grid
            .ok_or_else(|| SimError::Config("SimBuilder requires a grid".to_string()))?;
        let station_capacities = self
            .station_capacities
            .unwrap_or_else(|| vec![1; grid.station_count()]);
        let params = self
            .params
            .ok_or_else(|| SimError::Config("SimBuilder requires params".to_string()))?;
        Sim::new(grid, station_capacities, self.vehicles, params, self.seed)
    }
}
