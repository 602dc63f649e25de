//! The assignment cost matrix.

use fleet_core::{Coord, StationId, VehicleId};

/// Weights for the three cost terms: distance, battery deficit, station load.
#[derive(Copy, Clone, Debug)]
pub struct CostWeights {
    pub w_d: f64,
    pub w_b: f64,
    pub w_l: f64,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            w_d: 1.0,
            w_b: 2.0,
            w_l: 0.5,
        }
    }
}

/// Cost assigned to a padding column representing "no real station" — large
/// enough to always lose to any real assignment, but finite so the solver's
/// potential arithmetic never produces `NaN`.
pub const VIRTUAL_COST: f64 = 1.0e9;

/// One vehicle's inputs to the cost matrix.
#[derive(Copy, Clone, Debug)]
pub struct VehicleCostInput {
    pub id: VehicleId,
    pub coord: Coord,
    pub battery: f32,
}

/// One (eligible) station's inputs to the cost matrix.
#[derive(Copy, Clone, Debug)]
pub struct StationCostInput {
    pub id: StationId,
    pub coord: Coord,
    pub load: usize,
}

/// Build the square (padded) cost matrix for the assignment problem.
///
/// `vehicles` and `stations` must already be sorted ascending by id — the
/// solver's tie-break (ascending vehicle_id, then ascending station_id) falls
/// out of processing rows/columns in that order, not from anything in this
/// function. The solver requires a square matrix, so whichever side is
/// smaller is padded at [`VIRTUAL_COST`]: extra virtual vehicle rows when
/// there are more eligible stations than pending vehicles, extra virtual
/// station columns when there are more vehicles than stations. Callers must
/// ignore any row `>= vehicles.len()` and any column `>= stations.len()` in
/// the returned assignment — those only exist to keep the matrix square.
pub fn build_cost_matrix(
    vehicles: &[VehicleCostInput],
    stations: &[StationCostInput],
    weights: CostWeights,
) -> Vec<Vec<f64>> {
    let size = vehicles.len().max(stations.len());
    let mut matrix = vec![vec![VIRTUAL_COST; size]; size];
    for (i, v) in vehicles.iter().enumerate() {
        for (j, s) in stations.iter().enumerate() {
            let dist = v.coord.manhattan(s.coord) as f64;
            let battery_term = (100.0 - v.battery as f64).max(0.0);
            matrix[i][j] = weights.w_d * dist + weights.w_b * battery_term + weights.w_l * s.load as f64;
        }
    }
    matrix
}
