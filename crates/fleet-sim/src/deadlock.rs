//! The deadlock escape hatch (spec §7 `DeadlockDetected`).
//!
//! "No vehicle has moved and no orchestrator state has changed for
//! `deadlock_ticks` consecutive ticks" is approximated by the stepping
//! model as a counter it resets whenever it observes a coordinate change,
//! a vehicle state transition, or a station mutation; this module only
//! owns the recovery action once that counter trips.

use fleet_core::{SimRng, Tick};
use fleet_grid::{Grid, ReservationTable};
use fleet_vehicle::Vehicle;

/// If `no_progress_ticks` has reached `deadlock_ticks`, force every
/// non-terminal vehicle to replan toward its current goal, in a seeded
/// random order (spec: "randomized-but-seeded tiebreaker"), and report that
/// recovery ran.
pub fn maybe_recover(
    no_progress_ticks: u32,
    deadlock_ticks: u32,
    tick: Tick,
    vehicles: &mut [Vehicle],
    grid: &Grid,
    reservations: &mut ReservationTable,
    rng: &mut SimRng,
) -> bool {
    if no_progress_ticks < deadlock_ticks {
        return false;
    }
    let mut order: Vec<usize> = (0..vehicles.len()).filter(|&i| !vehicles[i].is_terminal()).collect();
    rng.shuffle(&mut order);
    for idx in order {
        vehicles[idx].force_replan(tick, grid, reservations);
    }
    true
}
