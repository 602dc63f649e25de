//! Spatio-temporal reservation table.
//!
//! Resolves head-on and swap conflicts that the same-tick id-priority rule
//! alone cannot detect, and lets a slower-id vehicle plan its path around the
//! already-committed path of a faster-id vehicle (spec's collision-avoidance
//! design rationale).

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use fleet_core::{Coord, Tick, VehicleId};

use crate::error::{GridError, GridResult};

/// Per-vehicle ordered record of that vehicle's own reservations, used for
/// `clear_vehicle` without scanning the whole table.
type VehicleReservations = Vec<(Tick, Coord)>;

/// `(tick, coord) → vehicle_id`, indexed sparsely by tick since only a
/// handful of ticks are ever reserved ahead of the current one.
#[derive(Default)]
pub struct ReservationTable {
    by_tick: BTreeMap<Tick, FxHashMap<Coord, VehicleId>>,
    by_vehicle: FxHashMap<VehicleId, VehicleReservations>,
}

impl ReservationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `coord` at `tick` for `vehicle`.
    ///
    /// Returns `Err(GridError::ReservationConflict)` if another vehicle
    /// already holds that cell at that tick; the caller makes no change in
    /// that case.
    pub fn reserve(&mut self, vehicle: VehicleId, tick: Tick, coord: Coord) -> GridResult<()> {
        let slot = self.by_tick.entry(tick).or_default();
        if let Some(&holder) = slot.get(&coord) {
            if holder != vehicle {
                return Err(GridError::ReservationConflict {
                    tick: tick.0,
                    coord,
                    holder,
                });
            }
            return Ok(());
        }
        slot.insert(coord, vehicle);
        self.by_vehicle.entry(vehicle).or_default().push((tick, coord));
        Ok(())
    }

    /// Reserve an entire path starting at `first_tick`: `path[0]` at
    /// `first_tick`, `path[1]` at `first_tick + 1`, etc.
    ///
    /// Rolls back every reservation made by this call on the first conflict,
    /// so the table is left unchanged on failure.
    pub fn reserve_path(
        &mut self,
        vehicle: VehicleId,
        first_tick: Tick,
        path: &[Coord],
    ) -> GridResult<()> {
        let mut made = Vec::with_capacity(path.len());
        for (i, &coord) in path.iter().enumerate() {
            let tick = first_tick.offset(i as u64);
            match self.reserve(vehicle, tick, coord) {
                Ok(()) => made.push((tick, coord)),
                Err(e) => {
                    for (t, c) in made {
                        self.unreserve(vehicle, t, c);
                    }
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    fn unreserve(&mut self, vehicle: VehicleId, tick: Tick, coord: Coord) {
        if let Some(slot) = self.by_tick.get_mut(&tick) {
            if slot.get(&coord) == Some(&vehicle) {
                slot.remove(&coord);
                if slot.is_empty() {
                    self.by_tick.remove(&tick);
                }
            }
        }
        if let Some(list) = self.by_vehicle.get_mut(&vehicle) {
            list.retain(|&(t, c)| !(t == tick && c == coord));
        }
    }

    /// The vehicle (if any) holding `coord` at `tick`.
    pub fn is_reserved(&self, tick: Tick, coord: Coord) -> Option<VehicleId> {
        self.by_tick.get(&tick).and_then(|slot| slot.get(&coord)).copied()
    }

    /// Remove all reservations made by `vehicle` (used on replan).
    pub fn clear_vehicle(&mut self, vehicle: VehicleId) {
        let Some(entries) = self.by_vehicle.remove(&vehicle) else {
            return;
        };
        for (tick, coord) in entries {
            if let Some(slot) = self.by_tick.get_mut(&tick) {
                slot.remove(&coord);
                if slot.is_empty() {
                    self.by_tick.remove(&tick);
                }
            }
        }
    }

    /// Drop every entry with `tick < current_tick`.
    pub fn gc(&mut self, current_tick: Tick) {
        self.by_tick = self.by_tick.split_off(&current_tick);
        for list in self.by_vehicle.values_mut() {
            list.retain(|&(t, _)| t >= current_tick);
        }
    }

    #[cfg(test)]
    pub(crate) fn tick_count(&self) -> usize {
        self.by_tick.len()
    }
}
