//! Charging station state.
//!
//! Mutated exclusively by the orchestrator's step slot — vehicles hold only
//! a `station_id`, never a reference to a `ChargingStation` (ownership note
//! in the data model: occupants/queue are mutated only here, never by
//! vehicles).

use fleet_core::{Coord, StationId, VehicleId};

/// A charging station: a fixed coordinate, a capacity, and two disjoint
/// ordered vehicle lists.
///
/// `occupants` holds vehicles physically present and charging.  `queue`
/// holds every vehicle assigned to this station that hasn't physically
/// arrived yet — including a vehicle assigned `queue_pos == 0`, which sits
/// at `queue[0]` until its own `Vehicle::step` reports `ArrivedAtStation`
/// and [`ChargingStation::arrive`] moves it across. This is what lets two
/// vehicles assigned to the same empty station in the same orchestrator
/// pass receive distinct queue positions instead of racing for `queue_pos
/// == 0` twice (see `DESIGN.md`).
#[derive(Debug, Clone)]
pub struct ChargingStation {
    pub id: StationId,
    pub coord: Coord,
    pub capacity: u32,
    pub occupants: Vec<VehicleId>,
    pub queue: Vec<VehicleId>,
}

impl ChargingStation {
    pub fn new(id: StationId, coord: Coord, capacity: u32) -> Self {
        debug_assert!(capacity >= 1, "station capacity must be >= 1");
        Self {
            id,
            coord,
            capacity,
            occupants: Vec::new(),
            queue: Vec::new(),
        }
    }

    /// `|occupants| + |queue|` — the cost-matrix load term and the
    /// queue-cap exclusion test.
    #[inline]
    pub fn load(&self) -> usize {
        self.occupants.len() + self.queue.len()
    }

    #[inline]
    pub fn has_free_slot(&self) -> bool {
        (self.occupants.len() as u32) < self.capacity
    }

    /// The `queue_pos` a vehicle assigned to this station right now would
    /// receive: `|occupants| + position_in_pending_queue`.
    #[inline]
    pub fn next_queue_pos(&self) -> u32 {
        self.load() as u32
    }

    /// Record a newly assigned vehicle. Returns its `queue_pos`.
    pub fn admit(&mut self, vehicle: VehicleId) -> u32 {
        let pos = self.next_queue_pos();
        self.queue.push(vehicle);
        pos
    }

    /// The vehicle has physically reached the station cell with
    /// `queue_pos == 0`: move it from the pending queue into `occupants`.
    pub fn arrive(&mut self, vehicle: VehicleId) {
        self.queue.retain(|&v| v != vehicle);
        self.occupants.push(vehicle);
    }

    /// The vehicle finished charging and is leaving.
    pub fn depart(&mut self, vehicle: VehicleId) {
        self.occupants.retain(|&v| v != vehicle);
    }

    /// The head of the pending queue, if any — the next vehicle to promote
    /// once a slot frees.
    pub fn queue_head(&self) -> Option<VehicleId> {
        self.queue.first().copied()
    }

    /// Every still-queued vehicle's current `queue_pos`, for re-emitting
    /// `Assignment` updates after a promotion.
    pub fn renumbered_queue(&self) -> impl Iterator<Item = (VehicleId, u32)> + '_ {
        let base = self.occupants.len() as u32;
        self.queue.iter().enumerate().map(move |(i, &v)| (v, base + i as u32))
    }

    /// Swap the vehicles at `queue_pos` positions `a` and `b` within the
    /// pending queue (used by counter-proposal acceptance).
    pub fn swap_queue_positions(&mut self, a: usize, b: usize) {
        self.queue.swap(a, b);
    }
}
