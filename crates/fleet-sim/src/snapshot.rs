//! Per-tick visualization snapshot.
//!
//! A plain data rendering of the world state after a tick completes — no
//! behavior, just the fields a UI or CSV writer needs.

use fleet_core::{Coord, StationId, Tick, VehicleId};
use fleet_messages::VehicleStatus;

use crate::metrics::Metrics;

#[derive(Clone, Debug, serde::Serialize)]
pub struct VehicleSnapshot {
    pub id: VehicleId,
    pub coord: Coord,
    pub battery: f32,
    pub state: VehicleStatus,
    /// The remainder of the planned path, including the current cell.
    pub path: Vec<Coord>,
    pub queue_pos: Option<u32>,
    pub station_id: Option<StationId>,
}

#[derive(Clone, Debug, serde::Serialize)]
pub struct StationSnapshot {
    pub id: StationId,
    pub coord: Coord,
    pub capacity: u32,
    pub occupants: Vec<VehicleId>,
    pub queue: Vec<VehicleId>,
}

#[derive(Clone, Debug, serde::Serialize)]
pub struct Snapshot {
    pub tick: Tick,
    pub vehicles: Vec<VehicleSnapshot>,
    pub stations: Vec<StationSnapshot>,
    /// Log lines emitted since the previous snapshot (deadlock warnings,
    /// stranded-vehicle notices, and the like).
    pub log: Vec<String>,
    pub metrics: Metrics,
}
