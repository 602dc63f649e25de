//! Message tags exchanged between vehicles and the orchestrator.
//!
//! A plain tagged enum, not a trait hierarchy — every recipient matches on
//! the tag it cares about and ignores the rest.

use fleet_core::{Coord, StationId, VehicleId};

use crate::status::VehicleStatus;

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// A vehicle reporting its state at the end of its own step.
    StatusUpdate {
        vehicle_id: VehicleId,
        coord: Coord,
        battery: f32,
        state: VehicleStatus,
        tick: u64,
    },

    /// The orchestrator informing a vehicle of its station assignment.
    Assignment {
        vehicle_id: VehicleId,
        station_id: StationId,
        station_coord: Coord,
        queue_pos: u32,
        priority: u32,
    },

    /// A vehicle disputing its current assignment and proposing an
    /// alternative (better queue position, or a different station).
    CounterProposal {
        vehicle_id: VehicleId,
        current_station: StationId,
        proposed: ProposalTarget,
        reason: String,
        urgency: f32,
    },

    /// The orchestrator's verdict on a `CounterProposal`.
    AssignmentDecision {
        vehicle_id: VehicleId,
        accepted: bool,
        new_assignment: Option<(StationId, u32)>,
    },
}

/// What a `CounterProposal` is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalTarget {
    /// A better queue position on the vehicle's current station.
    QueuePos(u32),
    /// A different station entirely.
    Station(StationId),
}

impl Message {
    /// The vehicle this message concerns (sender for `StatusUpdate` /
    /// `CounterProposal`, recipient for `Assignment` / `AssignmentDecision`).
    pub fn vehicle_id(&self) -> VehicleId {
        match *self {
            Message::StatusUpdate { vehicle_id, .. }
            | Message::Assignment { vehicle_id, .. }
            | Message::CounterProposal { vehicle_id, .. }
            | Message::AssignmentDecision { vehicle_id, .. } => vehicle_id,
        }
    }
}
