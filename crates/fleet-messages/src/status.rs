//! Vehicle lifecycle state.
//!
//! Lives in this crate (rather than `fleet-vehicle`) because [`Message::StatusUpdate`][crate::Message::StatusUpdate]
//! carries it and the orchestrator consumes it without depending on the
//! vehicle crate.

use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VehicleStatus {
    Idle,
    Waiting,
    Moving,
    Charging,
    Exiting,
    Completed,
}

impl VehicleStatus {
    /// `true` once a vehicle will never transition again.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, VehicleStatus::Completed)
    }
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VehicleStatus::Idle => "idle",
            VehicleStatus::Waiting => "waiting",
            VehicleStatus::Moving => "moving",
            VehicleStatus::Charging => "charging",
            VehicleStatus::Exiting => "exiting",
            VehicleStatus::Completed => "completed",
        };
        write!(f, "{s}")
    }
}
