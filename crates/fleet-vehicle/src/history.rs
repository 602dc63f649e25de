//! Behavioral tagging and the reciprocity history a vehicle keeps per peer.
//!
//! Histories live on the vehicle record, not in global state, per the
//! tagged-variant-over-inheritance design: a single decision function is
//! dispatched on `BehaviorKind`, and reciprocity is computed from these maps
//! rather than any trait hierarchy.

use rustc_hash::FxHashMap;

use fleet_core::VehicleId;

/// How a vehicle responds to a suboptimal assignment.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BehaviorKind {
    #[default]
    None,
    Cooperative,
    Competitive,
    TitForTat,
}

/// A single round's outcome recorded in a reciprocity history.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Cooperate,
    Defect,
}

/// What a vehicle decides to do about a suboptimal assignment.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Dispute,
}

impl Decision {
    #[inline]
    pub fn as_action(self) -> Action {
        match self {
            Decision::Accept => Action::Cooperate,
            Decision::Dispute => Action::Defect,
        }
    }
}

/// Reciprocity histories against every peer this vehicle has negotiated with.
#[derive(Default, Clone)]
pub struct History {
    /// What each peer has done to this vehicle, most recent last.
    peer: FxHashMap<VehicleId, Vec<Action>>,
    /// What this vehicle has done to each peer, most recent last.
    own: FxHashMap<VehicleId, Vec<Action>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_peer(&mut self, peer: VehicleId, action: Action) {
        self.peer.entry(peer).or_default().push(action);
    }

    pub fn record_own(&mut self, peer: VehicleId, action: Action) {
        self.own.entry(peer).or_default().push(action);
    }

    /// The peer's most recent recorded action, or `None` if no prior
    /// interaction is on record.
    pub fn last_peer_action(&self, peer: VehicleId) -> Option<Action> {
        self.peer.get(&peer).and_then(|v| v.last()).copied()
    }

    pub fn last_own_action(&self, peer: VehicleId) -> Option<Action> {
        self.own.get(&peer).and_then(|v| v.last()).copied()
    }
}
