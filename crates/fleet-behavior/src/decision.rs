//! Tit-for-tat decision dispatch.
//!
//! A single decision function dispatched on the `BehaviorKind` tag, rather
//! than a trait with one implementation per behavior — reciprocity is
//! computed from the vehicle's own history maps, not any model state.

use fleet_vehicle::{Action, BehaviorKind, Decision, Vehicle};

/// Decide how `vehicle` responds to a suboptimal assignment (`queue_pos >
/// 0`), given the vehicle's behavior tag and its last recorded action from
/// the negotiation opponent (`None` if no prior interaction is on record).
pub fn decide(vehicle: &Vehicle, kind: BehaviorKind, last_peer_action: Option<Action>) -> Decision {
    let _ = vehicle; // reserved for behaviors that need more than the tag + history
    match kind {
        BehaviorKind::None | BehaviorKind::Cooperative => Decision::Accept,
        BehaviorKind::Competitive => Decision::Dispute,
        BehaviorKind::TitForTat => match last_peer_action {
            None | Some(Action::Cooperate) => Decision::Accept,
            Some(Action::Defect) => Decision::Dispute,
        },
    }
}
