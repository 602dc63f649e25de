//! Unit tests for assignment, station bookkeeping, and negotiation.

use fleet_core::{Coord, StationId, Tick, VehicleId};
use fleet_messages::{Endpoint, Message, MessageBus, ProposalTarget, VehicleStatus};

use crate::cost::{build_cost_matrix, CostWeights, StationCostInput, VehicleCostInput};
use crate::hungarian;
use crate::negotiation::{Orchestrator, OrchestratorParams};
use crate::station::ChargingStation;

// ── ChargingStation ─────────────────────────────────────────────────────────

#[cfg(test)]
mod station {
    use super::*;

    #[test]
    fn admit_assigns_ascending_queue_positions() {
        let mut s = ChargingStation::new(StationId(0), Coord::new(5, 5), 1);
        assert_eq!(s.admit(VehicleId(0)), 0);
        assert_eq!(s.admit(VehicleId(1)), 1);
        assert_eq!(s.admit(VehicleId(2)), 2);
    }

    #[test]
    fn arrive_moves_queue_head_into_occupants() {
        let mut s = ChargingStation::new(StationId(0), Coord::new(0, 0), 1);
        s.admit(VehicleId(7));
        s.arrive(VehicleId(7));
        assert_eq!(s.occupants, vec![VehicleId(7)]);
        assert!(s.queue.is_empty());
    }

    #[test]
    fn depart_frees_the_occupant_slot() {
        let mut s = ChargingStation::new(StationId(0), Coord::new(0, 0), 1);
        s.admit(VehicleId(1));
        s.arrive(VehicleId(1));
        s.depart(VehicleId(1));
        assert!(s.occupants.is_empty());
        assert!(s.has_free_slot());
    }

    #[test]
    fn renumbered_queue_accounts_for_current_occupants() {
        let mut s = ChargingStation::new(StationId(0), Coord::new(0, 0), 2);
        s.occupants.push(VehicleId(0));
        s.admit(VehicleId(1));
        s.admit(VehicleId(2));
        let renumbered: Vec<_> = s.renumbered_queue().collect();
        assert_eq!(renumbered, vec![(VehicleId(1), 1), (VehicleId(2), 2)]);
    }
}

// ── Cost matrix ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod cost {
    use super::*;

    #[test]
    fn closer_station_costs_less() {
        let vehicles = vec![VehicleCostInput {
            id: VehicleId(0),
            coord: Coord::new(0, 0),
            battery: 50.0,
        }];
        let stations = vec![
            StationCostInput {
                id: StationId(0),
                coord: Coord::new(1, 0),
                load: 0,
            },
            StationCostInput {
                id: StationId(1),
                coord: Coord::new(10, 0),
                load: 0,
            },
        ];
        let matrix = build_cost_matrix(&vehicles, &stations, CostWeights::default());
        assert!(matrix[0][0] < matrix[0][1]);
    }

    #[test]
    fn excess_vehicles_get_virtual_padding_columns() {
        let vehicles = vec![
            VehicleCostInput {
                id: VehicleId(0),
                coord: Coord::new(0, 0),
                battery: 50.0,
            },
            VehicleCostInput {
                id: VehicleId(1),
                coord: Coord::new(0, 0),
                battery: 50.0,
            },
        ];
        let stations = vec![StationCostInput {
            id: StationId(0),
            coord: Coord::new(0, 0),
            load: 0,
        }];
        let matrix = build_cost_matrix(&vehicles, &stations, CostWeights::default());
        assert_eq!(matrix[0].len(), 2);
        assert_eq!(matrix[1][1], crate::cost::VIRTUAL_COST);
    }

    #[test]
    fn excess_stations_get_virtual_padding_rows() {
        let vehicles = vec![VehicleCostInput {
            id: VehicleId(0),
            coord: Coord::new(0, 0),
            battery: 50.0,
        }];
        let stations = vec![
            StationCostInput {
                id: StationId(0),
                coord: Coord::new(0, 0),
                load: 0,
            },
            StationCostInput {
                id: StationId(1),
                coord: Coord::new(10, 0),
                load: 0,
            },
        ];
        let matrix = build_cost_matrix(&vehicles, &stations, CostWeights::default());
        // Square at 2x2: one real row, one virtual row padding it out.
        assert_eq!(matrix.len(), 2);
        assert_eq!(matrix[1][0], crate::cost::VIRTUAL_COST);
        assert_eq!(matrix[1][1], crate::cost::VIRTUAL_COST);
        assert_eq!(hungarian::solve(&matrix).len(), 2);
    }
}

// ── Hungarian solver ─────────────────────────────────────────────────────────

#[cfg(test)]
mod hungarian_solver {
    use super::*;

    #[test]
    fn empty_matrix_returns_empty_assignment() {
        assert!(hungarian::solve(&[]).is_empty());
    }

    #[test]
    fn picks_the_obviously_cheaper_diagonal() {
        let cost = vec![vec![1.0, 10.0], vec![10.0, 1.0]];
        assert_eq!(hungarian::solve(&cost), vec![0, 1]);
    }

    #[test]
    fn prefers_the_off_diagonal_when_it_is_cheaper() {
        let cost = vec![vec![10.0, 1.0], vec![1.0, 10.0]];
        assert_eq!(hungarian::solve(&cost), vec![1, 0]);
    }

    #[test]
    fn ties_break_toward_the_lowest_index_row() {
        // Row 0 and row 1 are identical; the solver should still produce a
        // valid bijection. With ascending-id rows/columns this is how the
        // caller gets the spec's "ascending (vehicle_id, station_id)" tie-break.
        let cost = vec![vec![1.0, 1.0], vec![1.0, 1.0]];
        let assignment = hungarian::solve(&cost);
        let mut sorted = assignment.clone();
        sorted.sort();
        assert_eq!(sorted, vec![0, 1]);
    }

    #[test]
    fn total_cost_sums_the_chosen_cells() {
        let cost = vec![vec![1.0, 10.0], vec![10.0, 1.0]];
        let assignment = hungarian::solve(&cost);
        assert_eq!(hungarian::total_cost(&cost, &assignment), 2.0);
    }
}

// ── Orchestrator: assignment & promotion ────────────────────────────────────

#[cfg(test)]
mod orchestrator {
    use super::*;

    fn one_station(capacity: u32) -> Orchestrator {
        Orchestrator::new(vec![ChargingStation::new(StationId(0), Coord::new(9, 9), capacity)])
    }

    fn two_stations(capacity: u32) -> Orchestrator {
        Orchestrator::new(vec![
            ChargingStation::new(StationId(0), Coord::new(9, 9), capacity),
            ChargingStation::new(StationId(1), Coord::new(0, 9), capacity),
        ])
    }

    fn status(vehicle_id: VehicleId, coord: Coord, battery: f32, state: VehicleStatus, tick: u64) -> Message {
        Message::StatusUpdate {
            vehicle_id,
            coord,
            battery,
            state,
            tick,
        }
    }

    #[test]
    fn waiting_vehicle_gets_assigned_to_the_only_station() {
        let mut orch = one_station(1);
        let mut bus = MessageBus::new();
        bus.send(
            Endpoint::Vehicle(VehicleId(0)),
            Endpoint::Orchestrator,
            status(VehicleId(0), Coord::new(0, 0), 10.0, VehicleStatus::Waiting, 0),
        );

        orch.step(Tick(0), &mut bus, &OrchestratorParams::default());

        let outbound = bus.drain(Endpoint::Vehicle(VehicleId(0)));
        assert_eq!(outbound.len(), 1);
        match outbound[0] {
            Message::Assignment {
                station_id,
                queue_pos,
                ..
            } => {
                assert_eq!(station_id, StationId(0));
                assert_eq!(queue_pos, 0);
            }
            ref other => panic!("expected Assignment, got {other:?}"),
        }
    }

    #[test]
    fn only_one_vehicle_is_newly_assigned_to_a_station_per_step() {
        // Two Waiting vehicles competing for one station: the rectangular
        // assignment pads to a virtual column, so exactly one gets a real
        // Assignment this pass. The other keeps retrying — its record still
        // has no `assigned_station` — until a later step finds it a slot.
        let mut orch = one_station(1);
        let mut bus = MessageBus::new();
        bus.send(
            Endpoint::Vehicle(VehicleId(0)),
            Endpoint::Orchestrator,
            status(VehicleId(0), Coord::new(0, 0), 10.0, VehicleStatus::Waiting, 0),
        );
        bus.send(
            Endpoint::Vehicle(VehicleId(1)),
            Endpoint::Orchestrator,
            status(VehicleId(1), Coord::new(0, 1), 10.0, VehicleStatus::Waiting, 0),
        );

        orch.step(Tick(0), &mut bus, &OrchestratorParams::default());

        let assigned_first: Vec<VehicleId> = [VehicleId(0), VehicleId(1)]
            .iter()
            .copied()
            .filter(|&v| !bus.drain(Endpoint::Vehicle(v)).is_empty())
            .collect();
        assert_eq!(assigned_first.len(), 1);

        // Re-assert the loser's status (still Waiting, still unassigned) and
        // step again: it should now get the real slot.
        let loser = if assigned_first[0] == VehicleId(0) {
            VehicleId(1)
        } else {
            VehicleId(0)
        };
        bus.send(
            Endpoint::Vehicle(loser),
            Endpoint::Orchestrator,
            status(loser, Coord::new(0, 1), 10.0, VehicleStatus::Waiting, 1),
        );
        orch.step(Tick(1), &mut bus, &OrchestratorParams::default());
        let msgs = bus.drain(Endpoint::Vehicle(loser));
        assert_eq!(msgs.len(), 1);
        match msgs[0] {
            Message::Assignment { queue_pos, .. } => assert_eq!(queue_pos, 1),
            ref other => panic!("expected Assignment, got {other:?}"),
        }
    }

    #[test]
    fn fewer_waiting_vehicles_than_eligible_stations_still_assigns() {
        // One Waiting vehicle, two eligible stations: the cost matrix has
        // more columns than rows, so it must be padded with a virtual
        // vehicle row to stay square. This must not panic, and the real
        // vehicle must still land on the cheaper of the two stations.
        let mut orch = two_stations(1);
        let mut bus = MessageBus::new();
        bus.send(
            Endpoint::Vehicle(VehicleId(0)),
            Endpoint::Orchestrator,
            status(VehicleId(0), Coord::new(8, 9), 10.0, VehicleStatus::Waiting, 0),
        );

        orch.step(Tick(0), &mut bus, &OrchestratorParams::default());

        let outbound = bus.drain(Endpoint::Vehicle(VehicleId(0)));
        assert_eq!(outbound.len(), 1);
        match outbound[0] {
            Message::Assignment { station_id, .. } => assert_eq!(station_id, StationId(0)),
            ref other => panic!("expected Assignment, got {other:?}"),
        }
    }

    #[test]
    fn departure_promotes_the_queue_head() {
        let mut orch = one_station(1);
        let mut bus = MessageBus::new();

        orch.handle_arrival(StationId(0), VehicleId(0));
        bus.send(
            Endpoint::Vehicle(VehicleId(1)),
            Endpoint::Orchestrator,
            status(VehicleId(1), Coord::new(0, 1), 10.0, VehicleStatus::Waiting, 0),
        );
        orch.step(Tick(0), &mut bus, &OrchestratorParams::default());
        // Station is full (vehicle 0 occupying), so vehicle 1 sits in queue
        // at position 1 behind the occupant.
        let assigned = bus.drain(Endpoint::Vehicle(VehicleId(1)));
        assert_eq!(assigned.len(), 1);

        orch.handle_departure(StationId(0), VehicleId(0));
        orch.step(Tick(1), &mut bus, &OrchestratorParams::default());

        let promoted = bus.drain(Endpoint::Vehicle(VehicleId(1)));
        assert_eq!(promoted.len(), 1);
        match promoted[0] {
            Message::Assignment { queue_pos, .. } => assert_eq!(queue_pos, 0),
            ref other => panic!("expected Assignment, got {other:?}"),
        }
    }

    /// Puts one occupant and two queued vehicles (0 then 1, in that order)
    /// onto a single-capacity station, so vehicle 1 holds the worse queue
    /// position (2) and can dispute vehicle 0's (1).
    fn station_with_two_queued(bus: &mut MessageBus, battery0: f32, battery1: f32) -> Orchestrator {
        let mut orch = one_station(1);
        orch.handle_arrival(StationId(0), VehicleId(9)); // pre-existing occupant
        bus.send(
            Endpoint::Vehicle(VehicleId(0)),
            Endpoint::Orchestrator,
            status(VehicleId(0), Coord::new(0, 0), battery0, VehicleStatus::Waiting, 0),
        );
        orch.step(Tick(0), bus, &OrchestratorParams::default());
        bus.drain(Endpoint::Vehicle(VehicleId(0)));

        bus.send(
            Endpoint::Vehicle(VehicleId(1)),
            Endpoint::Orchestrator,
            status(VehicleId(1), Coord::new(0, 1), battery1, VehicleStatus::Waiting, 1),
        );
        orch.step(Tick(1), bus, &OrchestratorParams::default());
        bus.drain(Endpoint::Vehicle(VehicleId(1)));
        orch
    }

    #[test]
    fn same_station_swap_accepted_when_urgency_gap_exceeds_epsilon() {
        let mut bus = MessageBus::new();
        let mut orch = station_with_two_queued(&mut bus, 90.0, 2.0);

        // Vehicle 1 is far more urgent (near-empty battery) and disputes
        // vehicle 0's better queue position.
        bus.send(
            Endpoint::Vehicle(VehicleId(1)),
            Endpoint::Orchestrator,
            Message::CounterProposal {
                vehicle_id: VehicleId(1),
                current_station: StationId(0),
                proposed: ProposalTarget::QueuePos(1),
                reason: "urgent".to_string(),
                urgency: 10.0,
            },
        );
        orch.step(Tick(2), &mut bus, &OrchestratorParams::default());

        let decision = bus.drain(Endpoint::Vehicle(VehicleId(1)));
        assert!(decision
            .iter()
            .any(|m| matches!(m, Message::AssignmentDecision { accepted: true, .. })));
        let demotion = bus.drain(Endpoint::Vehicle(VehicleId(0)));
        assert!(demotion
            .iter()
            .any(|m| matches!(m, Message::Assignment { queue_pos: 2, .. })));
    }

    #[test]
    fn same_station_swap_rejected_when_urgency_gap_is_small() {
        let mut bus = MessageBus::new();
        let mut orch = station_with_two_queued(&mut bus, 50.0, 49.0);

        bus.send(
            Endpoint::Vehicle(VehicleId(1)),
            Endpoint::Orchestrator,
            Message::CounterProposal {
                vehicle_id: VehicleId(1),
                current_station: StationId(0),
                proposed: ProposalTarget::QueuePos(1),
                reason: "barely ahead".to_string(),
                urgency: 0.01,
            },
        );
        orch.step(Tick(2), &mut bus, &OrchestratorParams::default());

        let decision = bus.drain(Endpoint::Vehicle(VehicleId(1)));
        assert!(decision
            .iter()
            .any(|m| matches!(m, Message::AssignmentDecision { accepted: false, .. })));
    }
}
