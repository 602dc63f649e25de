//! Unit tests for the vehicle state machine.

use rustc_hash::FxHashMap;

use fleet_core::{Coord, StationId, Tick, VehicleId};
use fleet_grid::{Grid, GridBuilder, ReservationTable};
use fleet_messages::{Endpoint, Message, MessageBus};

use crate::{Action, BehaviorKind, Decision, Vehicle, VehicleEvent, VehicleParams, VehicleStatus};

fn straight_grid() -> Grid {
    // "0.E" — station 0 at (0,0), exit at (2,0), one empty cell between.
    GridBuilder::from_ascii_map(&["0.E"], Coord::new(2, 0)).unwrap()
}

fn two_row_grid() -> Grid {
    // Row 0: station, empty, exit. Row 1: all empty, gives an alternate route.
    GridBuilder::from_ascii_map(&["0.E", "..."], Coord::new(2, 0)).unwrap()
}

fn params() -> VehicleParams {
    VehicleParams {
        drain_per_step: 1.0,
        charge_per_step: 20.0,
        low_threshold: 30.0,
        charge_target: 90.0,
    }
}

fn no_opponent(_station: StationId, _queue_pos: u32) -> Option<VehicleId> {
    None
}

fn always_accept(_v: &Vehicle, _kind: BehaviorKind, _last_peer: Option<Action>) -> Decision {
    Decision::Accept
}

#[test]
fn new_vehicle_starts_idle() {
    let v = Vehicle::new(VehicleId(0), Coord::new(0, 0), 100.0, BehaviorKind::None);
    assert_eq!(v.state, VehicleStatus::Idle);
    assert_eq!(v.battery, 100.0);
    assert!(v.path.is_empty());
}

#[test]
fn urgency_grows_with_deficit_and_wait() {
    let mut v = Vehicle::new(VehicleId(0), Coord::new(0, 0), 30.0, BehaviorKind::None);
    let base = v.urgency(40.0);
    assert!(base > 0.0);
    v.ticks_waited = 5;
    assert!(v.urgency(40.0) > base);
}

#[test]
fn idle_transitions_to_waiting_below_low_threshold() {
    let grid = straight_grid();
    let mut reservations = ReservationTable::new();
    let mut bus = MessageBus::new();
    let mut v = Vehicle::new(VehicleId(0), Coord::new(1, 0), 31.0, BehaviorKind::None);
    let p = params();

    let positions = FxHashMap::default();
    let planned_next = FxHashMap::default();
    let mut claimed = FxHashMap::default();
    let mut decide = always_accept;

    v.step(
        Tick::ZERO,
        &p,
        &grid,
        &mut reservations,
        &positions,
        &planned_next,
        &mut claimed,
        &mut bus,
        &no_opponent,
        &mut decide,
    );

    assert_eq!(v.state, VehicleStatus::Waiting);
    assert_eq!(v.battery, 30.0);
}

#[test]
fn assignment_with_queue_pos_zero_starts_moving_and_plans_path() {
    let grid = straight_grid();
    let mut reservations = ReservationTable::new();
    let mut bus = MessageBus::new();
    let station_id = grid.stations().next().unwrap().0;

    let mut v = Vehicle::new(VehicleId(0), Coord::new(2, 0), 50.0, BehaviorKind::None);
    v.state = VehicleStatus::Waiting;
    bus.send(
        Endpoint::Orchestrator,
        Endpoint::Vehicle(v.id),
        Message::Assignment {
            vehicle_id: v.id,
            station_id,
            station_coord: grid.station_coord(station_id),
            queue_pos: 0,
            priority: 0,
        },
    );

    let p = params();
    let positions = FxHashMap::default();
    let planned_next = FxHashMap::default();
    let mut claimed = FxHashMap::default();
    let mut decide = always_accept;

    v.step(
        Tick::ZERO,
        &p,
        &grid,
        &mut reservations,
        &positions,
        &planned_next,
        &mut claimed,
        &mut bus,
        &no_opponent,
        &mut decide,
    );

    assert_eq!(v.state, VehicleStatus::Moving);
    assert_eq!(v.path.first().copied(), Some(Coord::new(2, 0)));
    assert_eq!(v.path.last().copied(), Some(Coord::new(0, 0)));
}

#[test]
fn moving_vehicle_reaches_station_and_reports_event() {
    let grid = straight_grid();
    let mut reservations = ReservationTable::new();
    let mut bus = MessageBus::new();
    let station_id = grid.stations().next().unwrap().0;

    let mut v = Vehicle::new(VehicleId(0), Coord::new(1, 0), 50.0, BehaviorKind::None);
    v.state = VehicleStatus::Moving;
    v.assigned_station = Some(station_id);
    v.queue_pos = Some(0);
    v.path = vec![Coord::new(1, 0), Coord::new(0, 0)];

    let p = params();
    let positions = FxHashMap::default();
    let planned_next = FxHashMap::default();
    let mut claimed = FxHashMap::default();
    let mut decide = always_accept;

    let event = v.step(
        Tick::ZERO,
        &p,
        &grid,
        &mut reservations,
        &positions,
        &planned_next,
        &mut claimed,
        &mut bus,
        &no_opponent,
        &mut decide,
    );

    assert_eq!(event, VehicleEvent::ArrivedAtStation(station_id));
    assert_eq!(v.coord, Coord::new(0, 0));
    assert_eq!(v.distance_traveled, 1);
}

#[test]
fn charging_departs_once_target_reached() {
    let grid = straight_grid();
    let mut reservations = ReservationTable::new();
    let mut bus = MessageBus::new();
    let station_id = grid.stations().next().unwrap().0;

    let mut v = Vehicle::new(VehicleId(0), Coord::new(0, 0), 70.0, BehaviorKind::None);
    v.state = VehicleStatus::Charging;
    v.assigned_station = Some(station_id);
    v.queue_pos = Some(0);

    let p = params();
    let positions = FxHashMap::default();
    let planned_next = FxHashMap::default();
    let mut claimed = FxHashMap::default();
    let mut decide = always_accept;

    let event = v.step(
        Tick::ZERO,
        &p,
        &grid,
        &mut reservations,
        &positions,
        &planned_next,
        &mut claimed,
        &mut bus,
        &no_opponent,
        &mut decide,
    );

    assert_eq!(event, VehicleEvent::DepartedStation(station_id));
    assert_eq!(v.battery, 90.0);
    assert_eq!(v.ticks_charging, 1);
}

#[test]
fn exiting_completes_at_the_exit_cell() {
    let grid = straight_grid();
    let mut reservations = ReservationTable::new();
    let mut bus = MessageBus::new();

    let mut v = Vehicle::new(VehicleId(0), Coord::new(0, 0), 90.0, BehaviorKind::None);
    v.begin_exit(Tick::ZERO, &grid, &mut reservations);
    assert_eq!(v.state, VehicleStatus::Exiting);
    assert_eq!(v.path.last().copied(), Some(grid.exit()));

    let p = params();
    let positions = FxHashMap::default();
    let planned_next = FxHashMap::default();
    let mut claimed = FxHashMap::default();
    let mut decide = always_accept;

    // Two steps: (0,0) -> (1,0) -> (2,0), the exit.
    for _ in 0..2 {
        v.step(
            Tick::ZERO,
            &p,
            &grid,
            &mut reservations,
            &positions,
            &planned_next,
            &mut claimed,
            &mut bus,
            &no_opponent,
            &mut decide,
        );
    }

    assert_eq!(v.state, VehicleStatus::Completed);
    assert_eq!(v.coord, grid.exit());
}

#[test]
fn reserved_cell_forces_a_yield_not_a_move() {
    let grid = straight_grid();
    let mut reservations = ReservationTable::new();
    let mut bus = MessageBus::new();
    let blocker = VehicleId(99);

    let mut v = Vehicle::new(VehicleId(0), Coord::new(0, 0), 90.0, BehaviorKind::None);
    v.state = VehicleStatus::Moving;
    v.path = vec![Coord::new(0, 0), Coord::new(1, 0), Coord::new(2, 0)];

    reservations
        .reserve(blocker, Tick::ZERO.offset(1), Coord::new(1, 0))
        .unwrap();

    let p = params();
    let positions = FxHashMap::default();
    let planned_next = FxHashMap::default();
    let mut claimed = FxHashMap::default();
    let mut decide = always_accept;

    v.step(
        Tick::ZERO,
        &p,
        &grid,
        &mut reservations,
        &positions,
        &planned_next,
        &mut claimed,
        &mut bus,
        &no_opponent,
        &mut decide,
    );

    assert_eq!(v.coord, Coord::new(0, 0));
    assert_eq!(v.distance_traveled, 0);
}

#[test]
fn three_consecutive_yields_force_a_replan() {
    let grid = two_row_grid();
    let mut reservations = ReservationTable::new();
    let mut bus = MessageBus::new();
    let blocker = VehicleId(99);

    let mut v = Vehicle::new(VehicleId(0), Coord::new(0, 0), 90.0, BehaviorKind::None);
    v.state = VehicleStatus::Moving;
    v.path = vec![Coord::new(0, 0), Coord::new(1, 0), Coord::new(2, 0)];

    let p = params();
    let positions = FxHashMap::default();
    let planned_next = FxHashMap::default();
    let mut claimed = FxHashMap::default();
    let mut decide = always_accept;

    for i in 0..3u64 {
        let tick = Tick(i);
        reservations
            .reserve(blocker, tick.offset(1), Coord::new(1, 0))
            .unwrap();
        claimed.clear();
        v.step(
            tick,
            &p,
            &grid,
            &mut reservations,
            &positions,
            &planned_next,
            &mut claimed,
            &mut bus,
            &no_opponent,
            &mut decide,
        );
    }

    assert_eq!(v.replan_count, 1);
    assert_eq!(v.coord, Coord::new(0, 0));
    assert!(
        v.path.len() > 2,
        "replanned path should detour around the blocked cell"
    );
    assert_ne!(v.path.get(1), Some(&Coord::new(1, 0)));
}

#[test]
fn battery_reaching_zero_strands_the_vehicle() {
    let grid = straight_grid();
    let mut reservations = ReservationTable::new();
    let mut bus = MessageBus::new();

    let mut v = Vehicle::new(VehicleId(0), Coord::new(0, 0), 0.5, BehaviorKind::None);
    let p = params();
    let positions = FxHashMap::default();
    let planned_next = FxHashMap::default();
    let mut claimed = FxHashMap::default();
    let mut decide = always_accept;

    let event = v.step(
        Tick::ZERO,
        &p,
        &grid,
        &mut reservations,
        &positions,
        &planned_next,
        &mut claimed,
        &mut bus,
        &no_opponent,
        &mut decide,
    );

    assert_eq!(event, VehicleEvent::Stranded);
    assert!(v.stranded);
    assert_eq!(v.state, VehicleStatus::Completed);
}
