//! The per-vehicle state machine: sense, plan, move, charge.
//!
//! `Vehicle::step` is called once per tick, in ascending `VehicleId` order
//! (the caller — the stepping model — guarantees this). It owns everything a
//! vehicle can resolve with only its own state, the grid, the reservation
//! table, and the message bus; anything that needs mutable access to shared
//! station state (arriving at / departing a station) is reported back as a
//! [`VehicleEvent`] for the caller to apply, since stations are owned by the
//! orchestrator, not by vehicles.

use rustc_hash::{FxHashMap, FxHashSet};

use fleet_core::{Coord, StationId, Tick, VehicleId};
use fleet_grid::{plan, Grid, ReservationTable};
use fleet_messages::{Endpoint, Message, MessageBus, ProposalTarget, VehicleStatus};

use crate::history::{Action, BehaviorKind, Decision, History};

/// Tunable simulation parameters a vehicle's step depends on.
#[derive(Copy, Clone, Debug)]
pub struct VehicleParams {
    pub drain_per_step: f32,
    pub charge_per_step: f32,
    pub low_threshold: f32,
    pub charge_target: f32,
}

/// A consequence of this tick's step that the caller must apply to shared
/// (orchestrator-owned) state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VehicleEvent {
    None,
    /// Reached the assigned station cell with `queue_pos == 0`. The caller
    /// must confirm a free occupant slot and call [`Vehicle::begin_charging`].
    ArrivedAtStation(StationId),
    /// Battery reached `charge_target`; the caller must free the station
    /// slot, promote the queue, and call [`Vehicle::begin_exit`].
    DepartedStation(StationId),
    Completed,
    Stranded,
}

#[derive(Clone)]
pub struct Vehicle {
    pub id: VehicleId,
    pub coord: Coord,
    pub battery: f32,
    pub state: VehicleStatus,
    pub path: Vec<Coord>,
    pub assigned_station: Option<StationId>,
    pub queue_pos: Option<u32>,
    pub behavior: BehaviorKind,
    pub history: History,

    consecutive_yields: u8,
    consecutive_noroute: u8,
    /// Vehicle remembered this peer as the target of its last unresolved
    /// `CounterProposal`, so the eventual `AssignmentDecision` (which carries
    /// no opponent id) can still be attributed to the right peer history.
    last_dispute_opponent: Option<VehicleId>,

    pub ticks_waited: u32,
    pub ticks_waiting: u32,
    pub ticks_charging: u32,
    pub distance_traveled: u32,
    pub replan_count: u32,
    pub stranded: bool,
}

impl Vehicle {
    pub fn new(id: VehicleId, coord: Coord, battery: f32, behavior: BehaviorKind) -> Self {
        Self {
            id,
            coord,
            battery,
            state: VehicleStatus::Idle,
            path: Vec::new(),
            assigned_station: None,
            queue_pos: None,
            behavior,
            history: History::new(),
            consecutive_yields: 0,
            consecutive_noroute: 0,
            last_dispute_opponent: None,
            ticks_waited: 0,
            ticks_waiting: 0,
            ticks_charging: 0,
            distance_traveled: 0,
            replan_count: 0,
            stranded: false,
        }
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Urgency in `[0, ~1.something]`: battery deficit below `low_threshold`
    /// plus accrued wait time. See `DESIGN.md` for why this form (rather
    /// than battery-only) was chosen for the open spec question.
    pub fn urgency(&self, low_threshold: f32) -> f32 {
        let deficit = ((low_threshold - self.battery) / low_threshold).max(0.0);
        deficit + 0.1 * self.ticks_waited as f32
    }

    fn goal(&self) -> Coord {
        self.path.last().copied().unwrap_or(self.coord)
    }

    fn emit_status(&self, tick: Tick, bus: &mut MessageBus) {
        bus.send(
            Endpoint::Vehicle(self.id),
            Endpoint::Orchestrator,
            Message::StatusUpdate {
                vehicle_id: self.id,
                coord: self.coord,
                battery: self.battery,
                state: self.state,
                tick: tick.0,
            },
        );
    }

    /// Start charging at the station reached this tick. Caller has already
    /// confirmed the slot.
    pub fn begin_charging(&mut self) {
        self.state = VehicleStatus::Charging;
        self.path.clear();
    }

    /// Leave the station and head for the exit. Caller has already freed the
    /// station slot and promoted the queue.
    pub fn begin_exit(&mut self, tick: Tick, grid: &Grid, reservations: &mut ReservationTable) {
        self.state = VehicleStatus::Exiting;
        self.assigned_station = None;
        self.queue_pos = None;
        reservations.clear_vehicle(self.id);
        match plan(self.coord, grid.exit(), grid, &FxHashSet::default()) {
            Ok(path) => {
                self.path = path;
                if self.path.len() > 1 {
                    let _ = reservations.reserve_path(self.id, tick.offset(1), &self.path[1..]);
                }
            }
            Err(_) => {
                // No route to the exit right now; retried next tick's
                // collision-avoidance replan path, same as any other NoPath.
                self.path = vec![self.coord];
            }
        }
    }

    /// Process this tick's inbox: apply assignment/decision messages and
    /// dispatch the behavioral response to any suboptimal assignment.
    ///
    /// `opponent_lookup(station, queue_pos)` resolves the vehicle currently
    /// holding `queue_pos - 1` on `station` — the "opponent" for tit-for-tat
    /// purposes — since the message schema itself carries no opponent id.
    #[allow(clippy::too_many_arguments)]
    fn handle_inbox(
        &mut self,
        tick: Tick,
        params: &VehicleParams,
        grid: &Grid,
        reservations: &mut ReservationTable,
        bus: &mut MessageBus,
        opponent_lookup: &dyn Fn(StationId, u32) -> Option<VehicleId>,
        decide: &mut dyn FnMut(&Vehicle, BehaviorKind, Option<Action>) -> Decision,
    ) {
        let messages = bus.drain(Endpoint::Vehicle(self.id));
        for message in messages {
            match message {
                Message::Assignment {
                    station_id,
                    station_coord,
                    queue_pos,
                    ..
                } => {
                    self.assigned_station = Some(station_id);
                    self.queue_pos = Some(queue_pos);

                    if queue_pos > 0 {
                        let opponent = opponent_lookup(station_id, queue_pos);
                        let last_peer = opponent.and_then(|p| self.history.last_peer_action(p));
                        let decision = decide(self, self.behavior, last_peer);
                        if let Some(peer) = opponent {
                            self.history.record_own(peer, decision.as_action());
                        }
                        if decision == Decision::Dispute {
                            self.last_dispute_opponent = opponent;
                            bus.send(
                                Endpoint::Vehicle(self.id),
                                Endpoint::Orchestrator,
                                Message::CounterProposal {
                                    vehicle_id: self.id,
                                    current_station: station_id,
                                    proposed: ProposalTarget::QueuePos(queue_pos - 1),
                                    reason: "disputing suboptimal queue position".to_string(),
                                    urgency: self.urgency(params.low_threshold),
                                },
                            );
                        }
                        self.plan_to_waiting_cell(tick, grid, reservations, station_coord, queue_pos);
                    } else {
                        self.plan_to(tick, grid, reservations, station_coord);
                    }

                    if self.state == VehicleStatus::Waiting {
                        self.state = VehicleStatus::Moving;
                    }
                }

                Message::AssignmentDecision {
                    accepted,
                    new_assignment,
                    ..
                } => {
                    if let Some(opponent) = self.last_dispute_opponent.take() {
                        let peer_action = if accepted { Action::Cooperate } else { Action::Defect };
                        self.history.record_peer(opponent, peer_action);
                    }
                    if accepted {
                        if let Some((station_id, queue_pos)) = new_assignment {
                            self.assigned_station = Some(station_id);
                            self.queue_pos = Some(queue_pos);
                            let station_coord = grid.station_coord(station_id);
                            if queue_pos > 0 {
                                self.plan_to_waiting_cell(tick, grid, reservations, station_coord, queue_pos);
                            } else {
                                self.plan_to(tick, grid, reservations, station_coord);
                            }
                            if self.state == VehicleStatus::Waiting {
                                self.state = VehicleStatus::Moving;
                            }
                        }
                    }
                }

                // A vehicle never receives its own StatusUpdate/CounterProposal.
                Message::StatusUpdate { .. } | Message::CounterProposal { .. } => {}
            }
        }
    }

    fn plan_to(&mut self, tick: Tick, grid: &Grid, reservations: &mut ReservationTable, goal: Coord) {
        reservations.clear_vehicle(self.id);
        match plan(self.coord, goal, grid, &FxHashSet::default()) {
            Ok(path) => {
                self.path = path;
                self.consecutive_noroute = 0;
                if self.path.len() > 1 {
                    let _ = reservations.reserve_path(self.id, tick.offset(1), &self.path[1..]);
                }
            }
            Err(_) => {
                self.path = vec![self.coord];
                self.consecutive_noroute += 1;
                if self.consecutive_noroute >= 3 {
                    self.state = VehicleStatus::Completed;
                    self.stranded = true;
                    self.assigned_station = None;
                    self.queue_pos = None;
                } else {
                    // Re-request assignment next tick.
                    self.assigned_station = None;
                    self.queue_pos = None;
                }
            }
        }
    }

    /// Plan to a waiting cell adjacent to `station_coord`, chosen
    /// deterministically by `queue_pos` so distinct queued vehicles don't
    /// target the same cell.
    fn plan_to_waiting_cell(
        &mut self,
        tick: Tick,
        grid: &Grid,
        reservations: &mut ReservationTable,
        station_coord: Coord,
        queue_pos: u32,
    ) {
        let candidates: Vec<Coord> = grid.neighbors4(station_coord).collect();
        let goal = if candidates.is_empty() {
            station_coord
        } else {
            candidates[(queue_pos as usize - 1) % candidates.len()]
        };
        self.plan_to(tick, grid, reservations, goal);
    }

    /// Force an immediate replan toward the current goal, bypassing the
    /// yield-count threshold. Used by the stepping model's deadlock escape
    /// hatch when no vehicle has moved for `deadlock_ticks` consecutive
    /// ticks; a no-op for vehicles with nowhere to go.
    pub fn force_replan(&mut self, tick: Tick, grid: &Grid, reservations: &mut ReservationTable) {
        if self.is_terminal() || self.path.len() < 2 {
            return;
        }
        let goal = self.goal();
        reservations.clear_vehicle(self.id);
        match plan(self.coord, goal, grid, &FxHashSet::default()) {
            Ok(path) => {
                self.path = path;
                self.replan_count += 1;
                self.consecutive_yields = 0;
                if self.path.len() > 1 {
                    let _ = reservations.reserve_path(self.id, tick.offset(1), &self.path[1..]);
                }
            }
            Err(_) => {
                self.consecutive_noroute += 1;
                if self.consecutive_noroute >= 3 {
                    self.state = VehicleStatus::Completed;
                    self.stranded = true;
                }
            }
        }
    }

    /// Advance one cell along `self.path`, honoring collision avoidance.
    /// Returns `true` if the vehicle moved (possibly arriving at its goal).
    #[allow(clippy::too_many_arguments)]
    fn advance(
        &mut self,
        tick: Tick,
        grid: &Grid,
        reservations: &mut ReservationTable,
        positions: &FxHashMap<Coord, VehicleId>,
        planned_next: &FxHashMap<VehicleId, Coord>,
        claimed_this_tick: &mut FxHashMap<Coord, VehicleId>,
    ) -> bool {
        if self.path.len() < 2 {
            return false;
        }
        let intended_next = self.path[1];

        let blocked_by_reservation = matches!(
            reservations.is_reserved(tick.offset(1), intended_next),
            Some(holder) if holder != self.id
        );
        let blocked_by_priority = claimed_this_tick
            .get(&intended_next)
            .is_some_and(|&holder| holder != self.id);
        let swap_conflict = positions
            .get(&intended_next)
            .filter(|&&occ| occ != self.id)
            .is_some_and(|&occ| occ < self.id && planned_next.get(&occ) == Some(&self.coord));

        if blocked_by_reservation || blocked_by_priority || swap_conflict {
            self.consecutive_yields += 1;
            if self.consecutive_yields >= 3 {
                let mut blocked = FxHashSet::default();
                blocked.insert(intended_next);
                let goal = self.goal();
                reservations.clear_vehicle(self.id);
                match plan(self.coord, goal, grid, &blocked) {
                    Ok(path) => {
                        self.path = path;
                        self.replan_count += 1;
                        self.consecutive_yields = 0;
                        if self.path.len() > 1 {
                            let _ = reservations.reserve_path(self.id, tick.offset(1), &self.path[1..]);
                        }
                    }
                    Err(_) => {
                        self.consecutive_noroute += 1;
                        if self.consecutive_noroute >= 3 {
                            self.state = VehicleStatus::Completed;
                            self.stranded = true;
                        }
                    }
                }
            }
            return false;
        }

        self.consecutive_yields = 0;
        reservations.clear_vehicle(self.id);
        self.coord = intended_next;
        self.path.remove(0);
        self.distance_traveled += 1;
        claimed_this_tick.insert(self.coord, self.id);
        if self.path.len() > 1 {
            let _ = reservations.reserve_path(self.id, tick.offset(1), &self.path[1..]);
        }
        true
    }

    /// Run this vehicle's full per-tick step.
    #[allow(clippy::too_many_arguments)]
    pub fn step(
        &mut self,
        tick: Tick,
        params: &VehicleParams,
        grid: &Grid,
        reservations: &mut ReservationTable,
        positions: &FxHashMap<Coord, VehicleId>,
        planned_next: &FxHashMap<VehicleId, Coord>,
        claimed_this_tick: &mut FxHashMap<Coord, VehicleId>,
        bus: &mut MessageBus,
        opponent_lookup: &dyn Fn(StationId, u32) -> Option<VehicleId>,
        decide: &mut dyn FnMut(&Vehicle, BehaviorKind, Option<Action>) -> Decision,
    ) -> VehicleEvent {
        if self.state == VehicleStatus::Completed {
            return VehicleEvent::None;
        }

        if self.state == VehicleStatus::Charging {
            self.battery = (self.battery + params.charge_per_step).min(100.0);
            self.ticks_charging += 1;
        } else {
            self.battery = (self.battery - params.drain_per_step).max(0.0);
        }

        // Emit before ingesting assignments and acting, so the orchestrator
        // sees this tick's pre-action state rather than where the vehicle
        // ends up after moving.
        self.emit_status(tick, bus);

        self.handle_inbox(tick, params, grid, reservations, bus, opponent_lookup, decide);

        if self.battery <= 0.0 && self.state != VehicleStatus::Completed {
            self.state = VehicleStatus::Completed;
            self.stranded = true;
            return VehicleEvent::Stranded;
        }

        let event = match self.state {
            VehicleStatus::Idle => {
                if self.battery <= params.low_threshold {
                    self.state = VehicleStatus::Waiting;
                    self.ticks_waited = 0;
                }
                VehicleEvent::None
            }

            VehicleStatus::Waiting => {
                self.ticks_waited += 1;
                self.ticks_waiting += 1;
                VehicleEvent::None
            }

            VehicleStatus::Moving => {
                if self.path.len() < 2 {
                    if self.queue_pos.unwrap_or(0) > 0 {
                        self.state = VehicleStatus::Waiting;
                    }
                    VehicleEvent::None
                } else {
                    let moved = self.advance(tick, grid, reservations, positions, planned_next, claimed_this_tick);
                    if moved && self.path.len() == 1 {
                        if let Some(station_id) = self.assigned_station {
                            if self.coord == grid.station_coord(station_id) && self.queue_pos == Some(0) {
                                return VehicleEvent::ArrivedAtStation(station_id);
                            }
                        }
                        if self.queue_pos.unwrap_or(0) > 0 {
                            self.state = VehicleStatus::Waiting;
                        }
                    }
                    if self.state == VehicleStatus::Completed {
                        return VehicleEvent::Stranded;
                    }
                    VehicleEvent::None
                }
            }

            VehicleStatus::Charging => {
                if self.battery >= params.charge_target {
                    if let Some(station_id) = self.assigned_station {
                        return VehicleEvent::DepartedStation(station_id);
                    }
                }
                VehicleEvent::None
            }

            VehicleStatus::Exiting => {
                if self.coord == grid.exit() {
                    self.state = VehicleStatus::Completed;
                    return VehicleEvent::Completed;
                }
                if self.path.len() >= 2 {
                    self.advance(tick, grid, reservations, positions, planned_next, claimed_this_tick);
                    if self.coord == grid.exit() {
                        self.state = VehicleStatus::Completed;
                        return VehicleEvent::Completed;
                    }
                }
                VehicleEvent::None
            }

            VehicleStatus::Completed => VehicleEvent::None,
        };

        event
    }
}
