//! The tick loop (spec §4.9 "Stepping Model"):
//!
//! ```text
//! 1. reservations.gc(current_tick)
//! 2. vehicles step, ascending id
//! 3. orchestrator.step(): drain inboxes, run assignment, process queue
//!    promotions and counter-proposals, emit outbound messages
//! 4. metrics.collect(current_tick)
//! 5. current_tick += 1
//! 6. terminate if all vehicles are terminal, or current_tick >= max_steps
//! ```
//!
//! Collision avoidance, queue negotiation, and the deadlock escape hatch all
//! fall out of the order these phases run in, not from anything this module
//! adds on top.

use rustc_hash::FxHashMap;

use fleet_core::{Coord, SimRng, Tick, VehicleId};
use fleet_grid::{Grid, ReservationTable};
use fleet_messages::{Endpoint, Message, MessageBus};
use fleet_orchestrator::{ChargingStation, CostWeights, Orchestrator, OrchestratorParams};
use fleet_vehicle::{BehaviorKind, Vehicle, VehicleEvent, VehicleParams};

use crate::deadlock;
use crate::error::{SimError, SimResult};
use crate::metrics::{jain_fairness_index, Metrics};
use crate::observer::SimObserver;
use crate::snapshot::{Snapshot, StationSnapshot, VehicleSnapshot};

/// Every tunable parameter a run needs, gathered from scenario config
/// (spec §6 "Parameters").
#[derive(Copy, Clone, Debug)]
pub struct SimParams {
    pub drain_per_step: f32,
    pub charge_per_step: f32,
    pub low_threshold: f32,
    pub charge_target: f32,
    pub w_d: f64,
    pub w_b: f64,
    pub w_l: f64,
    pub max_steps: u64,
    pub queue_cap: Option<u32>,
    pub epsilon: f32,
    pub deadlock_ticks: u32,
}

impl SimParams {
    fn vehicle_params(&self) -> VehicleParams {
        VehicleParams {
            drain_per_step: self.drain_per_step,
            charge_per_step: self.charge_per_step,
            low_threshold: self.low_threshold,
            charge_target: self.charge_target,
        }
    }

    fn orchestrator_params(&self) -> OrchestratorParams {
        OrchestratorParams {
            low_threshold: self.low_threshold,
            epsilon: self.epsilon,
            queue_cap: self.queue_cap,
            weights: CostWeights {
                w_d: self.w_d,
                w_b: self.w_b,
                w_l: self.w_l,
            },
        }
    }
}

/// How a run ended, for the CLI's exit-code mapping (spec §6).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every vehicle reached a terminal state before `max_steps`.
    Completed,
    /// `max_steps` was reached with vehicles still active (spec `TimedOut`).
    TimedOut,
}

/// Owns the whole simulated world and drives it one tick at a time.
pub struct Sim {
    grid: Grid,
    reservations: ReservationTable,
    vehicles: Vec<Vehicle>,
    initial_vehicles: Vec<Vehicle>,
    orchestrator: Orchestrator,
    initial_stations: Vec<ChargingStation>,
    bus: MessageBus,
    params: SimParams,
    seed: u64,
    rng: SimRng,
    tick: Tick,
    metrics: Metrics,
    no_progress_ticks: u32,
    completed_at: FxHashMap<VehicleId, u64>,
}

impl Sim {
    /// Build a new run. `station_capacities` must have one entry per station
    /// id the grid declares; `vehicles` is `(start_coord, initial_battery,
    /// behavior)` in the order vehicle ids are assigned.
    pub fn new(
        grid: Grid,
        station_capacities: Vec<u32>,
        vehicles: Vec<(Coord, f32, BehaviorKind)>,
        params: SimParams,
        seed: u64,
    ) -> SimResult<Self> {
        if station_capacities.len() != grid.station_count() {
            return Err(SimError::CountMismatch {
                expected: grid.station_count(),
                got: station_capacities.len(),
                what: "station capacities",
            });
        }

        let stations: Vec<ChargingStation> = grid
            .stations()
            .zip(station_capacities)
            .map(|((id, coord), capacity)| ChargingStation::new(id, coord, capacity))
            .collect();

        let mut seen_coords: Vec<Coord> = Vec::with_capacity(vehicles.len());
        let mut vehicle_list: Vec<Vehicle> = Vec::with_capacity(vehicles.len());
        for (index, (coord, battery, behavior)) in vehicles.into_iter().enumerate() {
            if !grid.is_walkable(coord) {
                return Err(SimError::Config(format!(
                    "vehicle {index} starts on a non-walkable cell {coord}"
                )));
            }
            if seen_coords.contains(&coord) {
                return Err(SimError::Config(format!(
                    "more than one vehicle starts at {coord}"
                )));
            }
            seen_coords.push(coord);
            vehicle_list.push(Vehicle::new(VehicleId(index as u32), coord, battery, behavior));
        }

        let initial_vehicles = vehicle_list.clone();
        let initial_stations = stations.clone();
        let station_count = stations.len();

        Ok(Self {
            grid,
            reservations: ReservationTable::new(),
            vehicles: vehicle_list,
            initial_vehicles,
            orchestrator: Orchestrator::new(stations),
            initial_stations,
            bus: MessageBus::new(),
            params,
            seed,
            rng: SimRng::new(seed),
            tick: Tick::ZERO,
            metrics: Metrics::new(station_count),
            no_progress_ticks: 0,
            completed_at: FxHashMap::default(),
        })
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn is_finished(&self) -> bool {
        self.vehicles.iter().all(|v| v.is_terminal()) || self.tick.0 >= self.params.max_steps
    }

    pub fn outcome(&self) -> RunOutcome {
        if self.vehicles.iter().all(|v| v.is_terminal()) {
            RunOutcome::Completed
        } else {
            RunOutcome::TimedOut
        }
    }

    pub fn fairness_index(&self) -> f64 {
        let values: Vec<f64> = self.completed_at.values().map(|&t| t as f64).collect();
        jain_fairness_index(&values)
    }

    /// The control surface's `start(scenario_id)` — the scenario is already
    /// loaded by construction, so this just returns tick zero's snapshot.
    pub fn start(&self) -> Snapshot {
        self.snapshot(Vec::new())
    }

    /// Return to the scenario's initial state.
    pub fn reset(&mut self) -> Snapshot {
        self.vehicles = self.initial_vehicles.clone();
        self.orchestrator = Orchestrator::new(self.initial_stations.clone());
        self.bus = MessageBus::new();
        self.reservations = ReservationTable::new();
        self.tick = Tick::ZERO;
        self.rng = SimRng::new(self.seed);
        self.metrics = Metrics::new(self.initial_stations.len());
        self.no_progress_ticks = 0;
        self.completed_at.clear();
        self.start()
    }

    /// Advance exactly one tick and return its snapshot.
    pub fn step(&mut self) -> Snapshot {
        let tick = self.tick;
        let vparams = self.params.vehicle_params();
        let oparams = self.params.orchestrator_params();
        let mut log = Vec::new();

        self.reservations.gc(tick);

        let positions: FxHashMap<Coord, VehicleId> =
            self.vehicles.iter().map(|v| (v.coord, v.id)).collect();
        let planned_next: FxHashMap<VehicleId, Coord> = self
            .vehicles
            .iter()
            .filter(|v| v.path.len() >= 2)
            .map(|v| (v.id, v.path[1]))
            .collect();

        // A per-tick snapshot of station state, owned locally, so the
        // opponent-lookup closure below never needs to borrow `self` —
        // sidesteps any aliasing question with the concurrent `&mut
        // self.vehicles[i]` borrow in the loop underneath.
        let stations_before: Vec<ChargingStation> = self.orchestrator.stations().to_vec();
        let opponent_lookup = |station_id: fleet_core::StationId, queue_pos: u32| -> Option<VehicleId> {
            if queue_pos == 0 {
                return None;
            }
            let station = stations_before.iter().find(|s| s.id == station_id)?;
            let target_pos = queue_pos - 1;
            let occupant_count = station.occupants.len() as u32;
            if target_pos < occupant_count {
                station.occupants.get(target_pos as usize).copied()
            } else {
                station.queue.get((target_pos - occupant_count) as usize).copied()
            }
        };
        let mut decide_fn = fleet_behavior::decide;

        let mut claimed_this_tick: FxHashMap<Coord, VehicleId> = FxHashMap::default();
        let mut progress = false;

        for i in 0..self.vehicles.len() {
            if self.vehicles[i].is_terminal() {
                continue;
            }
            let pre_coord = self.vehicles[i].coord;
            let pre_state = self.vehicles[i].state;
            let pre_was_moving = matches!(
                pre_state,
                fleet_messages::VehicleStatus::Moving | fleet_messages::VehicleStatus::Exiting
            ) && self.vehicles[i].path.len() >= 2;

            let event = self.vehicles[i].step(
                tick,
                &vparams,
                &self.grid,
                &mut self.reservations,
                &positions,
                &planned_next,
                &mut claimed_this_tick,
                &mut self.bus,
                &opponent_lookup,
                &mut decide_fn,
            );

            let vehicle_id = self.vehicles[i].id;
            let moved = self.vehicles[i].coord != pre_coord;
            let state_changed = self.vehicles[i].state != pre_state;

            match event {
                VehicleEvent::None => {}
                VehicleEvent::ArrivedAtStation(station_id) => {
                    self.orchestrator.handle_arrival(station_id, vehicle_id);
                    self.vehicles[i].begin_charging();
                }
                VehicleEvent::DepartedStation(station_id) => {
                    self.orchestrator.handle_departure(station_id, vehicle_id);
                    self.vehicles[i].begin_exit(tick, &self.grid, &mut self.reservations);
                }
                VehicleEvent::Completed => {
                    self.completed_at.insert(vehicle_id, tick.0);
                    log.push(format!("{tick}: vehicle {vehicle_id} completed"));
                }
                VehicleEvent::Stranded => {
                    log.push(format!("{tick}: vehicle {vehicle_id} stranded"));
                }
            }

            if !moved && !state_changed && pre_was_moving && matches!(event, VehicleEvent::None) {
                self.metrics.record_collision_yield();
            }
            progress |= moved || state_changed || !matches!(event, VehicleEvent::None);
        }

        let counter_proposals = self
            .bus
            .peek(Endpoint::Orchestrator)
            .filter(|m| matches!(m, Message::CounterProposal { .. }))
            .count();
        for _ in 0..counter_proposals {
            self.metrics.record_counter_proposal();
        }

        self.orchestrator.step(tick, &mut self.bus, &oparams);

        for vehicle in &self.vehicles {
            for message in self.bus.peek(Endpoint::Vehicle(vehicle.id)) {
                if let Message::AssignmentDecision { accepted, .. } = message {
                    self.metrics.record_decision(vehicle.behavior, *accepted);
                }
            }
        }

        let orchestrator_changed = stations_before.iter().zip(self.orchestrator.stations()).any(
            |(before, after)| before.occupants != after.occupants || before.queue != after.queue,
        );
        progress |= orchestrator_changed;

        self.metrics.record_tick(self.orchestrator.stations());

        if progress {
            self.no_progress_ticks = 0;
        } else {
            self.no_progress_ticks += 1;
        }

        let recovered = deadlock::maybe_recover(
            self.no_progress_ticks,
            self.params.deadlock_ticks,
            tick,
            &mut self.vehicles,
            &self.grid,
            &mut self.reservations,
            &mut self.rng,
        );
        if recovered {
            log.push(format!("{tick}: deadlock escape hatch triggered"));
            self.no_progress_ticks = 0;
        }

        self.tick = self.tick.next();
        self.snapshot(log)
    }

    /// Advance until every vehicle reaches a terminal state, `max_steps` is
    /// hit, or `max_ticks` (if given) elapses — whichever comes first.
    pub fn run_until(&mut self, max_ticks: Option<u64>, observer: &mut dyn SimObserver) -> Snapshot {
        observer.on_start(&self.start());
        let deadline = max_ticks.map(|n| self.tick.0 + n);
        loop {
            if self.is_finished() {
                break;
            }
            if let Some(deadline) = deadline {
                if self.tick.0 >= deadline {
                    break;
                }
            }
            let tick = self.tick;
            let snapshot = self.step();
            if !snapshot.log.is_empty() && snapshot.log.iter().any(|l| l.contains("deadlock")) {
                observer.on_deadlock(tick);
            }
            observer.on_tick(tick, &snapshot);
        }
        let final_snapshot = self.snapshot(Vec::new());
        observer.on_finish(&final_snapshot);
        final_snapshot
    }

    /// Run to natural completion (bounded only by `max_steps`).
    pub fn run(&mut self, observer: &mut dyn SimObserver) -> Snapshot {
        self.run_until(None, observer)
    }

    fn snapshot(&self, log: Vec<String>) -> Snapshot {
        Snapshot {
            tick: self.tick,
            vehicles: self
                .vehicles
                .iter()
                .map(|v| VehicleSnapshot {
                    id: v.id,
                    coord: v.coord,
                    battery: v.battery,
                    state: v.state,
                    path: v.path.clone(),
                    queue_pos: v.queue_pos,
                    station_id: v.assigned_station,
                })
                .collect(),
            stations: self
                .orchestrator
                .stations()
                .iter()
                .map(|s| StationSnapshot {
                    id: s.id,
                    coord: s.coord,
                    capacity: s.capacity,
                    occupants: s.occupants.clone(),
                    queue: s.queue.clone(),
                })
                .collect(),
            log,
            metrics: self.metrics.clone(),
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn reservations(&self) -> &ReservationTable {
        &self.reservations
    }
}
