//! The orchestrator: Hungarian assignment runs, queue promotion, and
//! counter-proposal negotiation (C6/C7).
//!
//! The orchestrator never touches a `Vehicle` directly — it tracks just
//! enough per-vehicle bookkeeping (coord, battery, state, assignment) from
//! `StatusUpdate` messages to run the assignment and negotiation logic, and
//! talks back exclusively through [`Message`].

use rustc_hash::FxHashMap;

use fleet_core::{Coord, StationId, Tick, VehicleId};
use fleet_messages::{Endpoint, Message, MessageBus, ProposalTarget, VehicleStatus};

use crate::cost::{build_cost_matrix, CostWeights, StationCostInput, VehicleCostInput};
use crate::hungarian;
use crate::station::ChargingStation;

/// Tunables the assignment and negotiation algorithms depend on.
#[derive(Copy, Clone, Debug)]
pub struct OrchestratorParams {
    pub low_threshold: f32,
    /// Minimum urgency gap required to accept a same-station swap proposal.
    pub epsilon: f32,
    /// Maximum combined `|occupants| + |queue|` a station may carry before
    /// it's excluded from receiving new assignments. `None` means unbounded.
    pub queue_cap: Option<u32>,
    pub weights: CostWeights,
}

impl Default for OrchestratorParams {
    fn default() -> Self {
        Self {
            low_threshold: 20.0,
            epsilon: 0.05,
            queue_cap: None,
            weights: CostWeights::default(),
        }
    }
}

/// `urgency := max(0, (low_threshold - battery) / low_threshold) + 0.1 *
/// ticks_waited` — the same formula `Vehicle::urgency` computes locally, but
/// derived here from the orchestrator's own bookkeeping since this crate
/// doesn't depend on `fleet-vehicle`.
fn urgency(battery: f32, ticks_waited: u32, low_threshold: f32) -> f32 {
    let deficit = ((low_threshold - battery) / low_threshold).max(0.0);
    deficit + 0.1 * ticks_waited as f32
}

#[derive(Clone, Debug)]
struct VehicleRecord {
    coord: Coord,
    battery: f32,
    state: VehicleStatus,
    ticks_waited: u32,
    assigned_station: Option<StationId>,
}

impl VehicleRecord {
    fn new(coord: Coord, battery: f32, state: VehicleStatus) -> Self {
        Self {
            coord,
            battery,
            state,
            ticks_waited: 0,
            assigned_station: None,
        }
    }
}

pub struct Orchestrator {
    stations: Vec<ChargingStation>,
    records: FxHashMap<VehicleId, VehicleRecord>,
    /// Stations with a departure this tick, queued for promotion processing
    /// in `step` (spec: promotion happens in the orchestrator's step slot,
    /// not inline with the vehicle event that caused it).
    pending_promotions: Vec<StationId>,
    /// Counter-proposals that lost the "one accepted per (u, tick)" race and
    /// carry over to the next `step`.
    deferred: Vec<Message>,
}

impl Orchestrator {
    pub fn new(stations: Vec<ChargingStation>) -> Self {
        Self {
            stations,
            records: FxHashMap::default(),
            pending_promotions: Vec::new(),
            deferred: Vec::new(),
        }
    }

    pub fn stations(&self) -> &[ChargingStation] {
        &self.stations
    }

    fn station_index(&self, id: StationId) -> Option<usize> {
        self.stations.iter().position(|s| s.id == id)
    }

    /// A vehicle physically reached its `queue_pos == 0` station. Called by
    /// the stepping model when a vehicle's step reports
    /// `VehicleEvent::ArrivedAtStation`.
    pub fn handle_arrival(&mut self, station_id: StationId, vehicle_id: VehicleId) {
        if let Some(idx) = self.station_index(station_id) {
            self.stations[idx].arrive(vehicle_id);
        }
    }

    /// A vehicle finished charging and left. Booked immediately, but
    /// promotion of the next queue head is deferred to this station's next
    /// `step` so it runs in the orchestrator's designated phase.
    pub fn handle_departure(&mut self, station_id: StationId, vehicle_id: VehicleId) {
        if let Some(idx) = self.station_index(station_id) {
            self.stations[idx].depart(vehicle_id);
        }
        self.pending_promotions.push(station_id);
    }

    /// Run one orchestrator step: drain inbound messages, process queue
    /// promotions, resolve counter-proposals, run the assignment pass, and
    /// emit every outbound message this produces.
    pub fn step(&mut self, tick: Tick, bus: &mut MessageBus, params: &OrchestratorParams) {
        let mut inbound = bus.drain(Endpoint::Orchestrator);
        inbound.extend(self.deferred.drain(..));

        for message in &inbound {
            if let Message::StatusUpdate {
                vehicle_id,
                coord,
                battery,
                state,
                ..
            } = *message
            {
                let record = self
                    .records
                    .entry(vehicle_id)
                    .or_insert_with(|| VehicleRecord::new(coord, battery, state));
                record.coord = coord;
                record.battery = battery;
                if state == VehicleStatus::Waiting {
                    record.ticks_waited += 1;
                } else {
                    record.ticks_waited = 0;
                }
                record.state = state;
            }
        }

        self.process_promotions(bus);

        let mut proposals: Vec<(VehicleId, StationId, ProposalTarget, f32)> = inbound
            .iter()
            .filter_map(|m| match *m {
                Message::CounterProposal {
                    vehicle_id,
                    current_station,
                    proposed,
                    urgency,
                    ..
                } => Some((vehicle_id, current_station, proposed, urgency)),
                _ => None,
            })
            .collect();
        proposals.sort_by_key(|&(sender, current_station, proposed, _)| {
            let target = match proposed {
                ProposalTarget::QueuePos(_) => current_station,
                ProposalTarget::Station(s) => s,
            };
            (sender, target)
        });

        let mut decided_this_tick = std::collections::HashSet::new();
        for (sender, current_station, proposed, sender_urgency) in proposals {
            if decided_this_tick.contains(&sender) {
                self.deferred.push(Message::CounterProposal {
                    vehicle_id: sender,
                    current_station,
                    proposed,
                    reason: "deferred: one accepted counter-proposal per tick".to_string(),
                    urgency: sender_urgency,
                });
                continue;
            }
            self.resolve_proposal(sender, current_station, proposed, sender_urgency, params, bus);
            decided_this_tick.insert(sender);
        }

        self.run_assignment(tick, bus, params);
    }

    fn process_promotions(&mut self, bus: &mut MessageBus) {
        let stations: Vec<StationId> = self.pending_promotions.drain(..).collect();
        for station_id in stations {
            let Some(idx) = self.station_index(station_id) else {
                continue;
            };
            let station = &self.stations[idx];
            let updates: Vec<(VehicleId, u32)> = station.renumbered_queue().collect();
            for (vehicle_id, queue_pos) in updates {
                if let Some(record) = self.records.get_mut(&vehicle_id) {
                    record.assigned_station = Some(station_id);
                }
                bus.send(
                    Endpoint::Orchestrator,
                    Endpoint::Vehicle(vehicle_id),
                    Message::Assignment {
                        vehicle_id,
                        station_id,
                        station_coord: station.coord,
                        queue_pos,
                        priority: queue_pos,
                    },
                );
            }
        }
    }

    fn resolve_proposal(
        &mut self,
        sender: VehicleId,
        current_station: StationId,
        proposed: ProposalTarget,
        sender_urgency: f32,
        params: &OrchestratorParams,
        bus: &mut MessageBus,
    ) {
        match proposed {
            ProposalTarget::QueuePos(target_pos) => {
                self.resolve_same_station_swap(sender, current_station, target_pos, sender_urgency, params, bus)
            }
            ProposalTarget::Station(target_station) => {
                self.resolve_station_switch(sender, current_station, target_station, params, bus)
            }
        }
    }

    fn resolve_same_station_swap(
        &mut self,
        sender: VehicleId,
        station_id: StationId,
        target_pos: u32,
        sender_urgency: f32,
        params: &OrchestratorParams,
        bus: &mut MessageBus,
    ) {
        let Some(idx) = self.station_index(station_id) else {
            self.send_decision(bus, sender, false, None);
            return;
        };
        let occupant_count = self.stations[idx].occupants.len() as u32;
        let queue_index = target_pos.checked_sub(occupant_count);
        let holder = queue_index.and_then(|i| self.stations[idx].queue.get(i as usize).copied());
        let (Some(holder), Some(queue_index)) = (holder, queue_index) else {
            self.send_decision(bus, sender, false, None);
            return;
        };
        if holder == sender {
            self.send_decision(bus, sender, false, None);
            return;
        }

        let holder_urgency = self
            .records
            .get(&holder)
            .map(|r| urgency(r.battery, r.ticks_waited, params.low_threshold))
            .unwrap_or(0.0);

        if sender_urgency - holder_urgency >= params.epsilon {
            let sender_index = self.stations[idx]
                .queue
                .iter()
                .position(|&v| v == sender);
            let Some(sender_index) = sender_index else {
                self.send_decision(bus, sender, false, None);
                return;
            };
            self.stations[idx].swap_queue_positions(sender_index, queue_index as usize);

            let sender_pos = occupant_count + queue_index;
            let holder_pos = occupant_count + sender_index as u32;
            let station_coord = self.stations[idx].coord;

            if let Some(record) = self.records.get_mut(&sender) {
                record.assigned_station = Some(station_id);
            }
            if let Some(record) = self.records.get_mut(&holder) {
                record.assigned_station = Some(station_id);
            }

            self.send_decision(bus, sender, true, Some((station_id, sender_pos)));
            bus.send(
                Endpoint::Orchestrator,
                Endpoint::Vehicle(holder),
                Message::Assignment {
                    vehicle_id: holder,
                    station_id,
                    station_coord,
                    queue_pos: holder_pos,
                    priority: holder_pos,
                },
            );
        } else {
            self.send_decision(bus, sender, false, None);
        }
    }

    fn resolve_station_switch(
        &mut self,
        sender: VehicleId,
        current_station: StationId,
        target_station: StationId,
        params: &OrchestratorParams,
        bus: &mut MessageBus,
    ) {
        let (Some(cur_idx), Some(tgt_idx)) = (
            self.station_index(current_station),
            self.station_index(target_station),
        ) else {
            self.send_decision(bus, sender, false, None);
            return;
        };
        let Some(sender_record) = self.records.get(&sender).cloned() else {
            self.send_decision(bus, sender, false, None);
            return;
        };

        let partner = self.stations[tgt_idx]
            .queue_head()
            .or_else(|| self.stations[tgt_idx].occupants.first().copied());

        let current_cost = |vehicle: &VehicleRecord, station_idx: usize| -> f64 {
            let input = VehicleCostInput {
                id: sender,
                coord: vehicle.coord,
                battery: vehicle.battery,
            };
            let station = StationCostInput {
                id: self.stations[station_idx].id,
                coord: self.stations[station_idx].coord,
                load: self.stations[station_idx].load(),
            };
            let matrix = build_cost_matrix(&[input], &[station], params.weights);
            matrix[0][0]
        };

        let Some(partner) = partner else {
            // Free slot at the target with no one to swap against: accept
            // outright if it's strictly cheaper than staying put.
            let before = current_cost(&sender_record, cur_idx);
            let after = current_cost(&sender_record, tgt_idx);
            if after < before {
                self.reassign(sender, current_station, target_station, bus);
            } else {
                self.send_decision(bus, sender, false, None);
            }
            return;
        };
        if partner == sender {
            self.send_decision(bus, sender, false, None);
            return;
        }
        let Some(partner_record) = self.records.get(&partner).cloned() else {
            self.send_decision(bus, sender, false, None);
            return;
        };

        let before = current_cost(&sender_record, cur_idx) + current_cost(&partner_record, tgt_idx);
        let after = current_cost(&sender_record, tgt_idx) + current_cost(&partner_record, cur_idx);

        if after < before {
            self.reassign(sender, current_station, target_station, bus);
            self.reassign(partner, target_station, current_station, bus);
        } else {
            self.send_decision(bus, sender, false, None);
        }
    }

    /// Move `vehicle` out of `from`'s queue/occupants and into `to`'s queue,
    /// emitting the decision (for the proposer) or a fresh `Assignment` (for
    /// the displaced partner).
    fn reassign(&mut self, vehicle: VehicleId, from: StationId, to: StationId, bus: &mut MessageBus) {
        if let Some(idx) = self.station_index(from) {
            self.stations[idx].depart(vehicle);
            self.stations[idx].queue.retain(|&v| v != vehicle);
        }
        let (queue_pos, station_coord) = if let Some(idx) = self.station_index(to) {
            let pos = self.stations[idx].admit(vehicle);
            (pos, self.stations[idx].coord)
        } else {
            (0, Coord::new(0, 0))
        };
        if let Some(record) = self.records.get_mut(&vehicle) {
            record.assigned_station = Some(to);
        }
        bus.send(
            Endpoint::Orchestrator,
            Endpoint::Vehicle(vehicle),
            Message::Assignment {
                vehicle_id: vehicle,
                station_id: to,
                station_coord,
                queue_pos,
                priority: queue_pos,
            },
        );
    }

    fn send_decision(
        &self,
        bus: &mut MessageBus,
        vehicle_id: VehicleId,
        accepted: bool,
        new_assignment: Option<(StationId, u32)>,
    ) {
        bus.send(
            Endpoint::Orchestrator,
            Endpoint::Vehicle(vehicle_id),
            Message::AssignmentDecision {
                vehicle_id,
                accepted,
                new_assignment,
            },
        );
    }

    /// Run the §4.6 Hungarian assignment pass over every vehicle that needs
    /// a (re)assignment this tick.
    fn run_assignment(&mut self, _tick: Tick, bus: &mut MessageBus, params: &OrchestratorParams) {
        let cap = params.queue_cap;
        let over_cap_indices: Vec<usize> = self
            .stations
            .iter()
            .enumerate()
            .filter(|(_, s)| cap.is_some_and(|c| s.load() as u32 >= s.capacity + c))
            .map(|(idx, _)| idx)
            .collect();
        for idx in over_cap_indices {
            let evicted: Vec<VehicleId> = self.stations[idx].queue.clone();
            for vehicle_id in evicted {
                if let Some(record) = self.records.get_mut(&vehicle_id) {
                    record.assigned_station = None;
                }
            }
            self.stations[idx].queue.clear();
        }

        let mut pending: Vec<VehicleId> = self
            .records
            .iter()
            .filter(|(_, r)| {
                r.assigned_station.is_none()
                    && matches!(r.state, VehicleStatus::Waiting | VehicleStatus::Moving)
            })
            .map(|(&id, _)| id)
            .collect();
        pending.sort();
        if pending.is_empty() {
            return;
        }

        let vehicles: Vec<VehicleCostInput> = pending
            .iter()
            .map(|&id| {
                let r = &self.records[&id];
                VehicleCostInput {
                    id,
                    coord: r.coord,
                    battery: r.battery,
                }
            })
            .collect();

        let mut eligible: Vec<(usize, StationCostInput)> = self
            .stations
            .iter()
            .enumerate()
            .filter(|(_, s)| !cap.is_some_and(|c| s.load() as u32 >= s.capacity + c))
            .map(|(i, s)| {
                (
                    i,
                    StationCostInput {
                        id: s.id,
                        coord: s.coord,
                        load: s.load(),
                    },
                )
            })
            .collect();
        eligible.sort_by_key(|(_, s)| s.id);
        if eligible.is_empty() {
            return;
        }

        let stations: Vec<StationCostInput> = eligible.iter().map(|(_, s)| *s).collect();
        let matrix = build_cost_matrix(&vehicles, &stations, params.weights);
        let assignment = hungarian::solve(&matrix);

        for (row, &col) in assignment.iter().enumerate() {
            if row >= pending.len() {
                continue; // a virtual vehicle row, added only to square the matrix
            }
            if col >= stations.len() {
                continue; // matched a virtual padding column: keep prior state
            }
            let vehicle_id = pending[row];
            let (station_idx, _) = eligible[col];
            let queue_pos = self.stations[station_idx].admit(vehicle_id);
            let station_coord = self.stations[station_idx].coord;
            let station_id = self.stations[station_idx].id;

            if let Some(record) = self.records.get_mut(&vehicle_id) {
                record.assigned_station = Some(station_id);
            }
            bus.send(
                Endpoint::Orchestrator,
                Endpoint::Vehicle(vehicle_id),
                Message::Assignment {
                    vehicle_id,
                    station_id,
                    station_coord,
                    queue_pos,
                    priority: queue_pos,
                },
            );
        }
    }
}
