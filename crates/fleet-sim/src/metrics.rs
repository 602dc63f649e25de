//! Per-run metrics aggregation (spec §6 "Metrics").
//!
//! Collected incrementally, once per tick, rather than recomputed from a
//! stored history — the run only ever needs the running totals, never the
//! intermediate snapshots.

use fleet_orchestrator::ChargingStation;
use fleet_vehicle::BehaviorKind;

/// Index a `BehaviorKind` into a fixed 4-slot counter array without requiring
/// `Hash` on the upstream enum.
fn behavior_index(kind: BehaviorKind) -> usize {
    match kind {
        BehaviorKind::None => 0,
        BehaviorKind::Cooperative => 1,
        BehaviorKind::Competitive => 2,
        BehaviorKind::TitForTat => 3,
    }
}

const BEHAVIOR_COUNT: usize = 4;
const BEHAVIOR_NAMES: [&str; BEHAVIOR_COUNT] = ["none", "cooperative", "competitive", "tit_for_tat"];

#[derive(Clone, Debug, Default, serde::Serialize)]
pub struct BehaviorTally {
    pub behavior: &'static str,
    pub accepted: u32,
    pub rejected: u32,
}

#[derive(Clone, Debug, serde::Serialize)]
pub struct StationMetrics {
    pub utilization: f64,
    pub peak_queue_length: u32,
}

#[derive(Clone, Debug, serde::Serialize)]
pub struct Metrics {
    total_ticks: u32,
    station_occupied_ticks: Vec<u32>,
    station_peak_queue: Vec<u32>,
    collision_yields_averted: u32,
    counter_proposals: u32,
    accepted_by_behavior: [u32; BEHAVIOR_COUNT],
    rejected_by_behavior: [u32; BEHAVIOR_COUNT],
}

impl Metrics {
    pub fn new(station_count: usize) -> Self {
        Self {
            total_ticks: 0,
            station_occupied_ticks: vec![0; station_count],
            station_peak_queue: vec![0; station_count],
            collision_yields_averted: 0,
            counter_proposals: 0,
            accepted_by_behavior: [0; BEHAVIOR_COUNT],
            rejected_by_behavior: [0; BEHAVIOR_COUNT],
        }
    }

    pub fn record_tick(&mut self, stations: &[ChargingStation]) {
        self.total_ticks += 1;
        for (i, station) in stations.iter().enumerate() {
            if !station.occupants.is_empty() {
                self.station_occupied_ticks[i] += 1;
            }
            let queue_len = station.queue.len() as u32;
            if queue_len > self.station_peak_queue[i] {
                self.station_peak_queue[i] = queue_len;
            }
        }
    }

    pub fn record_collision_yield(&mut self) {
        self.collision_yields_averted += 1;
    }

    pub fn record_counter_proposal(&mut self) {
        self.counter_proposals += 1;
    }

    pub fn record_decision(&mut self, behavior: BehaviorKind, accepted: bool) {
        let idx = behavior_index(behavior);
        if accepted {
            self.accepted_by_behavior[idx] += 1;
        } else {
            self.rejected_by_behavior[idx] += 1;
        }
    }

    pub fn per_station(&self) -> Vec<StationMetrics> {
        self.station_occupied_ticks
            .iter()
            .zip(&self.station_peak_queue)
            .map(|(&occupied, &peak)| StationMetrics {
                utilization: if self.total_ticks == 0 {
                    0.0
                } else {
                    occupied as f64 / self.total_ticks as f64
                },
                peak_queue_length: peak,
            })
            .collect()
    }

    pub fn behavior_tallies(&self) -> Vec<BehaviorTally> {
        (0..BEHAVIOR_COUNT)
            .map(|i| BehaviorTally {
                behavior: BEHAVIOR_NAMES[i],
                accepted: self.accepted_by_behavior[i],
                rejected: self.rejected_by_behavior[i],
            })
            .collect()
    }

    pub fn total_ticks(&self) -> u32 {
        self.total_ticks
    }

    pub fn collision_yields_averted(&self) -> u32 {
        self.collision_yields_averted
    }

    pub fn counter_proposals(&self) -> u32 {
        self.counter_proposals
    }
}

/// Jain's fairness index over a set of per-vehicle values (spec §6: "fairness
/// index (e.g., Jain over ticks-to-complete)"). `1.0` is maximally fair (all
/// equal); `1/n` is maximally unfair. Defined as `1.0` for zero or one value,
/// since fairness is undefined with nothing to compare.
pub fn jain_fairness_index(values: &[f64]) -> f64 {
    let n = values.len();
    if n <= 1 {
        return 1.0;
    }
    let sum: f64 = values.iter().sum();
    let sum_sq: f64 = values.iter().map(|v| v * v).sum();
    if sum_sq == 0.0 {
        return 1.0;
    }
    (sum * sum) / (n as f64 * sum_sq)
}
