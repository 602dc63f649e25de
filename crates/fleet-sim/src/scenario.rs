//! Scenario configuration loading (spec §6 "Scenario configuration").
//!
//! A scenario is one JSON document: the grid, station capacities, the
//! vehicle roster, the tunable parameters, and a few metadata fields used
//! only as a test oracle (`expected_outcome`).

use serde::Deserialize;

use fleet_core::Coord;
use fleet_grid::GridBuilder;
use fleet_vehicle::BehaviorKind;

use crate::error::{SimError, SimResult};
use crate::sim::{Sim, SimParams};

#[derive(Debug, Deserialize)]
pub struct VehicleConfig {
    pub start_coord: Coord,
    pub initial_battery: f32,
    #[serde(default)]
    pub behavior: BehaviorKind,
}

#[derive(Debug, Deserialize)]
pub struct ParamsConfig {
    pub drain_per_step: f32,
    pub charge_per_step: f32,
    pub low_threshold: f32,
    pub charge_target: f32,
    #[serde(default = "default_w_d")]
    pub w_d: f64,
    #[serde(default = "default_w_b")]
    pub w_b: f64,
    #[serde(default = "default_w_l")]
    pub w_l: f64,
    pub max_steps: u64,
    #[serde(default)]
    pub queue_cap: Option<u32>,
    #[serde(default = "default_epsilon")]
    pub epsilon: f32,
    #[serde(default = "default_deadlock_ticks")]
    pub deadlock_ticks: u32,
    #[serde(default)]
    pub seed: u64,
}

fn default_w_d() -> f64 {
    1.0
}
fn default_w_b() -> f64 {
    2.0
}
fn default_w_l() -> f64 {
    0.5
}
fn default_epsilon() -> f32 {
    0.05
}
fn default_deadlock_ticks() -> u32 {
    10
}

impl From<&ParamsConfig> for SimParams {
    fn from(p: &ParamsConfig) -> Self {
        SimParams {
            drain_per_step: p.drain_per_step,
            charge_per_step: p.charge_per_step,
            low_threshold: p.low_threshold,
            charge_target: p.charge_target,
            w_d: p.w_d,
            w_b: p.w_b,
            w_l: p.w_l,
            max_steps: p.max_steps,
            queue_cap: p.queue_cap,
            epsilon: p.epsilon,
            deadlock_ticks: p.deadlock_ticks,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct ScenarioMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub expected_outcome: String,
}

#[derive(Debug, Deserialize)]
pub struct ScenarioConfig {
    /// One string per grid row, top row first.
    pub grid: Vec<String>,
    pub exit: Coord,
    /// Capacity of station `n` at index `n`.
    pub station_capacities: Vec<u32>,
    pub vehicles: Vec<VehicleConfig>,
    pub params: ParamsConfig,
    #[serde(default)]
    pub meta: ScenarioMeta,
}

/// Parse a scenario from a JSON string.
pub fn parse_scenario(json: &str) -> SimResult<ScenarioConfig> {
    serde_json::from_str(json).map_err(|e| SimError::Config(format!("malformed scenario: {e}")))
}

/// Build a runnable [`Sim`] from a parsed scenario.
pub fn build_sim(config: &ScenarioConfig) -> SimResult<Sim> {
    let rows: Vec<&str> = config.grid.iter().map(String::as_str).collect();
    let grid = GridBuilder::from_ascii_map(&rows, config.exit)?;

    let vehicles: Vec<(Coord, f32, BehaviorKind)> = config
        .vehicles
        .iter()
        .map(|v| (v.start_coord, v.initial_battery, v.behavior))
        .collect();

    let params = SimParams::from(&config.params);
    Sim::new(grid, config.station_capacities.clone(), vehicles, params, config.params.seed)
}

/// Parse and build in one step — the common case for a CLI or test fixture.
pub fn load_scenario_json(json: &str) -> SimResult<Sim> {
    let config = parse_scenario(json)?;
    build_sim(&config)
}
