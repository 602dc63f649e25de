//! `fleet-sim` — the tick loop that ties the grid, vehicles, and
//! orchestrator together into a runnable simulation.
//!
//! # Crate layout
//!
//! | Module       | Contents                                               |
//! |--------------|-----------------------------------------------------------|
//! | [`sim`]      | `Sim`, `SimParams`, the C9 stepping model               |
//! | [`scenario`] | `ScenarioConfig`, JSON loading, `build_sim`             |
//! | [`deadlock`] | The deadlock escape hatch (spec §7)                     |
//! | [`metrics`]  | `Metrics`, Jain's fairness index                        |
//! | [`snapshot`] | `Snapshot` — the per-tick visualization output          |
//! | [`observer`] | `SimObserver`, `NoopObserver`                           |
//! | [`builder`]  | `SimBuilder` — fluent direct construction               |
//! | [`error`]    | `SimError`, `SimResult<T>`                              |
//!
//! # Quick start
//!
//! ```no_run
//! use fleet_sim::scenario::load_scenario_json;
//! use fleet_sim::observer::NoopObserver;
//!
//! let json = std::fs::read_to_string("scenario.json").unwrap();
//! let mut sim = load_scenario_json(&json).unwrap();
//! let snapshot = sim.run(&mut NoopObserver);
//! println!("finished at tick {}", snapshot.tick);
//! ```

pub mod builder;
pub mod deadlock;
pub mod error;
pub mod metrics;
pub mod observer;
pub mod scenario;
pub mod sim;
pub mod snapshot;


pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use metrics::{jain_fairness_index, BehaviorTally, Metrics, StationMetrics};
pub use observer::{NoopObserver, SimObserver};
pub use scenario::{build_sim, load_scenario_json, ScenarioConfig};
pub use sim::{RunOutcome, Sim, SimParams};
pub use snapshot::{Snapshot, StationSnapshot, VehicleSnapshot};
