//! `fleet-orchestrator` — Hungarian assignment, queue admission, and
//! tit-for-tat counter-proposal negotiation.
//!
//! # Crate layout
//!
//! | Module          | Contents                                              |
//! |-----------------|--------------------------------------------------------|
//! | [`station`]     | `ChargingStation` (occupants, queue, admission)        |
//! | [`cost`]        | The assignment cost matrix and its weights             |
//! | [`hungarian`]   | The minimum-cost bipartite matching solver             |
//! | [`negotiation`] | `Orchestrator` — assignment runs, promotion, proposals |
//! | [`error`]       | `OrchestratorError`, `OrchestratorResult<T>`           |
//!
//! # Assignment model (summary)
//!
//! Each step, every `Waiting` (or assignment-less `Moving`) vehicle is a row
//! and every station under its queue cap is a column in a cost matrix
//! weighted by distance, battery deficit, and station load. The Hungarian
//! solver resolves it to a minimum-cost bijection; padding columns absorb any
//! excess vehicles so unmatched ones keep their prior assignment. Queue
//! promotion and counter-proposal negotiation run in the same step, after
//! the assignment pass's inputs are drained but before its output is sent.

pub mod cost;
pub mod error;
pub mod hungarian;
pub mod negotiation;
pub mod station;

#[cfg(test)]
mod tests;

pub use cost::{build_cost_matrix, CostWeights, StationCostInput, VehicleCostInput, VIRTUAL_COST};
pub use error::{OrchestratorError, OrchestratorResult};
pub use negotiation::{Orchestrator, OrchestratorParams};
pub use station::ChargingStation;
