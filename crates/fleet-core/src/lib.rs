//! `fleet-core` — foundational types shared by every `fleet-*` crate.
//!
//! This crate intentionally has no `fleet-*` dependencies and minimal
//! external ones (`rand`, `thiserror`, `tracing`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module   | Contents                                   |
//! |----------|---------------------------------------------|
//! | [`ids`]  | `VehicleId`, `StationId`                    |
//! | [`geo`]  | `Coord`, Manhattan distance                 |
//! | [`time`] | `Tick`                                      |
//! | [`rng`]  | `SimRng` — seeded, used only for the deadlock escape hatch |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                              |
//! |---------|------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types. |

pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use geo::Coord;
pub use ids::{StationId, VehicleId};
pub use rng::SimRng;
pub use time::Tick;
