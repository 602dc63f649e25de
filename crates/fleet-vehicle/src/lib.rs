//! `fleet-vehicle` — the per-vehicle state machine.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                        |
//! |-------------|------------------------------------------------------------------|
//! | [`history`] | `BehaviorKind`, `Action`, `Decision`, `History` (reciprocity log) |
//! | [`vehicle`] | `Vehicle`, `VehicleParams`, `VehicleEvent`, `Vehicle::step`       |
//! | [`error`]   | `VehicleError`                                                    |
//!
//! A vehicle never mutates station state directly — it reports
//! [`VehicleEvent`]s and leaves the caller (the stepping model, which owns
//! both vehicles and stations) to apply the cross-cutting update.

pub mod error;
pub mod history;
pub mod vehicle;

#[cfg(test)]
mod tests;

pub use error::{VehicleError, VehicleResult};
pub use history::{Action, BehaviorKind, Decision, History};
pub use vehicle::{Vehicle, VehicleEvent, VehicleParams};

pub use fleet_messages::VehicleStatus;
