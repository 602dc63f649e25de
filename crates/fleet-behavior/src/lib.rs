//! `fleet-behavior` — the tit-for-tat behavioral layer.
//!
//! # Crate layout
//!
//! | Module       | Contents                                  |
//! |--------------|---------------------------------------------|
//! | [`decision`] | `decide` — the tagged-dispatch decision fn |
//! | [`error`]    | `BehaviorError`, `BehaviorResult<T>`       |
//!
//! `BehaviorKind`, `Action`, `Decision`, and `History` themselves live in
//! `fleet-vehicle` (this crate depends on it, not the other way around) and
//! are re-exported here for convenience.

pub mod decision;
pub mod error;


pub use decision::decide;
pub use error::{BehaviorError, BehaviorResult};
pub use fleet_vehicle::{Action, BehaviorKind, Decision, History};
