//! `fleet-grid` — static environment, A* planner, and the spatio-temporal
//! reservation table vehicles use to avoid colliding in the future.
//!
//! # Crate layout
//!
//! | Module         | Contents                                          |
//! |----------------|----------------------------------------------------|
//! | [`cell`]       | `Cell` (Empty/Obstacle/Station/Exit)              |
//! | [`grid`]       | `Grid`, `GridBuilder::from_ascii_map`             |
//! | [`planner`]    | `plan` — 4-connected A*                           |
//! | [`reservation`]| `ReservationTable`                                |
//! | [`error`]      | `GridError`, `GridResult<T>`                      |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                              |
//! |---------|------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on `Cell`.        |

pub mod cell;
pub mod error;
pub mod grid;
pub mod planner;
pub mod reservation;


pub use cell::Cell;
pub use error::{GridError, GridResult};
pub use grid::{Grid, GridBuilder, NEIGHBOR_ORDER};
pub use planner::plan;
pub use reservation::ReservationTable;
