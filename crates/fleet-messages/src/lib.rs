//! `fleet-messages` — the typed message bus connecting vehicles to the
//! orchestrator within a single tick.
//!
//! # Crate layout
//!
//! | Module     | Contents                                            |
//! |------------|------------------------------------------------------|
//! | [`message`]| `Message`, `ProposalTarget`                         |
//! | [`status`] | `VehicleStatus`                                     |
//! | [`bus`]    | `MessageBus`, `Endpoint`                            |
//!
//! No messages are ever serialized — everything here is in-process,
//! drained and discarded within the tick it was emitted.

pub mod bus;
pub mod message;
pub mod status;

#[cfg(test)]
mod tests;

pub use bus::{Endpoint, MessageBus};
pub use message::{Message, ProposalTarget};
pub use status::VehicleStatus;
