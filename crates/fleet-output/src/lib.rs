//! `fleet-output` — CSV persistence for per-tick vehicle and station
//! snapshots.
//!
//! | Backend | Files created                                              |
//! |---------|-------------------------------------------------------------|
//! | CSV     | `vehicle_snapshots.csv`, `station_snapshots.csv`           |
//!
//! Driven by [`SimOutputObserver`], which implements `fleet_sim::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use fleet_output::{CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output")).unwrap();
//! let mut obs = SimOutputObserver::new(writer);
//! sim.run(&mut obs);
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(test)]
mod tests;

pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use row::{StationTickRow, VehicleTickRow};
pub use writer::OutputWriter;
