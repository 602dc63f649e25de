//! The `OutputWriter` trait implemented by all backend writers.

use crate::row::{StationTickRow, VehicleTickRow};
use crate::OutputResult;

/// Trait implemented by every output backend.
///
/// All methods are infallible from the observer's perspective — errors are
/// stored internally and retrieved with [`crate::SimOutputObserver::take_error`].
pub trait OutputWriter {
    /// Write a batch of vehicle-tick rows.
    fn write_vehicle_rows(&mut self, rows: &[VehicleTickRow]) -> OutputResult<()>;

    /// Write a batch of station-tick rows.
    fn write_station_rows(&mut self, rows: &[StationTickRow]) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent — safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
