//! `SimOutputObserver<W>` — bridges `fleet_sim::SimObserver` to an
//! `OutputWriter`.

use fleet_core::Tick;
use fleet_sim::{Snapshot, SimObserver};

use crate::row::{StationTickRow, VehicleTickRow};
use crate::writer::OutputWriter;
use crate::OutputError;

/// A [`SimObserver`] that writes vehicle and station snapshots to any
/// [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `SimObserver`
/// methods have no return value. After `sim.run()` returns, check for
/// errors with [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer: W,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            last_error: None,
        }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: crate::OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }

    fn write_snapshot(&mut self, snapshot: &Snapshot) {
        let vehicle_rows: Vec<VehicleTickRow> = snapshot
            .vehicles
            .iter()
            .map(|v| VehicleTickRow {
                tick: snapshot.tick.0,
                vehicle_id: v.id.0,
                x: v.coord.x,
                y: v.coord.y,
                battery: v.battery,
                state: v.state.to_string(),
                station_id: v.station_id.map(|s| s.0 as u32).unwrap_or(u32::MAX),
                queue_pos: v.queue_pos.unwrap_or(u32::MAX),
            })
            .collect();
        if !vehicle_rows.is_empty() {
            let result = self.writer.write_vehicle_rows(&vehicle_rows);
            self.store_err(result);
        }

        let station_rows: Vec<StationTickRow> = snapshot
            .stations
            .iter()
            .map(|s| StationTickRow {
                tick: snapshot.tick.0,
                station_id: s.id.0,
                x: s.coord.x,
                y: s.coord.y,
                capacity: s.capacity,
                occupant_count: s.occupants.len() as u32,
                queue_len: s.queue.len() as u32,
            })
            .collect();
        if !station_rows.is_empty() {
            let result = self.writer.write_station_rows(&station_rows);
            self.store_err(result);
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_start(&mut self, snapshot: &Snapshot) {
        self.write_snapshot(snapshot);
    }

    fn on_tick(&mut self, _tick: Tick, snapshot: &Snapshot) {
        self.write_snapshot(snapshot);
    }

    fn on_finish(&mut self, _snapshot: &Snapshot) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
