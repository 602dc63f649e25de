//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `vehicle_snapshots.csv`
//! - `station_snapshots.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::row::{StationTickRow, VehicleTickRow};
use crate::writer::OutputWriter;
use crate::OutputResult;

/// Writes simulation output to two CSV files.
pub struct CsvWriter {
    vehicles: Writer<File>,
    stations: Writer<File>,
    finished: bool,
}

impl CsvWriter {
    /// Open (or create) the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut vehicles = Writer::from_path(dir.join("vehicle_snapshots.csv"))?;
        vehicles.write_record([
            "tick",
            "vehicle_id",
            "x",
            "y",
            "battery",
            "state",
            "station_id",
            "queue_pos",
        ])?;

        let mut stations = Writer::from_path(dir.join("station_snapshots.csv"))?;
        stations.write_record([
            "tick",
            "station_id",
            "x",
            "y",
            "capacity",
            "occupant_count",
            "queue_len",
        ])?;

        Ok(Self {
            vehicles,
            stations,
            finished: false,
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_vehicle_rows(&mut self, rows: &[VehicleTickRow]) -> OutputResult<()> {
        for row in rows {
            self.vehicles.write_record(&[
                row.tick.to_string(),
                row.vehicle_id.to_string(),
                row.x.to_string(),
                row.y.to_string(),
                row.battery.to_string(),
                row.state.clone(),
                row.station_id.to_string(),
                row.queue_pos.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_station_rows(&mut self, rows: &[StationTickRow]) -> OutputResult<()> {
        for row in rows {
            self.stations.write_record(&[
                row.tick.to_string(),
                row.station_id.to_string(),
                row.x.to_string(),
                row.y.to_string(),
                row.capacity.to_string(),
                row.occupant_count.to_string(),
                row.queue_len.to_string(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.vehicles.flush()?;
        self.stations.flush()?;
        Ok(())
    }
}
