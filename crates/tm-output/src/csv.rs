//! CSV output backend.
//!
//! Creates three files in the configured output directory:
//! - `tick_stats.csv`
//! - `occupancy.csv`
//! - `anomalies.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;
use tm_agents::Anomaly;

use crate::writer::OutputWriter;
use crate::{AnomalyRow, OccupancyRow, OutputResult, TickStatsRow};

/// Writes simulation output to three CSV files.
pub struct CsvWriter {
    tick_stats: Writer<File>,
    occupancy:  Writer<File>,
    anomalies:  Writer<File>,
    finished:   bool,
}

impl CsvWriter {
    /// Open (or create) the CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;

        let mut tick_stats = Writer::from_path(dir.join("tick_stats.csv"))?;
        tick_stats.write_record([
            "tick",
            "arrived",
            "vehicles",
            "total_waiting_time",
            "total_travel_time",
            "congestion_events",
            "incidents",
        ])?;

        let mut occupancy = Writer::from_path(dir.join("occupancy.csv"))?;
        occupancy.write_record(["tick", "x", "y", "agent", "kind", "status"])?;

        let mut anomalies = Writer::from_path(dir.join("anomalies.csv"))?;
        anomalies.write_record(["tick", "kind", "x", "y", "reporter", "severity", "vehicle", "waiting_time"])?;

        Ok(Self {
            tick_stats,
            occupancy,
            anomalies,
            finished: false,
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_tick_stats(&mut self, row: &TickStatsRow) -> OutputResult<()> {
        self.tick_stats.write_record(&[
            row.tick.to_string(),
            row.arrived.to_string(),
            row.vehicles.to_string(),
            row.total_waiting_time.to_string(),
            row.total_travel_time.to_string(),
            row.congestion_events.to_string(),
            row.incidents.to_string(),
        ])?;
        Ok(())
    }

    fn write_occupancy(&mut self, rows: &[OccupancyRow]) -> OutputResult<()> {
        for row in rows {
            self.occupancy.write_record(&[
                row.tick.to_string(),
                row.cell.x.to_string(),
                row.cell.y.to_string(),
                row.agent.to_string(),
                row.agent.kind().as_str().to_string(),
                row.status.as_str().to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_anomaly(&mut self, row: &AnomalyRow) -> OutputResult<()> {
        let a = &row.anomaly;
        // Columns that do not apply to the anomaly kind stay empty.
        let (severity, vehicle, waiting) = match *a {
            Anomaly::Congestion { severity, .. } => (severity.to_string(), String::new(), String::new()),
            Anomaly::Incident { vehicle, waiting_time, .. } => {
                (String::new(), vehicle.to_string(), waiting_time.to_string())
            }
        };
        self.anomalies.write_record(&[
            row.tick.to_string(),
            a.kind().as_str().to_string(),
            a.cell().x.to_string(),
            a.cell().y.to_string(),
            a.reporter().to_string(),
            severity,
            vehicle,
            waiting,
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.tick_stats.flush()?;
        self.occupancy.flush()?;
        self.anomalies.flush()?;
        Ok(())
    }
}
