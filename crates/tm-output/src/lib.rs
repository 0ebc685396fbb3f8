//! `tm-output` — simulation output writers for the rust_tm traffic simulation.
//!
//! The CSV backend creates three files in the output directory:
//!
//! | File             | One row per                                   |
//! |------------------|-----------------------------------------------|
//! | `tick_stats.csv` | tick                                          |
//! | `occupancy.csv`  | occupant of a cell at each snapshot tick      |
//! | `anomalies.csv`  | congestion report or incident drained per tick |
//!
//! Backends implement [`OutputWriter`] and are driven by
//! [`SimOutputObserver`], which implements `tm_sim::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use tm_output::{CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
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
pub use row::{AnomalyRow, OccupancyRow, TickStatsRow};
pub use writer::OutputWriter;
