//! The `OutputWriter` trait implemented by all backend writers.

use crate::{AnomalyRow, OccupancyRow, OutputResult, TickStatsRow};

/// Sink for simulation output rows.
///
/// Errors are returned to the caller; [`SimOutputObserver`][crate::SimOutputObserver]
/// stores the first one for retrieval with `take_error`.
pub trait OutputWriter {
    /// Write one tick's statistics row.
    fn write_tick_stats(&mut self, row: &TickStatsRow) -> OutputResult<()>;

    /// Write a batch of occupancy rows for one snapshot tick.
    fn write_occupancy(&mut self, rows: &[OccupancyRow]) -> OutputResult<()>;

    fn write_anomaly(&mut self, row: &AnomalyRow) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}
