//! `SimOutputObserver<W>` — bridges `SimObserver` to an `OutputWriter`.

use tm_agents::Anomaly;
use tm_core::Tick;
use tm_sim::{SimObserver, SimStats};
use tm_spatial::Grid;
use tracing::warn;

use crate::row::{AnomalyRow, OccupancyRow, TickStatsRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes tick statistics, occupancy snapshots and
/// anomalies to any [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:     W,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None }
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

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                warn!(error = %e, "output write failed");
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_anomaly(&mut self, tick: Tick, anomaly: &Anomaly) {
        let row = AnomalyRow { tick: tick.0, anomaly: *anomaly };
        let result = self.writer.write_anomaly(&row);
        self.store_err(result);
    }

    fn on_tick_end(&mut self, tick: Tick, stats: &SimStats) {
        let result = self.writer.write_tick_stats(&TickStatsRow::new(tick.0, stats));
        self.store_err(result);
    }

    fn on_snapshot(&mut self, tick: Tick, grid: &Grid) {
        let rows: Vec<OccupancyRow> = grid
            .cells()
            .flat_map(|(cell, occupants)| {
                occupants.iter().map(move |o| OccupancyRow {
                    tick: tick.0,
                    agent: o.agent,
                    cell,
                    status: o.status,
                })
            })
            .collect();

        if !rows.is_empty() {
            let result = self.writer.write_occupancy(&rows);
            self.store_err(result);
        }
    }

    fn on_sim_end(&mut self, _final_tick: Tick, _stats: &SimStats) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
