//! Simulation observer trait for progress reporting and data collection.

use tm_agents::Anomaly;
use tm_core::Tick;
use tm_spatial::Grid;

use crate::SimStats;

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter { interval: u64 }
///
/// impl SimObserver for ProgressPrinter {
///     fn on_tick_end(&mut self, tick: Tick, stats: &SimStats) {
///         if tick.0 % self.interval == 0 {
///             println!("{tick}: {} of {} arrived", stats.arrived, stats.vehicles);
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any agent steps.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called once per anomaly drained from the bus this tick, in
    /// publication order.
    fn on_anomaly(&mut self, _tick: Tick, _anomaly: &Anomaly) {}

    /// Called at the end of each tick, after statistics are refreshed.
    fn on_tick_end(&mut self, _tick: Tick, _stats: &SimStats) {}

    /// Called at snapshot intervals (every `config.output_interval_ticks`
    /// ticks) with the freshly rebuilt occupancy grid.
    fn on_snapshot(&mut self, _tick: Tick, _grid: &Grid) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_tick: Tick, _stats: &SimStats) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run` but
/// don't want progress callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
