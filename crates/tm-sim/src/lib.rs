//! `tm-sim` — tick loop orchestrator for the rust_tm traffic simulation.
//!
//! # Tick loop
//!
//! ```text
//! for tick in 0..config.total_ticks:
//!   ① Signals    step with nearby axis counts; publish state.
//!   ② Vehicles   step against signal states and last tick's congestion
//!                (parallel with the `parallel` feature); publish state.
//!   ③ Sentinels  step against active vehicles (parallel); publish
//!                anomalies, then state.
//!   ④ Anomalies  drain the anomaly topic into counters and next tick's
//!                congestion view.
//!   ⑤ Grid       rebuild occupancy.
//!   ⑥ Stats      recompute vehicle totals.
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                       |
//! |------------|--------------------------------------------------------------|
//! | `parallel` | Runs the vehicle and sentinel phases on Rayon's thread pool. |
//! | `serde`    | Derives `Serialize`/`Deserialize` on events and statistics.  |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use tm_core::SimConfig;
//! use tm_sim::{NoopObserver, SimBuilder};
//!
//! let mut sim = SimBuilder::new(SimConfig::default()).build()?;
//! sim.run(&mut NoopObserver);
//! println!("{}", sim.stats());
//! ```

pub mod builder;
pub mod error;
pub mod events;
pub mod observer;
pub mod sim;
pub mod stats;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use events::{topics, BusEvent};
pub use observer::{NoopObserver, SimObserver};
pub use sim::Sim;
pub use stats::SimStats;
