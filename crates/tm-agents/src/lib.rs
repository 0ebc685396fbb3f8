//! `tm-agents` — the three agent state machines and their inputs.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                        |
//! |--------------|-----------------------------------------------------------------|
//! | [`agent`]    | `Agent` trait: `step(env, rng)` + `snapshot()`                 |
//! | [`env`]      | Read-only per-agent environment views built by the orchestrator |
//! | [`signal`]   | `SignalAgent`: fixed-phase timing with adaptive green time     |
//! | [`vehicle`]  | `VehicleAgent`: path following, light compliance, rerouting    |
//! | [`sentinel`] | `SentinelAgent`: patrol, battery budget, anomaly detection     |
//! | [`anomaly`]  | `Anomaly`, `CongestionReport`                                   |
//! | [`error`]    | `AgentError`, `AgentResult<T>`                                  |
//!
//! # Design notes
//!
//! No agent ever touches another agent.  Everything an agent knows about the
//! rest of the world arrives through its environment view, which the
//! orchestrator assembles from snapshots taken earlier in the tick (or, for
//! congestion, in the previous tick).  `step` is infallible: missing or
//! irrelevant data in a view simply means "nothing to react to".

pub mod agent;
pub mod anomaly;
pub mod env;
pub mod error;
pub mod sentinel;
pub mod signal;
pub mod vehicle;


pub use agent::Agent;
pub use anomaly::{Anomaly, AnomalyKind, CongestionReport};
pub use env::{AxisCounts, SentinelEnv, SignalEnv, VehicleEnv};
pub use error::{AgentError, AgentResult};
pub use sentinel::{PatrolBox, SentinelAgent, SentinelSnapshot};
pub use signal::{SignalAgent, SignalSnapshot};
pub use vehicle::{VehicleAgent, VehicleSnapshot};
