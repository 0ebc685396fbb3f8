//! `tm-core` — foundational types for the `rust_tm` traffic simulation.
//!
//! This crate is a dependency of every other `tm-*` crate.  It has no `tm-*`
//! dependencies and minimal external ones (only `rand` and `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                   |
//! |-----------------|------------------------------------------------------------|
//! | [`cell`]        | `Cell`, `Axis`, grid bounds helpers                        |
//! | [`ids`]         | `SignalId`, `VehicleId`, `SentinelId`, `AgentRef`          |
//! | [`state`]       | `SignalPhase`, `VehicleState`, `SentinelState`, `AgentStatus` |
//! | [`time`]        | `Tick`, `SimClock`                                         |
//! | [`config`]      | `SimConfig`, `SignalTiming`, `SentinelParams`              |
//! | [`rng`]         | `AgentRng` (per-agent), `SimRng` (setup)                   |
//! | [`error`]       | `CoreError`, `CoreResult`                                  |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod cell;
pub mod config;
pub mod error;
pub mod ids;
pub mod rng;
pub mod state;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use cell::{Axis, Cell};
pub use config::{SentinelParams, SignalTiming, SimConfig};
pub use error::{CoreError, CoreResult};
pub use ids::{AgentKind, AgentRef, SentinelId, SignalId, VehicleId};
pub use rng::{AgentRng, SimRng};
pub use state::{AgentStatus, SentinelState, SignalPhase, VehicleState};
pub use time::{SimClock, Tick};
