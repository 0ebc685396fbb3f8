//! Agent state-machine labels.
//!
//! The state enums live here rather than next to the agents so the grid
//! read-model (`tm-spatial`) and output writers can record them without
//! depending on `tm-agents`.

use std::fmt;

/// Phase of a traffic signal.  Exactly one is active at a time.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SignalPhase {
    Red,
    Yellow,
    Green,
}

impl SignalPhase {
    pub const ALL: [SignalPhase; 3] = [SignalPhase::Red, SignalPhase::Yellow, SignalPhase::Green];

    pub fn as_str(self) -> &'static str {
        match self {
            SignalPhase::Red => "RED",
            SignalPhase::Yellow => "YELLOW",
            SignalPhase::Green => "GREEN",
        }
    }
}

/// Vehicle state.  `Arrived` is terminal.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VehicleState {
    #[default]
    Moving,
    Waiting,
    Rerouting,
    Arrived,
}

impl VehicleState {
    pub fn as_str(self) -> &'static str {
        match self {
            VehicleState::Moving => "MOVING",
            VehicleState::Waiting => "WAITING",
            VehicleState::Rerouting => "REROUTING",
            VehicleState::Arrived => "ARRIVED",
        }
    }

    #[inline]
    pub fn is_terminal(self) -> bool {
        self == VehicleState::Arrived
    }
}

/// Sentinel (drone) state.
///
/// `Reporting` is never held by the state machine between ticks; it only
/// appears in the snapshot taken in the tick an anomaly was emitted.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SentinelState {
    #[default]
    Patrolling,
    Monitoring,
    Reporting,
    Returning,
}

impl SentinelState {
    pub fn as_str(self) -> &'static str {
        match self {
            SentinelState::Patrolling => "PATROLLING",
            SentinelState::Monitoring => "MONITORING",
            SentinelState::Reporting => "REPORTING",
            SentinelState::Returning => "RETURNING",
        }
    }
}

/// The state of any agent, tagged by kind.  Recorded in grid occupancy.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AgentStatus {
    Signal(SignalPhase),
    Vehicle(VehicleState),
    Sentinel(SentinelState),
}

impl AgentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AgentStatus::Signal(p) => p.as_str(),
            AgentStatus::Vehicle(s) => s.as_str(),
            AgentStatus::Sentinel(s) => s.as_str(),
        }
    }
}

macro_rules! display_as_str {
    ($($t:ty),*) => {$(
        impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    )*};
}

display_as_str!(SignalPhase, VehicleState, SentinelState, AgentStatus);
