//! Anomaly records emitted by sentinels.
//!
//! Anomalies are ephemeral: queued by a sentinel during its `step`, published
//! once on the bus, drained by the orchestrator in the same tick.

use std::fmt;

use tm_core::{Cell, SentinelId, VehicleId};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnomalyKind {
    Congestion,
    Incident,
}

impl AnomalyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AnomalyKind::Congestion => "congestion",
            AnomalyKind::Incident => "incident",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Anomaly {
    /// More than three vehicles close to the sentinel.
    Congestion {
        reporter: SentinelId,
        cell:     Cell,
        vehicles: usize,
        /// `min(10, vehicles)`.
        severity: u8,
    },
    /// A vehicle has been waiting for more than ten ticks.
    Incident {
        reporter:     SentinelId,
        cell:         Cell,
        vehicle:      VehicleId,
        waiting_time: u32,
    },
}

impl Anomaly {
    pub fn kind(&self) -> AnomalyKind {
        match self {
            Anomaly::Congestion { .. } => AnomalyKind::Congestion,
            Anomaly::Incident { .. } => AnomalyKind::Incident,
        }
    }

    pub fn cell(&self) -> Cell {
        match *self {
            Anomaly::Congestion { cell, .. } | Anomaly::Incident { cell, .. } => cell,
        }
    }

    pub fn reporter(&self) -> SentinelId {
        match *self {
            Anomaly::Congestion { reporter, .. } | Anomaly::Incident { reporter, .. } => reporter,
        }
    }

    /// The congestion view vehicles consume, or `None` for incidents.
    pub fn as_congestion(&self) -> Option<CongestionReport> {
        match *self {
            Anomaly::Congestion { cell, severity, .. } => Some(CongestionReport { cell, severity }),
            Anomaly::Incident { .. } => None,
        }
    }
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anomaly::Congestion { reporter, cell, vehicles, severity } => write!(
                f,
                "congestion at {cell}: {vehicles} vehicles, severity {severity} (reported by {reporter})"
            ),
            Anomaly::Incident { reporter, cell, vehicle, waiting_time } => write!(
                f,
                "incident at {cell}: {vehicle} waiting {waiting_time} ticks (reported by {reporter})"
            ),
        }
    }
}

/// A congestion area as seen by vehicles.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CongestionReport {
    pub cell:     Cell,
    pub severity: u8,
}
