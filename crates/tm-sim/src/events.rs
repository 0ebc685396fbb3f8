//! Bus topics and the message type carried on them.

use tm_agents::{Anomaly, SentinelSnapshot, SignalSnapshot, VehicleSnapshot};

/// Topic names used by the orchestrator.
pub mod topics {
    /// One message per signal per tick.
    pub const SIGNAL_UPDATE: &str = "traffic_light_update";
    /// One message per vehicle stepped this tick.
    pub const VEHICLE_UPDATE: &str = "vehicle_update";
    /// One message per sentinel per tick.
    pub const SENTINEL_UPDATE: &str = "drone_update";
    /// Anomalies; drained by the orchestrator at the end of every tick.
    pub const ANOMALY: &str = "anomaly_detected";
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BusEvent {
    Signal(SignalSnapshot),
    Vehicle(VehicleSnapshot),
    Sentinel(SentinelSnapshot),
    Anomaly(Anomaly),
}

impl BusEvent {
    /// The topic this event is published on.
    pub fn topic(&self) -> &'static str {
        match self {
            BusEvent::Signal(_) => topics::SIGNAL_UPDATE,
            BusEvent::Vehicle(_) => topics::VEHICLE_UPDATE,
            BusEvent::Sentinel(_) => topics::SENTINEL_UPDATE,
            BusEvent::Anomaly(_) => topics::ANOMALY,
        }
    }

    pub fn as_anomaly(&self) -> Option<&Anomaly> {
        match self {
            BusEvent::Anomaly(a) => Some(a),
            _ => None,
        }
    }
}

impl From<Anomaly> for BusEvent {
    fn from(a: Anomaly) -> Self {
        BusEvent::Anomaly(a)
    }
}
