//! Plain data row types written by output backends.

use tm_agents::Anomaly;
use tm_core::{AgentRef, AgentStatus, Cell};
use tm_sim::SimStats;

/// Aggregate statistics at the end of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickStatsRow {
    pub tick:               u64,
    pub arrived:            usize,
    pub vehicles:           usize,
    pub total_waiting_time: u64,
    pub total_travel_time:  u64,
    pub congestion_events:  u64,
    pub incidents:          u64,
}

impl TickStatsRow {
    pub fn new(tick: u64, stats: &SimStats) -> Self {
        Self {
            tick,
            arrived:            stats.arrived,
            vehicles:           stats.vehicles,
            total_waiting_time: stats.total_waiting_time,
            total_travel_time:  stats.total_travel_time,
            congestion_events:  stats.congestion_events,
            incidents:          stats.incidents,
        }
    }
}

/// One grid occupant at a snapshot tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccupancyRow {
    pub tick:   u64,
    pub agent:  AgentRef,
    pub cell:   Cell,
    pub status: AgentStatus,
}

/// One anomaly drained from the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnomalyRow {
    pub tick:    u64,
    pub anomaly: Anomaly,
}
