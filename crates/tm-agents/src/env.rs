//! Read-only environment views passed to each agent's `step`.
//!
//! Views are built by the orchestrator once per agent per tick from
//! snapshots.  They borrow; no agent receives a `&mut` to anything but
//! itself.

use tm_core::{Axis, Cell, VehicleState};

use crate::{CongestionReport, SignalSnapshot, VehicleSnapshot};

/// Radius (Manhattan) inside which a signal counts approaching vehicles.
pub const SIGNAL_WATCH_RADIUS: u32 = 2;

// ── Signals ──────────────────────────────────────────────────────────────────

/// Vehicles near an intersection, split by the axis they are about to travel.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct AxisCounts {
    pub north_south: usize,
    pub east_west:   usize,
}

impl AxisCounts {
    /// Count active vehicles within `SIGNAL_WATCH_RADIUS` of `cell` by
    /// heading.  Arrived vehicles and vehicles with no next path cell are
    /// ignored.
    pub fn around(cell: Cell, vehicles: &[VehicleSnapshot]) -> Self {
        let mut counts = AxisCounts::default();
        for v in vehicles {
            if v.state == VehicleState::Arrived || cell.manhattan(v.cell) > SIGNAL_WATCH_RADIUS {
                continue;
            }
            match v.heading {
                Some(Axis::NorthSouth) => counts.north_south += 1,
                Some(Axis::EastWest) => counts.east_west += 1,
                None => {}
            }
        }
        counts
    }

    #[inline]
    pub fn on(&self, axis: Axis) -> usize {
        match axis {
            Axis::NorthSouth => self.north_south,
            Axis::EastWest => self.east_west,
        }
    }
}

/// What a signal sees.  `counts == None` disables adaptive tuning for the
/// tick (timing then runs purely on the fixed phase durations).
#[derive(Copy, Clone, Debug, Default)]
pub struct SignalEnv {
    pub counts: Option<AxisCounts>,
}

impl SignalEnv {
    pub fn with_counts(counts: AxisCounts) -> Self {
        Self { counts: Some(counts) }
    }

    /// No traffic information.
    pub fn none() -> Self {
        Self::default()
    }
}

// ── Vehicles ─────────────────────────────────────────────────────────────────

/// What a vehicle sees: this tick's signal states and the congestion
/// reports drained from the bus at the end of the *previous* tick.
#[derive(Copy, Clone, Debug, Default)]
pub struct VehicleEnv<'a> {
    pub signals:    &'a [SignalSnapshot],
    pub congestion: &'a [CongestionReport],
}

impl<'a> VehicleEnv<'a> {
    #[inline]
    pub fn new(signals: &'a [SignalSnapshot], congestion: &'a [CongestionReport]) -> Self {
        Self { signals, congestion }
    }

    /// The signal standing on `cell`, if any.
    pub fn signal_at(&self, cell: Cell) -> Option<&'a SignalSnapshot> {
        self.signals.iter().find(|s| s.cell == cell)
    }

    /// The most severe congestion report covering `cell` whose severity
    /// exceeds `threshold`.
    pub fn congestion_at(&self, cell: Cell, threshold: u8) -> Option<&'a CongestionReport> {
        self.congestion
            .iter()
            .filter(|r| r.cell == cell && r.severity > threshold)
            .max_by_key(|r| r.severity)
    }
}

// ── Sentinels ────────────────────────────────────────────────────────────────

/// What a sentinel sees: every active (non-arrived) vehicle as of the end of
/// this tick's vehicle phase.
#[derive(Copy, Clone, Debug, Default)]
pub struct SentinelEnv<'a> {
    pub vehicles: &'a [VehicleSnapshot],
}

impl<'a> SentinelEnv<'a> {
    #[inline]
    pub fn new(vehicles: &'a [VehicleSnapshot]) -> Self {
        Self { vehicles }
    }
}
