//! Simulation configuration.
//!
//! Typically built from CLI flags or loaded from a JSON file by the runner
//! and handed to `tm_sim::SimBuilder`, which calls [`SimConfig::validate`]
//! before constructing anything.

use crate::{CoreError, CoreResult, Tick};

// ── SignalTiming ──────────────────────────────────────────────────────────────

/// Phase durations (in ticks) and the adaptive green-time bounds for every
/// traffic signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SignalTiming {
    pub red:       u32,
    pub yellow:    u32,
    pub green:     u32,
    /// Floor for adaptive green shortening.
    pub green_min: u32,
    /// Ceiling for adaptive green relaxation.
    pub green_max: u32,
}

impl Default for SignalTiming {
    fn default() -> Self {
        Self { red: 30, yellow: 5, green: 30, green_min: 15, green_max: 45 }
    }
}

// ── SentinelParams ────────────────────────────────────────────────────────────

/// Flight parameters shared by every sentinel.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SentinelParams {
    /// Battery percentage lost per tick.
    pub drain_rate:  f64,
    /// Cells moved per tick (before rounding of the unit vector).
    pub speed:       u32,
    /// Battery level below which the sentinel returns to base.
    pub low_battery: f64,
}

impl Default for SentinelParams {
    fn default() -> Self {
        Self { drain_rate: 0.5, speed: 1, low_battery: 20.0 }
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Side length of the square grid.
    pub grid_size: u32,

    /// Number of vehicles in the roster.  Must be non-zero.
    pub vehicle_count: usize,

    /// Number of aerial sentinels.  Zero is allowed (no monitoring).
    pub sentinel_count: usize,

    /// Ticks run by `Sim::run`.
    pub total_ticks: u64,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Call `SimObserver::on_snapshot` every N ticks.  0 disables snapshots.
    pub output_interval_ticks: u64,

    /// Messages retained per bus topic.
    pub bus_history: usize,

    pub signal_timing: SignalTiming,

    pub sentinel: SentinelParams,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            grid_size:             5,
            vehicle_count:         10,
            sentinel_count:        2,
            total_ticks:           100,
            seed:                  42,
            output_interval_ticks: 1,
            bus_history:           100,
            signal_timing:         SignalTiming::default(),
            sentinel:              SentinelParams::default(),
        }
    }
}

impl SimConfig {
    /// First tick *not* executed by `Sim::run`.
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.total_ticks)
    }

    /// Reject configurations that would divide by zero in statistics, place
    /// agents nowhere, or stall a state machine.
    pub fn validate(&self) -> CoreResult<()> {
        if self.grid_size == 0 {
            return Err(CoreError::Config("grid_size must be at least 1".into()));
        }
        if self.grid_size < 2 {
            return Err(CoreError::Config(
                "grid_size must be at least 2 so vehicles can have distinct origin and destination"
                    .into(),
            ));
        }
        if self.grid_size > i32::MAX as u32 {
            return Err(CoreError::Config(format!("grid_size {} is too large", self.grid_size)));
        }
        if self.vehicle_count == 0 {
            return Err(CoreError::Config("vehicle_count must be at least 1".into()));
        }
        if self.bus_history == 0 {
            return Err(CoreError::Config("bus_history must be at least 1".into()));
        }

        let t = &self.signal_timing;
        if t.red == 0 || t.yellow == 0 || t.green == 0 {
            return Err(CoreError::Config("signal phase durations must be non-zero".into()));
        }
        if t.green_min == 0 || t.green_min > t.green_max {
            return Err(CoreError::Config(format!(
                "green bounds [{}, {}] are invalid",
                t.green_min, t.green_max
            )));
        }
        if !(t.green_min..=t.green_max).contains(&t.green) {
            return Err(CoreError::Config(format!(
                "green duration {} lies outside [{}, {}]",
                t.green, t.green_min, t.green_max
            )));
        }

        let s = &self.sentinel;
        if !s.drain_rate.is_finite() || s.drain_rate <= 0.0 {
            return Err(CoreError::Config(format!("drain_rate {} must be positive", s.drain_rate)));
        }
        if !(0.0..100.0).contains(&s.low_battery) {
            return Err(CoreError::Config(format!(
                "low_battery threshold {} must lie in [0, 100)",
                s.low_battery
            )));
        }
        if s.speed == 0 {
            return Err(CoreError::Config("sentinel speed must be non-zero".into()));
        }
        Ok(())
    }
}
