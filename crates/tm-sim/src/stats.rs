//! Aggregate run statistics.

use std::fmt;

use tm_core::Tick;

/// Running totals, refreshed at the end of every tick.
///
/// Vehicle totals (`arrived`, waiting and travel time) are recomputed over
/// the full roster each tick; anomaly counters accumulate.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimStats {
    /// Ticks completed.
    pub ticks:              u64,
    pub signals:            usize,
    pub vehicles:           usize,
    pub sentinels:          usize,
    pub arrived:            usize,
    pub total_waiting_time: u64,
    pub total_travel_time:  u64,
    pub congestion_events:  u64,
    /// Incident anomalies (vehicles stuck waiting).
    pub incidents:          u64,
}

impl SimStats {
    #[inline]
    pub fn last_tick(&self) -> Option<Tick> {
        self.ticks.checked_sub(1).map(Tick)
    }

    /// Mean waiting time per vehicle.  The roster is never empty in a built
    /// simulation; an empty one yields 0.
    pub fn avg_waiting_time(&self) -> f64 {
        ratio(self.total_waiting_time as f64, self.vehicles)
    }

    pub fn avg_travel_time(&self) -> f64 {
        ratio(self.total_travel_time as f64, self.vehicles)
    }

    /// Arrived vehicles as a percentage of the roster.
    pub fn arrival_pct(&self) -> f64 {
        ratio(self.arrived as f64 * 100.0, self.vehicles)
    }
}

fn ratio(num: f64, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num / den as f64 }
}

impl fmt::Display for SimStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Ticks completed:          {}", self.ticks)?;
        writeln!(
            f,
            "Vehicles arrived:         {} of {} ({:.1}%)",
            self.arrived,
            self.vehicles,
            self.arrival_pct()
        )?;
        writeln!(f, "Average waiting time:     {:.2} ticks", self.avg_waiting_time())?;
        writeln!(f, "Average travel time:      {:.2} ticks", self.avg_travel_time())?;
        writeln!(f, "Congestion events:        {}", self.congestion_events)?;
        write!(f, "Incidents detected:       {}", self.incidents)
    }
}
