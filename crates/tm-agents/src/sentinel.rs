//! `SentinelAgent` — a patrolling drone with a battery budget.
//!
//! # Step order
//!
//! 1. Drain the battery.  Dropping below `low_battery` switches to
//!    `RETURNING` with the base cell as the only waypoint.
//! 2. Monitor: count active vehicles within Manhattan distance 2, record the
//!    count in the density field, queue congestion and incident anomalies.
//! 3. Fly one move toward the current waypoint.
//! 4. Landing exactly on the base while `RETURNING` recharges to 100 and
//!    resumes patrolling on a fresh waypoint loop.
//!
//! `REPORTING` is never stored.  It shows up in the snapshot of the tick in
//! which at least one anomaly was queued, and the stored state drops back to
//! `PATROLLING` (unless returning).  `MONITORING` means vehicles were seen
//! but nothing was reported.

use tm_core::{
    AgentRef, AgentRng, AgentStatus, Cell, SentinelId, SentinelParams, SentinelState,
    VehicleState,
};
use tracing::{debug, info};

use crate::error::check_bounds;
use crate::{Agent, AgentError, AgentResult, Anomaly, SentinelEnv};

/// Manhattan radius inside which vehicles are monitored.
pub const MONITOR_RADIUS: u32 = 2;
/// Proximate vehicle count above which congestion is reported.
pub const CONGESTION_THRESHOLD: usize = 3;
/// Waiting time above which a stopped vehicle is reported as an incident.
pub const INCIDENT_WAIT: u32 = 10;
/// Battery level restored on landing at base.
pub const FULL_BATTERY: f64 = 100.0;
/// Severity ceiling for congestion reports.
const MAX_SEVERITY: usize = 10;
/// Per-axis slack when deciding a patrol waypoint has been reached.
const WAYPOINT_TOLERANCE: i32 = 1;

// ── PatrolBox ────────────────────────────────────────────────────────────────

/// Inclusive rectangle of cells a sentinel's waypoints are drawn from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PatrolBox {
    pub min: Cell,
    pub max: Cell,
}

impl PatrolBox {
    pub fn new(min: Cell, max: Cell) -> Self {
        Self { min, max }
    }

    /// The whole `grid_size × grid_size` grid.
    pub fn full(grid_size: u32) -> Self {
        let hi = grid_size.saturating_sub(1) as i32;
        Self::new(Cell::ORIGIN, Cell::new(hi, hi))
    }

    /// Quadrant `index % 4` of the grid: 0 low-x/low-y, 1 high-x/low-y,
    /// 2 low-x/high-y, 3 high-x/high-y.  Falls back to the full grid when
    /// the grid is too small to split.
    pub fn quadrant(index: usize, grid_size: u32) -> Self {
        let half = (grid_size / 2) as i32;
        if half == 0 {
            return Self::full(grid_size);
        }
        let hi = grid_size as i32 - 1;
        let (x0, x1) = if index % 2 == 0 { (0, half - 1) } else { (half, hi) };
        let (y0, y1) = if (index % 4) < 2 { (0, half - 1) } else { (half, hi) };
        Self::new(Cell::new(x0, y0), Cell::new(x1, y1))
    }

    pub fn corners(&self) -> [Cell; 4] {
        [
            self.min,
            Cell::new(self.max.x, self.min.y),
            Cell::new(self.min.x, self.max.y),
            self.max,
        ]
    }

    #[inline]
    pub fn contains(&self, cell: Cell) -> bool {
        (self.min.x..=self.max.x).contains(&cell.x) && (self.min.y..=self.max.y).contains(&cell.y)
    }

    fn fits(&self, grid_size: u32) -> bool {
        self.min.x <= self.max.x
            && self.min.y <= self.max.y
            && self.min.in_bounds(grid_size)
            && self.max.in_bounds(grid_size)
    }
}

/// Offset for one move from `from` toward `to`: the unit vector scaled by
/// `speed`, rounded per axis and capped at the remaining distance.
pub(crate) fn flight_step(from: Cell, to: Cell, speed: u32) -> (i32, i32) {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    if dx == 0 && dy == 0 {
        return (0, 0);
    }
    let dist = (dx as f64).hypot(dy as f64);
    let speed = speed as f64;
    let mx = ((dx as f64 / dist * speed).round() as i32).clamp(-dx.abs(), dx.abs());
    let my = ((dy as f64 / dist * speed).round() as i32).clamp(-dy.abs(), dy.abs());
    (mx, my)
}

// ── Snapshot ─────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SentinelSnapshot {
    pub id:                SentinelId,
    pub cell:              Cell,
    pub state:             SentinelState,
    pub battery:           f64,
    pub pending_anomalies: usize,
    pub current_waypoint:  Option<Cell>,
}

// ── SentinelAgent ────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct SentinelAgent {
    id:             SentinelId,
    cell:           Cell,
    /// Patrolling, Monitoring or Returning.
    state:          SentinelState,
    patrol:         PatrolBox,
    battery:        f64,
    params:         SentinelParams,
    base:           Cell,
    waypoints:      Vec<Cell>,
    waypoint_index: usize,
    anomalies:      Vec<Anomaly>,
    /// Row-major, one entry per grid cell.
    density:        Vec<u32>,
    grid_size:      u32,
    /// Set when an anomaly was queued during the last `step`.
    reported:       bool,
}

impl SentinelAgent {
    pub fn new(
        id:        SentinelId,
        start:     Cell,
        patrol:    PatrolBox,
        params:    SentinelParams,
        grid_size: u32,
        rng:       &mut AgentRng,
    ) -> AgentResult<Self> {
        check_bounds(start, grid_size)?;
        if !patrol.fits(grid_size) {
            return Err(AgentError::BadPatrolBox { min: patrol.min, max: patrol.max, grid_size });
        }
        let cells = grid_size as usize * grid_size as usize;
        let mut agent = Self {
            id,
            cell: start,
            state: SentinelState::Patrolling,
            patrol,
            battery: FULL_BATTERY,
            params,
            base: Cell::ORIGIN,
            waypoints: Vec::new(),
            waypoint_index: 0,
            anomalies: Vec::new(),
            density: vec![0; cells],
            grid_size,
            reported: false,
        };
        agent.regenerate_waypoints(rng);
        Ok(agent)
    }

    #[inline]
    pub fn id(&self) -> SentinelId {
        self.id
    }

    /// Stored state; never `Reporting`.
    #[inline]
    pub fn state(&self) -> SentinelState {
        self.state
    }

    #[inline]
    pub fn battery(&self) -> f64 {
        self.battery
    }

    #[inline]
    pub fn patrol(&self) -> PatrolBox {
        self.patrol
    }

    #[inline]
    pub fn base(&self) -> Cell {
        self.base
    }

    #[inline]
    pub fn waypoints(&self) -> &[Cell] {
        &self.waypoints
    }

    #[inline]
    pub fn current_waypoint(&self) -> Option<Cell> {
        self.waypoints.get(self.waypoint_index).copied()
    }

    #[inline]
    pub fn pending_anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }

    /// Hand the queued anomalies to the caller, leaving the queue empty.
    pub fn drain_anomalies(&mut self) -> Vec<Anomaly> {
        std::mem::take(&mut self.anomalies)
    }

    /// Vehicles counted at `cell` the last time this sentinel monitored it.
    pub fn density_at(&self, cell: Cell) -> u32 {
        cell.index(self.grid_size)
            .and_then(|i| self.density.get(i).copied())
            .unwrap_or(0)
    }

    /// Corners plus 3–6 random cells of the patrol box, shuffled, closed by
    /// the current cell.
    fn regenerate_waypoints(&mut self, rng: &mut AgentRng) {
        let extra: usize = rng.gen_range(3..=6);
        let mut points: Vec<Cell> = self.patrol.corners().to_vec();
        for _ in 0..extra {
            points.push(rng.cell_in(self.patrol.min, self.patrol.max));
        }
        rng.shuffle(&mut points);
        points.push(self.cell);
        self.waypoints = points;
        self.waypoint_index = 0;
        debug!(sentinel = %self.id, waypoints = self.waypoints.len(), "new patrol loop");
    }

    fn drain_battery(&mut self) {
        self.battery = (self.battery - self.params.drain_rate).max(0.0);
        if self.battery < self.params.low_battery && self.state != SentinelState::Returning {
            self.state = SentinelState::Returning;
            self.waypoints = vec![self.base];
            self.waypoint_index = 0;
            info!(sentinel = %self.id, battery = self.battery, cell = %self.cell, "low battery, returning to base");
        }
    }

    fn monitor(&mut self, env: &SentinelEnv<'_>) {
        let here = self.cell;
        let slot = here.index(self.grid_size);
        if let Some(d) = slot.and_then(|i| self.density.get_mut(i)) {
            *d = 0;
        }

        let mut count = 0usize;
        for v in env.vehicles {
            if v.state == VehicleState::Arrived || here.manhattan(v.cell) > MONITOR_RADIUS {
                continue;
            }
            count += 1;
            if v.state == VehicleState::Waiting && v.waiting_time > INCIDENT_WAIT {
                self.queue(Anomaly::Incident {
                    reporter:     self.id,
                    cell:         v.cell,
                    vehicle:      v.id,
                    waiting_time: v.waiting_time,
                });
            }
        }

        if let Some(d) = slot.and_then(|i| self.density.get_mut(i)) {
            *d += count as u32;
        }

        if count > CONGESTION_THRESHOLD {
            self.queue(Anomaly::Congestion {
                reporter: self.id,
                cell:     here,
                vehicles: count,
                severity: count.min(MAX_SEVERITY) as u8,
            });
        }

        // A report hands straight back to patrolling.
        if self.state != SentinelState::Returning {
            self.state = if count > 0 && !self.reported {
                SentinelState::Monitoring
            } else {
                SentinelState::Patrolling
            };
        }
    }

    fn queue(&mut self, anomaly: Anomaly) {
        info!(sentinel = %self.id, %anomaly, "anomaly detected");
        self.anomalies.push(anomaly);
        self.reported = true;
    }

    /// One move toward the current waypoint, never past it on either axis.
    fn fly(&mut self, rng: &mut AgentRng) {
        let Some(target) = self.current_waypoint() else {
            return;
        };
        let (mx, my) = flight_step(self.cell, target, self.params.speed);
        self.cell = self.cell.offset(mx, my).clamp_to(self.grid_size);

        if self.state == SentinelState::Returning {
            return;
        }
        let reached = (target.x - self.cell.x).abs() <= WAYPOINT_TOLERANCE
            && (target.y - self.cell.y).abs() <= WAYPOINT_TOLERANCE;
        if reached {
            self.waypoint_index += 1;
            if self.waypoint_index >= self.waypoints.len() {
                self.regenerate_waypoints(rng);
            } else {
                debug!(sentinel = %self.id, waypoint = %target, "waypoint reached");
            }
        }
    }

    fn snapshot_state(&self) -> SentinelState {
        if self.reported {
            SentinelState::Reporting
        } else {
            self.state
        }
    }

    fn recharge(&mut self, rng: &mut AgentRng) {
        self.battery = FULL_BATTERY;
        self.state = SentinelState::Patrolling;
        info!(sentinel = %self.id, "recharged at base");
        self.regenerate_waypoints(rng);
    }
}

impl Agent for SentinelAgent {
    type Env<'a> = SentinelEnv<'a>;
    type Snapshot = SentinelSnapshot;

    fn agent_ref(&self) -> AgentRef {
        AgentRef::Sentinel(self.id)
    }

    fn cell(&self) -> Cell {
        self.cell
    }

    fn status(&self) -> AgentStatus {
        AgentStatus::Sentinel(self.snapshot_state())
    }

    fn step(&mut self, env: &SentinelEnv<'_>, rng: &mut AgentRng) {
        self.reported = false;
        self.drain_battery();
        self.monitor(env);
        self.fly(rng);

        if self.state == SentinelState::Returning && self.cell == self.base {
            self.recharge(rng);
        }
    }

    fn snapshot(&self) -> SentinelSnapshot {
        SentinelSnapshot {
            id:                self.id,
            cell:              self.cell,
            state:             self.snapshot_state(),
            battery:           self.battery,
            pending_anomalies: self.anomalies.len(),
            current_waypoint:  self.current_waypoint(),
        }
    }
}
