//! `VehicleAgent` — follows a precomputed path, obeys signals, reacts to
//! congestion.
//!
//! # Per-tick decision order
//!
//! 1. `ARRIVED` is terminal: `step` is a no-op.
//! 2. Travel time is charged for the tick.
//! 3. A signal on the current cell that is red for the upcoming move ⇒
//!    `WAITING`, waiting time +1, no movement.
//! 4. A congestion report on the current cell with severity > 7 ⇒ with
//!    probability 0.3 reroute (detours spliced into the unconsumed path) and
//!    carry on moving; otherwise a slowdown: waiting time +1, no movement.
//! 5. Move one path cell.  Leaving `WAITING` counts a stop.  Reaching the
//!    destination (or the end of the path) ⇒ `ARRIVED`.

use tm_core::{AgentRef, AgentRng, AgentStatus, Axis, Cell, VehicleId, VehicleState};
use tm_spatial::{detour_path, manhattan_path};
use tracing::{debug, info};

use crate::error::check_bounds;
use crate::{Agent, AgentError, AgentResult, VehicleEnv};

/// Congestion severity above which a vehicle considers rerouting.
pub const REROUTE_SEVERITY: u8 = 7;
/// Probability of rerouting (vs. slowing down) in severe congestion.
pub const REROUTE_PROBABILITY: f64 = 0.3;
/// Per-cell probability of a detour when rerouting.
pub const DETOUR_PROBABILITY: f64 = 0.2;

// ── Snapshot ─────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleSnapshot {
    pub id:                VehicleId,
    pub cell:              Cell,
    pub destination:       Cell,
    pub state:             VehicleState,
    /// Axis of the next move, `None` once the path is used up.
    pub heading:           Option<Axis>,
    pub waiting_time:      u32,
    pub total_travel_time: u32,
    pub stops:             u32,
    /// Percentage of path cells consumed (0–100), `None` for an empty path.
    pub progress:          Option<u8>,
}

// ── VehicleAgent ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct VehicleAgent {
    id:                VehicleId,
    cell:              Cell,
    destination:       Cell,
    state:             VehicleState,
    /// Cells to visit after the origin, ending at `destination`.
    path:              Vec<Cell>,
    /// Next unconsumed entry of `path`.  Never exceeds `path.len()`.
    path_index:        usize,
    waiting_time:      u32,
    total_travel_time: u32,
    stops:             u32,
    grid_size:         u32,
}

impl VehicleAgent {
    /// Create a vehicle at `origin` bound for `destination` along the x-first
    /// Manhattan path.
    pub fn new(
        id:          VehicleId,
        origin:      Cell,
        destination: Cell,
        grid_size:   u32,
    ) -> AgentResult<Self> {
        check_bounds(origin, grid_size)?;
        check_bounds(destination, grid_size)?;
        if origin == destination {
            return Err(AgentError::DegenerateTrip { vehicle: id, cell: origin });
        }
        Ok(Self {
            id,
            cell: origin,
            destination,
            state: VehicleState::Moving,
            path: manhattan_path(origin, destination),
            path_index: 0,
            waiting_time: 0,
            total_travel_time: 0,
            stops: 0,
            grid_size,
        })
    }

    #[inline]
    pub fn id(&self) -> VehicleId {
        self.id
    }

    #[inline]
    pub fn destination(&self) -> Cell {
        self.destination
    }

    #[inline]
    pub fn state(&self) -> VehicleState {
        self.state
    }

    #[inline]
    pub fn has_arrived(&self) -> bool {
        self.state.is_terminal()
    }

    #[inline]
    pub fn path(&self) -> &[Cell] {
        &self.path
    }

    #[inline]
    pub fn path_index(&self) -> usize {
        self.path_index
    }

    #[inline]
    pub fn waiting_time(&self) -> u32 {
        self.waiting_time
    }

    #[inline]
    pub fn total_travel_time(&self) -> u32 {
        self.total_travel_time
    }

    #[inline]
    pub fn stops(&self) -> u32 {
        self.stops
    }

    /// Axis of the move from the current cell to the next path cell.
    pub fn heading(&self) -> Option<Axis> {
        self.path.get(self.path_index).map(|&next| self.cell.axis_to(next))
    }

    pub fn progress(&self) -> Option<u8> {
        if self.path.is_empty() {
            return None;
        }
        Some((self.path_index * 100 / self.path.len()).min(100) as u8)
    }

    /// Splice random detours into the unconsumed part of the path.
    fn reroute(&mut self, rng: &mut AgentRng) {
        let suffix = detour_path(
            self.cell,
            &self.path[self.path_index..],
            self.grid_size,
            DETOUR_PROBABILITY,
            rng,
        );
        let added = suffix.len() - (self.path.len() - self.path_index);
        self.path.truncate(self.path_index);
        self.path.extend(suffix);
        debug!(vehicle = %self.id, cell = %self.cell, detours = added, "rerouted around congestion");
    }

    /// Consume the next path cell.
    fn advance(&mut self) {
        if self.state == VehicleState::Waiting {
            self.stops += 1;
        }
        self.state = VehicleState::Moving;

        if let Some(&next) = self.path.get(self.path_index) {
            self.cell = next;
            self.path_index += 1;
        }

        if self.cell == self.destination || self.path_index >= self.path.len() {
            self.state = VehicleState::Arrived;
            info!(
                vehicle = %self.id,
                destination = %self.destination,
                travel_time = self.total_travel_time,
                stops = self.stops,
                "vehicle arrived"
            );
        }
    }
}

impl Agent for VehicleAgent {
    type Env<'a> = VehicleEnv<'a>;
    type Snapshot = VehicleSnapshot;

    fn agent_ref(&self) -> AgentRef {
        AgentRef::Vehicle(self.id)
    }

    fn cell(&self) -> Cell {
        self.cell
    }

    fn status(&self) -> AgentStatus {
        AgentStatus::Vehicle(self.state)
    }

    fn step(&mut self, env: &VehicleEnv<'_>, rng: &mut AgentRng) {
        if self.state.is_terminal() {
            return;
        }
        self.total_travel_time += 1;

        if let Some(signal) = env.signal_at(self.cell) {
            if signal.is_red_for(self.heading()) {
                self.state = VehicleState::Waiting;
                self.waiting_time += 1;
                debug!(vehicle = %self.id, signal = %signal.id, "waiting at signal");
                return;
            }
        }

        if let Some(report) = env.congestion_at(self.cell, REROUTE_SEVERITY) {
            if rng.gen_bool(REROUTE_PROBABILITY) {
                self.state = VehicleState::Rerouting;
                self.reroute(rng);
                self.state = VehicleState::Moving;
            } else {
                self.waiting_time += 1;
                debug!(vehicle = %self.id, severity = report.severity, "slowed by congestion");
                return;
            }
        }

        self.advance();
    }

    fn snapshot(&self) -> VehicleSnapshot {
        VehicleSnapshot {
            id:                self.id,
            cell:              self.cell,
            destination:       self.destination,
            state:             self.state,
            heading:           self.heading(),
            waiting_time:      self.waiting_time,
            total_travel_time: self.total_travel_time,
            stops:             self.stops,
            progress:          self.progress(),
        }
    }
}
