//! `SignalAgent` — the traffic light at one intersection.
//!
//! # Timing
//!
//! Transitions are purely time-triggered.  Each `step` first advances the
//! phase timer, then (when the environment supplies vehicle counts) adapts
//! the green duration, then checks the transition for the current phase:
//!
//! ```text
//!   RED ──(red ticks)──▶ GREEN ──(green ticks)──▶ YELLOW ──(yellow ticks)──▶ RED
//!    └─ open axis flips on every RED → GREEN
//! ```
//!
//! # Adaptive green time
//!
//! If the axis that is currently closed has at least one vehicle and at
//! least 1.5× the vehicles of the open axis, green shrinks by 5 ticks
//! (floor `green_min`); otherwise it relaxes upward by 1 (ceiling
//! `green_max`).  Over successive cycles this favours the busier axis.

use tm_core::{AgentRef, AgentRng, AgentStatus, Axis, Cell, SignalId, SignalPhase, SignalTiming};
use tracing::debug;

use crate::error::check_bounds;
use crate::{Agent, AgentResult, AxisCounts, SignalEnv};

/// Ticks removed from green when the closed axis is busier.
const GREEN_CUT: u32 = 5;
/// Ticks added back to green otherwise.
const GREEN_RELAX: u32 = 1;

// ── Snapshot ─────────────────────────────────────────────────────────────────

/// Observable state of one signal.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SignalSnapshot {
    pub id:             SignalId,
    pub cell:           Cell,
    pub phase:          SignalPhase,
    pub open_axis:      Axis,
    pub phase_timer:    u32,
    pub green_duration: u32,
}

impl SignalSnapshot {
    /// `true` unless the light is green *and* open for `heading`.
    ///
    /// Yellow counts as red.  A vehicle with no upcoming move (`None`) is
    /// never given way.
    #[inline]
    pub fn is_red_for(&self, heading: Option<Axis>) -> bool {
        self.phase != SignalPhase::Green || heading != Some(self.open_axis)
    }
}

// ── SignalAgent ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct SignalAgent {
    id:          SignalId,
    cell:        Cell,
    phase:       SignalPhase,
    /// Ticks spent in the current phase.  Reset to 0 on every transition.
    phase_timer: u32,
    timing:      SignalTiming,
    open_axis:   Axis,
}

impl SignalAgent {
    /// Create a signal at `cell` in `phase`, open north-south.
    pub fn new(
        id:        SignalId,
        cell:      Cell,
        phase:     SignalPhase,
        timing:    SignalTiming,
        grid_size: u32,
    ) -> AgentResult<Self> {
        check_bounds(cell, grid_size)?;
        Ok(Self {
            id,
            cell,
            phase,
            phase_timer: 0,
            timing,
            open_axis: Axis::NorthSouth,
        })
    }

    #[inline]
    pub fn id(&self) -> SignalId {
        self.id
    }

    #[inline]
    pub fn phase(&self) -> SignalPhase {
        self.phase
    }

    #[inline]
    pub fn phase_timer(&self) -> u32 {
        self.phase_timer
    }

    #[inline]
    pub fn open_axis(&self) -> Axis {
        self.open_axis
    }

    /// Current (possibly adapted) phase durations.
    #[inline]
    pub fn timing(&self) -> &SignalTiming {
        &self.timing
    }

    #[inline]
    pub fn green_duration(&self) -> u32 {
        self.timing.green
    }

    fn adapt(&mut self, counts: AxisCounts) {
        let open = counts.on(self.open_axis);
        let closed = counts.on(self.open_axis.flipped());
        let t = &mut self.timing;

        if closed > 0 && closed * 2 >= open * 3 {
            t.green = t.green.saturating_sub(GREEN_CUT).max(t.green_min);
            debug!(
                signal = %self.id,
                open, closed,
                green = t.green,
                "closed axis busier, shortening green"
            );
        } else {
            t.green = (t.green + GREEN_RELAX).min(t.green_max);
        }
    }

    fn enter(&mut self, phase: SignalPhase) {
        self.phase = phase;
        self.phase_timer = 0;
        debug!(
            signal = %self.id,
            cell = %self.cell,
            phase = %phase,
            open_axis = %self.open_axis,
            "signal phase change"
        );
    }
}

impl Agent for SignalAgent {
    type Env<'a> = SignalEnv;
    type Snapshot = SignalSnapshot;

    fn agent_ref(&self) -> AgentRef {
        AgentRef::Signal(self.id)
    }

    fn cell(&self) -> Cell {
        self.cell
    }

    fn status(&self) -> AgentStatus {
        AgentStatus::Signal(self.phase)
    }

    fn step(&mut self, env: &SignalEnv, _rng: &mut AgentRng) {
        self.phase_timer += 1;

        if let Some(counts) = env.counts {
            self.adapt(counts);
        }

        match self.phase {
            SignalPhase::Red if self.phase_timer >= self.timing.red => {
                self.open_axis = self.open_axis.flipped();
                self.enter(SignalPhase::Green);
            }
            SignalPhase::Green if self.phase_timer >= self.timing.green => {
                self.enter(SignalPhase::Yellow);
            }
            SignalPhase::Yellow if self.phase_timer >= self.timing.yellow => {
                self.enter(SignalPhase::Red);
            }
            _ => {}
        }
    }

    fn snapshot(&self) -> SignalSnapshot {
        SignalSnapshot {
            id:             self.id,
            cell:           self.cell,
            phase:          self.phase,
            open_axis:      self.open_axis,
            phase_timer:    self.phase_timer,
            green_duration: self.timing.green,
        }
    }
}
