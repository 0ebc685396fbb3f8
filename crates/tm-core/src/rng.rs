//! Deterministic per-agent and setup-level RNG wrappers.
//!
//! # Determinism strategy
//!
//! Each agent gets its own independent `SmallRng` seeded by:
//!
//!   seed = global_seed XOR ((kind_stream << 32 | index) * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive ids uniformly across the seed space.  This means:
//!
//! - Agents never share RNG state, so stepping order inside a phase (or a
//!   parallel phase) cannot change what any one agent draws.
//! - Adding agents at the end of a roster does not disturb the seeds of
//!   existing agents.
//! - Signals, vehicles and sentinels with the same index draw from distinct
//!   streams.
//!
//! Setup-time randomness (origins, destinations, start cells, initial
//! phases) comes from a single [`SimRng`] seeded with the global seed.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::{AgentRef, Cell};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── AgentRng ──────────────────────────────────────────────────────────────────

/// Per-agent deterministic RNG, passed into every `step` that needs
/// randomness (waypoint generation, detours).
pub struct AgentRng(SmallRng);

impl AgentRng {
    /// Seed deterministically from the run's global seed and an agent ref.
    pub fn new(global_seed: u64, agent: AgentRef) -> Self {
        let stream = (agent.kind().stream() << 32) | agent.index() as u64;
        let seed = global_seed ^ stream.wrapping_mul(MIXING_CONSTANT);
        AgentRng(SmallRng::seed_from_u64(seed))
    }

    /// Seed directly.  Handy in tests that drive a single agent.
    pub fn from_seed(seed: u64) -> Self {
        AgentRng(SmallRng::seed_from_u64(seed))
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Shuffle a mutable slice in-place (Fisher-Yates).
    #[inline]
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.0);
    }

    /// Choose a random element from a slice; `None` if it is empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.0)
    }

    /// A uniformly random cell in the inclusive box `min..=max`.
    pub fn cell_in(&mut self, min: Cell, max: Cell) -> Cell {
        Cell::new(self.0.gen_range(min.x..=max.x), self.0.gen_range(min.y..=max.y))
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Simulation-level RNG for roster construction.
///
/// Used only while building the simulation, which is single-threaded.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.0)
    }

    /// A uniformly random cell anywhere on a `grid_size × grid_size` grid.
    ///
    /// `grid_size` must be non-zero.
    pub fn cell(&mut self, grid_size: u32) -> Cell {
        let n = grid_size as i32;
        Cell::new(self.0.gen_range(0..n), self.0.gen_range(0..n))
    }
}
