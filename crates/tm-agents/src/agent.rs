//! The `Agent` trait — the capability every agent kind shares.

use tm_core::{AgentRef, AgentRng, AgentStatus, Cell};

/// A simulation agent.
///
/// The orchestrator dispatches on the three concrete types statically (one
/// roster `Vec` per kind); the trait exists so rosters can be stepped,
/// snapshotted and placed on the grid by the same generic code.
///
/// # Thread safety
///
/// Agents are `Send` so a phase can be stepped on Rayon's pool.  `step`
/// takes `&mut self` and only a shared environment view, so no agent can
/// observe another's same-tick mutation.
pub trait Agent: Send {
    /// Read-only view of the world assembled for one `step` call.
    type Env<'a>;

    /// Immutable copy of the agent's observable state.
    type Snapshot: Clone + Send + Sync;

    fn agent_ref(&self) -> AgentRef;

    /// Current grid cell.
    fn cell(&self) -> Cell;

    /// State label recorded in grid occupancy.
    fn status(&self) -> AgentStatus;

    /// Advance one tick.
    fn step(&mut self, env: &Self::Env<'_>, rng: &mut AgentRng);

    fn snapshot(&self) -> Self::Snapshot;
}
