//! `Grid` — which agents occupy which cell this tick.
//!
//! The grid owns no agents.  It is a derived read-model that the simulation
//! rebuilds from scratch at the end of every tick (`clear` followed by one
//! `add_agent` per agent), so nothing in it survives a rebuild.  Renderers
//! and output writers read it; nothing in the simulation reads it back.

use tm_core::{AgentKind, AgentRef, AgentStatus, Cell};
use tracing::warn;

#[cfg(feature = "fx-hash")]
type IndexMap = rustc_hash::FxHashMap<AgentRef, Cell>;
#[cfg(not(feature = "fx-hash"))]
type IndexMap = std::collections::HashMap<AgentRef, Cell>;

/// One occupancy entry.  A cell may hold any number of these.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Occupant {
    pub agent:  AgentRef,
    pub status: AgentStatus,
}

impl Occupant {
    #[inline]
    pub fn kind(&self) -> AgentKind {
        self.agent.kind()
    }
}

/// A `size × size` occupancy map with an agent → cell index.
#[derive(Clone, Debug)]
pub struct Grid {
    size:  u32,
    /// Row-major: `cells[y * size + x]`.
    cells: Vec<Vec<Occupant>>,
    index: IndexMap,
}

impl Grid {
    /// Create an empty grid.  A zero size yields a grid with no cells on
    /// which every lookup is empty.
    pub fn new(size: u32) -> Self {
        let n = size as usize * size as usize;
        Self {
            size,
            cells: vec![Vec::new(); n],
            index: IndexMap::default(),
        }
    }

    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Record `agent` at `cell`.
    ///
    /// Returns `false` and records nothing when `cell` is out of bounds.  An
    /// agent that is already on the grid is moved rather than duplicated.
    pub fn add_agent(&mut self, agent: AgentRef, cell: Cell, status: AgentStatus) -> bool {
        let Some(i) = cell.index(self.size) else {
            warn!(%agent, %cell, size = self.size, "rejected out-of-bounds grid placement");
            return false;
        };
        if self.index.contains_key(&agent) {
            self.remove_agent(agent);
        }
        self.cells[i].push(Occupant { agent, status });
        self.index.insert(agent, cell);
        true
    }

    /// Remove `agent` from the grid, returning its entry if it was present.
    pub fn remove_agent(&mut self, agent: AgentRef) -> Option<Occupant> {
        let cell = self.index.remove(&agent)?;
        let slot = &mut self.cells[cell.index(self.size)?];
        let pos = slot.iter().position(|o| o.agent == agent)?;
        Some(slot.remove(pos))
    }

    /// Occupants of `cell`, in insertion order.  Out-of-range cells yield an
    /// empty slice, never an error.
    pub fn agents_at(&self, cell: Cell) -> &[Occupant] {
        match cell.index(self.size) {
            Some(i) => &self.cells[i],
            None => &[],
        }
    }

    /// Where `agent` is and what state it was recorded with.
    pub fn agent(&self, agent: AgentRef) -> Option<(Cell, AgentStatus)> {
        let cell = *self.index.get(&agent)?;
        self.agents_at(cell)
            .iter()
            .find(|o| o.agent == agent)
            .map(|o| (cell, o.status))
    }

    /// Empty every cell and the index.
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
        self.index.clear();
    }

    /// Full occupancy snapshot: every cell in row-major order (y outer,
    /// x inner) with its occupants, including empty cells.
    pub fn cells(&self) -> impl Iterator<Item = (Cell, &[Occupant])> + '_ {
        let size = self.size.max(1) as usize;
        self.cells.iter().enumerate().map(move |(i, occ)| {
            let cell = Cell::new((i % size) as i32, (i / size) as i32);
            (cell, occ.as_slice())
        })
    }

    /// Number of agents currently recorded.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Count of recorded agents of one kind.
    pub fn count_kind(&self, kind: AgentKind) -> usize {
        self.index.keys().filter(|a| a.kind() == kind).count()
    }
}
