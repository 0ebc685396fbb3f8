//! Grid coordinates and travel axes.
//!
//! `Cell` uses signed coordinates so intermediate arithmetic (detour offsets,
//! movement vectors) can step off the grid before being clamped or rejected.
//! A cell is only *valid* when `0 <= x, y < grid_size`; use
//! [`Cell::in_bounds`] before indexing anything with it.

use std::fmt;

/// Unit offsets to the four orthogonal neighbours, in a fixed order.
pub const NEIGHBOUR_OFFSETS: [(i32, i32); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

// ── Cell ─────────────────────────────────────────────────────────────────────

/// An integer grid position.  Immutable value type.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const ORIGIN: Cell = Cell { x: 0, y: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// `|Δx| + |Δy|`.
    #[inline]
    pub fn manhattan(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// `true` if the cell lies inside a `grid_size × grid_size` grid.
    #[inline]
    pub fn in_bounds(self, grid_size: u32) -> bool {
        let n = grid_size as i64;
        (0..n).contains(&(self.x as i64)) && (0..n).contains(&(self.y as i64))
    }

    /// Clamp both coordinates into `[0, grid_size)`.
    ///
    /// `grid_size` must be non-zero; a validated `SimConfig` guarantees it.
    #[inline]
    pub fn clamp_to(self, grid_size: u32) -> Cell {
        let max = grid_size.saturating_sub(1).min(i32::MAX as u32) as i32;
        Cell::new(self.x.clamp(0, max), self.y.clamp(0, max))
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Cell {
        Cell::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }

    /// Axis of travel from `self` to an adjacent `next` cell.
    ///
    /// Equal x means the move runs north-south; anything else is treated as
    /// east-west.
    #[inline]
    pub fn axis_to(self, next: Cell) -> Axis {
        if self.x == next.x { Axis::NorthSouth } else { Axis::EastWest }
    }

    /// The four orthogonal neighbours (not bounds-checked).
    pub fn neighbours(self) -> impl Iterator<Item = Cell> {
        NEIGHBOUR_OFFSETS.into_iter().map(move |(dx, dy)| self.offset(dx, dy))
    }

    /// Row-major index into a `grid_size × grid_size` buffer, or `None` when
    /// the cell is out of bounds.
    #[inline]
    pub fn index(self, grid_size: u32) -> Option<usize> {
        self.in_bounds(grid_size)
            .then(|| self.y as usize * grid_size as usize + self.x as usize)
    }
}

impl From<(i32, i32)> for Cell {
    #[inline]
    fn from((x, y): (i32, i32)) -> Self {
        Cell::new(x, y)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ── Axis ─────────────────────────────────────────────────────────────────────

/// Travel direction permitted by a signal, or followed by a vehicle.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    #[default]
    NorthSouth,
    EastWest,
}

impl Axis {
    /// The perpendicular axis.
    #[inline]
    pub fn flipped(self) -> Axis {
        match self {
            Axis::NorthSouth => Axis::EastWest,
            Axis::EastWest => Axis::NorthSouth,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Axis::NorthSouth => "North-South",
            Axis::EastWest => "East-West",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
