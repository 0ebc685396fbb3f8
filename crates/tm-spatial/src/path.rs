//! Grid routing.
//!
//! Routing is naive: vehicles follow an L-shaped Manhattan
//! path that ignores signals and traffic, and congestion response perturbs
//! that path with random one-cell detours.  Both functions are pure given
//! their inputs (and the RNG state), so routes are reproducible.

use tm_core::cell::NEIGHBOUR_OFFSETS;
use tm_core::{AgentRng, Cell};

/// Attempts made to find an in-bounds neighbour before giving up on a detour.
const DETOUR_ATTEMPTS: usize = 3;

/// The x-first L-shaped path from `origin` to `destination`.
///
/// Contains every cell visited *after* `origin`, ending at `destination`;
/// empty when the two are equal.  Length is always
/// `origin.manhattan(destination)`.
pub fn manhattan_path(origin: Cell, destination: Cell) -> Vec<Cell> {
    let mut path = Vec::with_capacity(origin.manhattan(destination) as usize);
    let mut current = origin;

    let step_x = (destination.x - current.x).signum();
    while current.x != destination.x {
        current = current.offset(step_x, 0);
        path.push(current);
    }

    let step_y = (destination.y - current.y).signum();
    while current.y != destination.y {
        current = current.offset(0, step_y);
        path.push(current);
    }

    path
}

/// Rebuild `remaining` with random detours.
///
/// Walking from `start`, before each remaining cell there is a `chance`
/// probability of inserting a random orthogonal neighbour of the current
/// cell.  Up to three neighbours are drawn; the first one inside the grid is
/// used.  Every original cell is kept, in order, so the returned path still
/// ends where `remaining` did.
pub fn detour_path(
    start:     Cell,
    remaining: &[Cell],
    grid_size: u32,
    chance:    f64,
    rng:       &mut AgentRng,
) -> Vec<Cell> {
    let mut out = Vec::with_capacity(remaining.len() * 2);
    let mut current = start;

    for &next in remaining {
        if rng.gen_bool(chance) {
            for _ in 0..DETOUR_ATTEMPTS {
                let Some(&(dx, dy)) = rng.choose(&NEIGHBOUR_OFFSETS) else {
                    break;
                };
                let detour = current.offset(dx, dy);
                if detour.in_bounds(grid_size) {
                    out.push(detour);
                    current = detour;
                    break;
                }
            }
        }
        out.push(next);
        current = next;
    }

    out
}
