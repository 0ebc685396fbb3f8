use thiserror::Error;

use tm_core::{Cell, CoreError, VehicleId};

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("vehicle {vehicle} has origin equal to destination {cell}")]
    DegenerateTrip { vehicle: VehicleId, cell: Cell },

    #[error("patrol box {min}..={max} does not fit a {grid_size}x{grid_size} grid")]
    BadPatrolBox { min: Cell, max: Cell, grid_size: u32 },
}

pub type AgentResult<T> = Result<T, AgentError>;

/// Reject cells outside the grid at construction time.
pub(crate) fn check_bounds(cell: Cell, grid_size: u32) -> AgentResult<()> {
    if cell.in_bounds(grid_size) {
        Ok(())
    } else {
        Err(CoreError::OutOfBounds { cell, grid_size }.into())
    }
}
