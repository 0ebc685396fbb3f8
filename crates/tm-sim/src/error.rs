use thiserror::Error;

use tm_agents::AgentError;
use tm_core::{AgentRef, Cell, CoreError};

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(#[from] CoreError),

    #[error("agent construction failed: {0}")]
    Agent(#[from] AgentError),

    #[error("{what} roster is empty")]
    EmptyRoster { what: &'static str },

    #[error("{agent} at {cell} lies outside the {grid_size}x{grid_size} grid")]
    OffGrid {
        agent:     AgentRef,
        cell:      Cell,
        grid_size: u32,
    },
}

pub type SimResult<T> = Result<T, SimError>;
