//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]`.

use thiserror::Error;

use crate::Cell;

/// Errors raised while validating configuration or initial placement.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("cell {cell} is outside the {grid_size}x{grid_size} grid")]
    OutOfBounds { cell: Cell, grid_size: u32 },
}

/// Shorthand result type for `tm-core`.
pub type CoreResult<T> = Result<T, CoreError>;
