//! `tm-spatial` — grid occupancy and routing.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                    |
//! |------------|-------------------------------------------------------------|
//! | [`grid`]   | `Grid` occupancy read-model, `Occupant`                     |
//! | [`path`]   | `manhattan_path` (x-first L-shaped route), `detour_path`    |
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                     |
//! |-----------|------------------------------------------------------------|
//! | `fx-hash` | FxHash for the per-tick agent index.                       |
//! | `serde`   | Derives `Serialize`/`Deserialize` on `Occupant`.           |

pub mod grid;
pub mod path;


pub use grid::{Grid, Occupant};
pub use path::{detour_path, manhattan_path};
