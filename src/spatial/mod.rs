//! Spatial module - grid bucketing and per-cell price averages

mod binner;
mod grid;

pub use binner::{CellAverages, CellSummary, SpatialBinner};
pub use grid::{
    CellKey, GridCell, GridError, GridSpec, DEFAULT_KEY_PRECISION, DEFAULT_STEP,
    MAX_KEY_PRECISION,
};
