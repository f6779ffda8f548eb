//! Charts module - chart tables and the surfaces that present them

mod json;
mod plotter;
mod renderer;
mod surface;

pub use json::{table_records, write_json, JsonSurface};
pub use plotter::{bubble_radius, color_at, padded_range, Aggregation, DensityCell, DensityGrid};
pub use renderer::PngSurface;
pub use surface::{
    Chart, ChartError, ChartKind, ChartTable, Field, FieldValues, VisualizationSurface,
};
