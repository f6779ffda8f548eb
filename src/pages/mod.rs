//! Pages module - the three dashboard views
//!
//! Each page turns a listing slice into a chart for a visualization surface
//! plus a summary that can be printed or exported.

mod price_by_type;
mod rental_activity;
mod top_revenue;

pub use price_by_type::{PriceByType, PriceSummary};
pub use rental_activity::{ActivitySummary, RentalActivity};
pub use top_revenue::{RevenueAnalysis, RevenueSummary, TopRevenue};

use crate::charts::ChartError;
use crate::data::{CellLookupError, DataSourceError};
use crate::spatial::GridError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PageError {
    #[error(transparent)]
    DataSource(#[from] DataSourceError),
    #[error(transparent)]
    CellLookup(#[from] CellLookupError),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Chart(#[from] ChartError),
}
