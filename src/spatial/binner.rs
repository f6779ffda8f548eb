//! Spatial Binner Module
//! Groups listings into grid cells and computes each cell's mean price.

use crate::data::Listing;
use crate::spatial::grid::{CellKey, GridCell, GridSpec};
use std::collections::BTreeMap;
use tracing::debug;

/// Price totals of the listings that fall in one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSummary {
    pub cell: GridCell,
    pub count: usize,
    pub price_sum: f64,
}

impl CellSummary {
    pub fn mean_price(&self) -> f64 {
        self.price_sum / self.count as f64
    }
}

/// Mean price per occupied grid cell.
///
/// Only cells holding at least one listing have an entry.
#[derive(Debug, Clone)]
pub struct CellAverages {
    grid: GridSpec,
    cells: BTreeMap<CellKey, CellSummary>,
}

impl CellAverages {
    /// The grid the averages were binned with; lookups must use the same one.
    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    pub fn get(&self, key: &CellKey) -> Option<&CellSummary> {
        self.cells.get(key)
    }

    pub fn mean_price(&self, key: &CellKey) -> Option<f64> {
        self.cells.get(key).map(CellSummary::mean_price)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CellKey, &CellSummary)> {
        self.cells.iter()
    }
}

/// Partitions listings into grid cells.
pub struct SpatialBinner {
    grid: GridSpec,
}

impl Default for SpatialBinner {
    fn default() -> Self {
        Self::new(GridSpec::default())
    }
}

impl SpatialBinner {
    pub fn new(grid: GridSpec) -> Self {
        Self { grid }
    }

    pub fn bin(&self, listings: &[Listing]) -> CellAverages {
        let mut cells: BTreeMap<CellKey, CellSummary> = BTreeMap::new();

        for listing in listings {
            let cell = self.grid.cell_of(listing.latitude, listing.longitude);
            let summary = cells.entry(self.grid.key_of(cell)).or_insert(CellSummary {
                cell,
                count: 0,
                price_sum: 0.0,
            });
            summary.count += 1;
            summary.price_sum += listing.price;
        }

        debug!(listings = listings.len(), cells = cells.len(), "Listings binned");
        CellAverages {
            grid: self.grid,
            cells,
        }
    }
}
