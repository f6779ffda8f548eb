//! Top revenue page: occupancy vs price, sized by cell-relative rate.

use crate::charts::{Chart, ChartError, ChartKind, ChartTable};
use crate::data::{CellLookupError, EnrichedListing, Enricher, Listing, OutlierFilter};
use crate::pages::PageError;
use crate::spatial::{GridSpec, SpatialBinner};
use crate::stats::StatsCalculator;
use serde::Serialize;
use std::fmt;
use tracing::info;

/// Binning, enrichment and outlier filtering over one listing set.
#[derive(Debug, Clone)]
pub struct RevenueAnalysis {
    pub cells: usize,
    /// Listings kept for the chart, in input order.
    pub charted: Vec<EnrichedListing>,
    /// Valid listings left off the chart by the outlier filter.
    pub excluded: Vec<EnrichedListing>,
}

impl RevenueAnalysis {
    /// The same slice is binned and enriched, so every lookup has a cell.
    pub fn run(
        listings: &[Listing],
        grid: GridSpec,
        filter: OutlierFilter,
    ) -> Result<Self, CellLookupError> {
        let averages = SpatialBinner::new(grid).bin(listings);
        let enriched = Enricher::new(&averages).enrich_all(listings)?;
        let (charted, excluded) = filter.partition(enriched);

        info!(
            listings = listings.len(),
            cells = averages.len(),
            charted = charted.len(),
            excluded = excluded.len(),
            "Revenue analysis complete"
        );
        Ok(Self {
            cells: averages.len(),
            charted,
            excluded,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RevenueSummary {
    pub cells: usize,
    pub charted: usize,
    pub excluded_outliers: usize,
    pub outlier_rate_threshold: f64,
    pub top_earners: Vec<EnrichedListing>,
}

impl fmt::Display for RevenueSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} listings charted across {} cells ({} above relative rate {} excluded)",
            self.charted, self.cells, self.excluded_outliers, self.outlier_rate_threshold
        )?;
        writeln!(
            f,
            "{:<20} {:>9} {:>8} {:>9} {:>13}",
            "Listing", "Price", "Nights", "Rel rate", "Est revenue"
        )?;
        for e in &self.top_earners {
            writeln!(
                f,
                "{:<20} {:>9.2} {:>8} {:>9.2} {:>13.2}",
                e.listing.id,
                e.listing.price,
                e.occupied_nights,
                e.relative_rate.unwrap_or(f64::NAN),
                e.estimated_revenue()
            )?;
        }
        Ok(())
    }
}

pub struct TopRevenue {
    pub chart: Chart,
    pub summary: RevenueSummary,
}

impl TopRevenue {
    pub fn build(
        listings: &[Listing],
        grid: GridSpec,
        filter: OutlierFilter,
        top_n: usize,
    ) -> Result<Self, PageError> {
        let analysis = RevenueAnalysis::run(listings, grid, filter)?;
        let chart = Self::chart(&analysis.charted)?;

        Ok(Self {
            chart,
            summary: RevenueSummary {
                cells: analysis.cells,
                charted: analysis.charted.len(),
                excluded_outliers: analysis.excluded.len(),
                outlier_rate_threshold: filter.threshold(),
                top_earners: StatsCalculator::top_earners(&analysis.charted, top_n),
            },
        })
    }

    fn chart(charted: &[EnrichedListing]) -> Result<Chart, ChartError> {
        let table = ChartTable::new()
            .with_categorical("id", charted.iter().map(|e| e.listing.id.clone()).collect())?
            .with_numeric(
                "occupied_nights",
                charted.iter().map(|e| e.occupied_nights as f64).collect(),
            )?
            .with_numeric("price", charted.iter().map(|e| e.listing.price).collect())?
            .with_numeric(
                "relative_rate",
                // the outlier filter only keeps listings with a rate
                charted
                    .iter()
                    .map(|e| e.relative_rate.unwrap_or(0.0))
                    .collect(),
            )?
            .with_numeric("avg_price", charted.iter().map(|e| e.avg_price).collect())?;

        Ok(Chart {
            name: "top_revenue".to_string(),
            title: "Top Revenue Generators in New York".to_string(),
            x_label: "Occupied Nights".to_string(),
            y_label: "Price per Night".to_string(),
            kind: ChartKind::Bubble {
                x: "occupied_nights".to_string(),
                y: "price".to_string(),
                size: "relative_rate".to_string(),
            },
            table,
        })
    }
}
