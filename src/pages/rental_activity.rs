//! Rental activity page: where listings cluster and how open they are.

use crate::charts::{Chart, ChartError, ChartKind, ChartTable};
use crate::data::Listing;
use crate::stats::{BoroughActivity, StatsCalculator};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Serialize)]
pub struct ActivitySummary {
    pub listings: usize,
    pub boroughs: Vec<BoroughActivity>,
}

impl fmt::Display for ActivitySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Rental activity across {} listings", self.listings)?;
        writeln!(f, "{:<16} {:>9} {:>14}", "Borough", "Listings", "Availability")?;
        for b in &self.boroughs {
            writeln!(
                f,
                "{:<16} {:>9} {:>13.1}%",
                b.borough,
                b.listings,
                b.mean_availability_share * 100.0
            )?;
        }
        Ok(())
    }
}

pub struct RentalActivity {
    pub chart: Chart,
    pub summary: ActivitySummary,
}

impl RentalActivity {
    /// Heatmap of listing positions weighted by the share of the year each is
    /// open for booking.
    pub fn build(listings: &[Listing]) -> Result<Self, ChartError> {
        let table = ChartTable::new()
            .with_numeric("longitude", listings.iter().map(|l| l.longitude).collect())?
            .with_numeric("latitude", listings.iter().map(|l| l.latitude).collect())?
            .with_numeric(
                "elevation",
                listings.iter().map(Listing::availability_share).collect(),
            )?
            .with_weight("elevation")?;

        let chart = Chart {
            name: "rental_activity".to_string(),
            title: "Listing Heatmap in New York City".to_string(),
            x_label: "Longitude".to_string(),
            y_label: "Latitude".to_string(),
            kind: ChartKind::Heatmap {
                x: "longitude".to_string(),
                y: "latitude".to_string(),
            },
            table,
        };

        Ok(Self {
            chart,
            summary: ActivitySummary {
                listings: listings.len(),
                boroughs: StatsCalculator::activity_by_borough(listings),
            },
        })
    }
}
