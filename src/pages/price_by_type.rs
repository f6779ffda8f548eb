//! Price by rental type page: one room type over the local price level.

use crate::charts::{Chart, ChartError, ChartKind, ChartTable};
use crate::data::{Listing, RoomType};
use crate::stats::{PriceStats, StatsCalculator};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Serialize)]
pub struct PriceSummary {
    pub room_type: RoomType,
    /// Listings of the highlighted room type.
    pub highlighted: usize,
    pub by_room_type: BTreeMap<RoomType, PriceStats>,
}

impl fmt::Display for PriceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Nightly prices ({} highlighted: {})",
            self.room_type.display_name(),
            self.highlighted
        )?;
        writeln!(
            f,
            "{:<18} {:>7} {:>9} {:>9} {:>9} {:>9} {:>9}",
            "Room type", "N", "Mean", "Median", "Std", "P05", "P95"
        )?;
        for (room_type, s) in &self.by_room_type {
            writeln!(
                f,
                "{:<18} {:>7} {:>9.2} {:>9.2} {:>9.2} {:>9.2} {:>9.2}",
                room_type.label(),
                s.count,
                s.mean,
                s.median,
                s.std,
                s.p05,
                s.p95
            )?;
        }
        Ok(())
    }
}

pub struct PriceByType {
    pub chart: Chart,
    pub summary: PriceSummary,
}

impl PriceByType {
    /// Mean-price density of every listing with `room_type` listings on top.
    pub fn build(listings: &[Listing], room_type: RoomType) -> Result<Self, ChartError> {
        let table = ChartTable::new()
            .with_numeric("longitude", listings.iter().map(|l| l.longitude).collect())?
            .with_numeric("latitude", listings.iter().map(|l| l.latitude).collect())?
            .with_numeric("price", listings.iter().map(|l| l.price).collect())?
            .with_categorical(
                "room_type",
                listings
                    .iter()
                    .map(|l| l.room_type.label().to_string())
                    .collect(),
            )?
            .with_weight("price")?;

        let chart = Chart {
            name: "price_by_type".to_string(),
            title: format!("Property Value Map: {}", room_type.display_name()),
            x_label: "Longitude".to_string(),
            y_label: "Latitude".to_string(),
            kind: ChartKind::Overlay {
                x: "longitude".to_string(),
                y: "latitude".to_string(),
                category: "room_type".to_string(),
                highlight: room_type.label().to_string(),
            },
            table,
        };

        let highlighted = listings.iter().filter(|l| l.room_type == room_type).count();
        Ok(Self {
            chart,
            summary: PriceSummary {
                room_type,
                highlighted,
                by_room_type: StatsCalculator::price_by_room_type(listings),
            },
        })
    }
}
