//! Data Processor Module
//! Attaches cell-relative pricing to listings and filters presentation outliers.

use crate::data::model::{EnrichedListing, Listing};
use crate::spatial::{CellAverages, CellKey};
use thiserror::Error;
use tracing::debug;

/// Listings priced more than this many times their cell average are left off charts.
pub const OUTLIER_RATE_THRESHOLD: f64 = 15.0;
pub const RELATIVE_RATE_DECIMALS: usize = 2;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CellLookupError {
    /// The listing was not part of the set the averages were binned from.
    #[error("No average price for cell {key} of listing {listing_id}; listings were binned from a different set")]
    MissingCell { listing_id: String, key: CellKey },
}

/// Round to `decimals` places, correctly rounded from the exact binary value
/// with ties to even.
///
/// Scaling by a power of ten first would round inexact products and ties away
/// from zero, so `0.125` would become `0.13` instead of `0.12`.
pub fn round_to(value: f64, decimals: usize) -> f64 {
    format!("{value:.decimals$}").parse().unwrap_or(value)
}

/// Derives per-listing fields from an explicit cell average mapping.
pub struct Enricher<'a> {
    averages: &'a CellAverages,
}

impl<'a> Enricher<'a> {
    pub fn new(averages: &'a CellAverages) -> Self {
        Self { averages }
    }

    pub fn enrich(&self, listing: &Listing) -> Result<EnrichedListing, CellLookupError> {
        let key = self.averages.grid().key_for(listing);
        let avg_price = self
            .averages
            .mean_price(&key)
            .ok_or_else(|| CellLookupError::MissingCell {
                listing_id: listing.id.clone(),
                key,
            })?;

        let relative_rate = (avg_price > 0.0)
            .then(|| round_to(listing.price / avg_price, RELATIVE_RATE_DECIMALS));

        Ok(EnrichedListing {
            listing: listing.clone(),
            avg_price,
            relative_rate,
            occupied_nights: listing.occupied_nights(),
        })
    }

    /// Enrich every listing, stopping at the first lookup failure.
    pub fn enrich_all(
        &self,
        listings: &[Listing],
    ) -> Result<Vec<EnrichedListing>, CellLookupError> {
        listings.iter().map(|listing| self.enrich(listing)).collect()
    }
}

/// Drops listings whose relative rate would distort a chart's scale.
#[derive(Debug, Clone, Copy)]
pub struct OutlierFilter {
    threshold: f64,
}

impl Default for OutlierFilter {
    fn default() -> Self {
        Self::new(OUTLIER_RATE_THRESHOLD)
    }
}

impl OutlierFilter {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Listings without a relative rate cannot be placed on the chart.
    pub fn keeps(&self, listing: &EnrichedListing) -> bool {
        listing
            .relative_rate
            .is_some_and(|rate| rate <= self.threshold)
    }

    /// Split into (charted, excluded).
    pub fn partition(
        &self,
        listings: Vec<EnrichedListing>,
    ) -> (Vec<EnrichedListing>, Vec<EnrichedListing>) {
        let (kept, excluded): (Vec<_>, Vec<_>) =
            listings.into_iter().partition(|listing| self.keeps(listing));
        debug!(
            kept = kept.len(),
            excluded = excluded.len(),
            threshold = self.threshold,
            "Outliers filtered"
        );
        (kept, excluded)
    }

    pub fn retain(&self, listings: Vec<EnrichedListing>) -> Vec<EnrichedListing> {
        self.partition(listings).0
    }
}
