//! Statistics Calculator Module
//! Descriptive price statistics, borough activity and revenue rankings.

use crate::data::{EnrichedListing, Listing, RoomType};
use serde::Serialize;
use statrs::statistics::Statistics;
use std::collections::{BTreeMap, HashMap};

/// Borough label for listings whose source row carries none.
pub const UNKNOWN_BOROUGH: &str = "Unknown";

/// Descriptive statistics for a set of nightly prices.
#[derive(Debug, Clone, Serialize)]
pub struct PriceStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub p95: f64,
    pub p05: f64,
}

impl Default for PriceStats {
    fn default() -> Self {
        Self {
            count: 0,
            mean: f64::NAN,
            median: f64::NAN,
            std: f64::NAN,
            p95: f64::NAN,
            p05: f64::NAN,
        }
    }
}

/// Rental activity of one borough.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoroughActivity {
    pub borough: String,
    pub listings: usize,
    /// Mean share of the year listings are open for booking.
    pub mean_availability_share: f64,
}

/// Stateless statistics helpers.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics for an array of values.
    pub fn compute_descriptive_stats(values: &[f64]) -> PriceStats {
        let n = values.len();
        if n == 0 {
            return PriceStats::default();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        };

        // statrs yields NaN for the sample deviation of a single value
        let std = if n > 1 { values.iter().std_dev() } else { 0.0 };

        PriceStats {
            count: n,
            mean: values.iter().mean(),
            median,
            std,
            p95: Self::percentile(&sorted, 95.0),
            p05: Self::percentile(&sorted, 5.0),
        }
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Price statistics for every room type present in `listings`.
    pub fn price_by_room_type(listings: &[Listing]) -> BTreeMap<RoomType, PriceStats> {
        let mut prices: BTreeMap<RoomType, Vec<f64>> = BTreeMap::new();
        for listing in listings {
            prices.entry(listing.room_type).or_default().push(listing.price);
        }

        prices
            .into_iter()
            .map(|(room_type, values)| (room_type, Self::compute_descriptive_stats(&values)))
            .collect()
    }

    /// Listing counts and availability per borough, busiest first.
    pub fn activity_by_borough(listings: &[Listing]) -> Vec<BoroughActivity> {
        let mut totals: HashMap<&str, (usize, f64)> = HashMap::new();
        for listing in listings {
            let borough = listing
                .neighbourhood_group
                .as_deref()
                .unwrap_or(UNKNOWN_BOROUGH);
            let entry = totals.entry(borough).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += listing.availability_share();
        }

        let mut activity: Vec<BoroughActivity> = totals
            .into_iter()
            .map(|(borough, (count, share_sum))| BoroughActivity {
                borough: borough.to_string(),
                listings: count,
                mean_availability_share: share_sum / count as f64,
            })
            .collect();

        activity.sort_by(|a, b| {
            b.listings
                .cmp(&a.listings)
                .then_with(|| a.borough.cmp(&b.borough))
        });
        activity
    }

    /// The `n` listings with the highest estimated revenue.
    pub fn top_earners(listings: &[EnrichedListing], n: usize) -> Vec<EnrichedListing> {
        let mut ranked: Vec<&EnrichedListing> = listings.iter().collect();
        ranked.sort_by(|a, b| {
            b.estimated_revenue()
                .partial_cmp(&a.estimated_revenue())
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.listing.id.cmp(&b.listing.id))
        });
        ranked.into_iter().take(n).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(
        id: &str,
        borough: Option<&str>,
        room_type: RoomType,
        price: f64,
        availability_365: u32,
    ) -> Listing {
        Listing {
            id: id.to_string(),
            neighbourhood_group: borough.map(str::to_string),
            latitude: 40.7,
            longitude: -73.9,
            price,
            availability_365,
            room_type,
        }
    }

    #[test]
    fn descriptive_stats_match_numpy_conventions() {
        let stats = StatsCalculator::compute_descriptive_stats(&[10.0, 20.0, 30.0, 40.0]);
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean, 25.0);
        assert_eq!(stats.median, 25.0);
        assert!((stats.std - 12.909944487358056).abs() < 1e-9);
        assert!((stats.p95 - 38.5).abs() < 1e-9);
        assert!((stats.p05 - 11.5).abs() < 1e-9);
    }

    #[test]
    fn single_and_empty_inputs() {
        let one = StatsCalculator::compute_descriptive_stats(&[42.0]);
        assert_eq!(one.std, 0.0);
        assert_eq!(one.p95, 42.0);
        assert!(StatsCalculator::compute_descriptive_stats(&[]).mean.is_nan());
    }

    #[test]
    fn groups_prices_by_room_type() {
        let listings = vec![
            listing("1", None, RoomType::EntireHome, 200.0, 10),
            listing("2", None, RoomType::PrivateRoom, 60.0, 10),
            listing("3", None, RoomType::EntireHome, 300.0, 10),
        ];
        let by_type = StatsCalculator::price_by_room_type(&listings);
        assert_eq!(by_type.len(), 2);
        assert_eq!(by_type[&RoomType::EntireHome].mean, 250.0);
        assert_eq!(by_type[&RoomType::PrivateRoom].count, 1);
        assert!(!by_type.contains_key(&RoomType::HotelRoom));
    }

    #[test]
    fn ranks_boroughs_by_listing_count() {
        let listings = vec![
            listing("1", Some("Queens"), RoomType::PrivateRoom, 50.0, 365),
            listing("2", Some("Brooklyn"), RoomType::PrivateRoom, 50.0, 73),
            listing("3", Some("Brooklyn"), RoomType::PrivateRoom, 50.0, 146),
            listing("4", None, RoomType::PrivateRoom, 50.0, 10),
        ];
        let activity = StatsCalculator::activity_by_borough(&listings);
        let order: Vec<&str> = activity.iter().map(|a| a.borough.as_str()).collect();
        assert_eq!(order, vec!["Brooklyn", "Queens", UNKNOWN_BOROUGH]);
        assert_eq!(activity[0].listings, 2);
        assert!((activity[0].mean_availability_share - 0.3).abs() < 1e-12);
        assert_eq!(activity[1].mean_availability_share, 1.0);
    }

    #[test]
    fn top_earners_rank_by_estimated_revenue() {
        let enriched: Vec<EnrichedListing> = [("a", 100.0, 300), ("b", 400.0, 100), ("c", 50.0, 5)]
            .into_iter()
            .map(|(id, price, occupied)| EnrichedListing {
                listing: listing(id, None, RoomType::EntireHome, price, 365 - occupied),
                avg_price: 150.0,
                relative_rate: Some(1.0),
                occupied_nights: occupied,
            })
            .collect();
        let top = StatsCalculator::top_earners(&enriched, 2);
        let ids: Vec<&str> = top.iter().map(|e| e.listing.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }
}
