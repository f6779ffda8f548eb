//! Listing Model Module
//! Record types shared by the loader, the spatial binner and the pages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Nights in the trailing booking window covered by `availability_365`.
pub const DAYS_PER_YEAR: u32 = 365;

/// Kind of space offered by a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RoomType {
    #[serde(rename = "Entire home/apt", alias = "entire_home")]
    EntireHome,
    #[serde(rename = "Hotel room", alias = "hotel_room")]
    HotelRoom,
    #[serde(rename = "Private room", alias = "private_room")]
    PrivateRoom,
    #[serde(rename = "Shared room", alias = "shared_room")]
    SharedRoom,
}

impl RoomType {
    pub const ALL: [RoomType; 4] = [
        RoomType::EntireHome,
        RoomType::HotelRoom,
        RoomType::PrivateRoom,
        RoomType::SharedRoom,
    ];

    /// Parse the label used by the listings dataset (case-insensitive).
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|room_type| room_type.label().eq_ignore_ascii_case(label))
    }

    /// Label as it appears in the dataset.
    pub fn label(&self) -> &'static str {
        match self {
            RoomType::EntireHome => "Entire home/apt",
            RoomType::HotelRoom => "Hotel room",
            RoomType::PrivateRoom => "Private room",
            RoomType::SharedRoom => "Shared room",
        }
    }

    /// Human readable name used in chart titles.
    pub fn display_name(&self) -> &'static str {
        match self {
            RoomType::EntireHome => "Full home/apartment",
            RoomType::HotelRoom => "Hotel",
            RoomType::PrivateRoom => "Private room",
            RoomType::SharedRoom => "Shared room",
        }
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One short-term rental record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    pub id: String,
    /// Borough, when the source carries one.
    pub neighbourhood_group: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// Nightly price in the dataset's currency.
    pub price: f64,
    pub availability_365: u32,
    pub room_type: RoomType,
}

impl Listing {
    /// Share of the year the listing is open for booking (heatmap elevation).
    pub fn availability_share(&self) -> f64 {
        self.availability_365 as f64 / DAYS_PER_YEAR as f64
    }

    /// Nights presumed booked in the trailing year.
    pub fn occupied_nights(&self) -> u32 {
        DAYS_PER_YEAR.saturating_sub(self.availability_365)
    }
}

/// A listing with the fields derived from its grid cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedListing {
    #[serde(flatten)]
    pub listing: Listing,
    /// Mean price of the listing's grid cell.
    pub avg_price: f64,
    /// `price / avg_price` rounded to two decimals; absent when the cell
    /// average is not positive.
    pub relative_rate: Option<f64>,
    pub occupied_nights: u32,
}

impl EnrichedListing {
    pub fn estimated_revenue(&self) -> f64 {
        self.listing.price * self.occupied_nights as f64
    }
}
