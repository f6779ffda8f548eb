//! Data module - listings loading and enrichment

mod loader;
mod model;
mod processor;

pub use loader::{
    normalize_columns, parse_price, CsvSource, DataSourceError, Dataset, FrameSource,
    ListingLoader, ListingSource, LoadStats, NullPolicy, REQUIRED_COLUMNS,
};
pub use model::{EnrichedListing, Listing, RoomType, DAYS_PER_YEAR};
pub use processor::{
    round_to, CellLookupError, Enricher, OutlierFilter, OUTLIER_RATE_THRESHOLD,
    RELATIVE_RATE_DECIMALS,
};
