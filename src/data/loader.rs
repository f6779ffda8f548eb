//! CSV Data Loader Module
//! Handles listings loading, column normalization and row validation using Polars.

use crate::data::model::{Listing, RoomType, DAYS_PER_YEAR};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Columns every listing row must carry after name normalization.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "id",
    "latitude",
    "longitude",
    "price",
    "availability_365",
    "room_type",
];

/// Regulatory field that is never used downstream.
const LICENSE_COLUMN: &str = "license";
const BOROUGH_COLUMN: &str = "neighbourhood_group";

#[derive(Error, Debug)]
pub enum DataSourceError {
    #[error("Data source not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Failed to read data source: {0}")]
    Read(#[from] PolarsError),
    #[error("Data source is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("Row limit must be a positive integer")]
    ZeroRowLimit,
}

/// Which missing values cause a row to be dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullPolicy {
    /// Only a missing required field drops the row.
    #[default]
    RequiredColumns,
    /// A missing value in any kept column drops the row.
    AnyColumn,
}

/// A tabular source of raw listing rows.
pub trait ListingSource {
    /// Read at most `max_rows` rows, in source order.
    fn read(&self, max_rows: usize) -> Result<DataFrame, DataSourceError>;
}

/// Listings stored in a CSV file.
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ListingSource for CsvSource {
    fn read(&self, max_rows: usize) -> Result<DataFrame, DataSourceError> {
        if !self.path.is_file() {
            return Err(DataSourceError::NotFound(self.path.clone()));
        }

        // Unparsable cells become nulls and are dropped during validation
        let df = LazyCsvReader::new(&self.path)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .with_n_rows(Some(max_rows))
            .finish()?
            .collect()?;

        debug!(path = %self.path.display(), rows = df.height(), "CSV read");
        Ok(df)
    }
}

/// Listings already held in memory.
pub struct FrameSource {
    frame: DataFrame,
}

impl FrameSource {
    pub fn new(frame: DataFrame) -> Self {
        Self { frame }
    }
}

impl ListingSource for FrameSource {
    fn read(&self, max_rows: usize) -> Result<DataFrame, DataSourceError> {
        Ok(self.frame.head(Some(max_rows)))
    }
}

/// Turns raw rows into validated listings.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListingLoader {
    null_policy: NullPolicy,
}

impl ListingLoader {
    pub fn new(null_policy: NullPolicy) -> Self {
        Self { null_policy }
    }

    /// Read up to `max_rows` raw rows and keep the valid, actively rented ones.
    pub fn load(
        &self,
        source: &dyn ListingSource,
        max_rows: usize,
    ) -> Result<Vec<Listing>, DataSourceError> {
        if max_rows == 0 {
            return Err(DataSourceError::ZeroRowLimit);
        }
        let raw = source.read(max_rows)?;
        self.listings_from_frame(raw)
    }

    /// Normalize and validate an already-read frame.
    pub fn listings_from_frame(&self, raw: DataFrame) -> Result<Vec<Listing>, DataSourceError> {
        let (listings, stats) = self.listings_with_stats(raw)?;
        info!(
            source_rows = stats.source_rows,
            loaded = stats.loaded,
            unavailable = stats.unavailable,
            malformed = stats.malformed,
            "Listings loaded"
        );
        Ok(listings)
    }

    /// Like `listings_from_frame`, also reporting where the dropped rows went.
    pub fn listings_with_stats(
        &self,
        raw: DataFrame,
    ) -> Result<(Vec<Listing>, LoadStats), DataSourceError> {
        let source_rows = raw.height();
        let df = normalize_columns(raw)?;

        // Null or unparsable availability is malformed, not unavailable
        let missing_availability = df
            .column("availability_365")?
            .cast(&DataType::Int64)?
            .null_count();
        let df = df
            .lazy()
            .filter(col("availability_365").cast(DataType::Int64).gt(lit(0)))
            .collect()?;
        let unavailable = source_rows - missing_availability - df.height();

        let ids = df.column("id")?.cast(&DataType::String)?;
        let latitudes = df.column("latitude")?.cast(&DataType::Float64)?;
        let longitudes = df.column("longitude")?.cast(&DataType::Float64)?;
        let availability = df.column("availability_365")?.cast(&DataType::Int64)?;
        let room_types = df.column("room_type")?.cast(&DataType::String)?;
        let boroughs = match df.column(BOROUGH_COLUMN) {
            Ok(column) => Some(column.cast(&DataType::String)?),
            Err(_) => None,
        };

        let columns = ListingColumns {
            ids: ids.str()?,
            latitudes: latitudes.f64()?,
            longitudes: longitudes.f64()?,
            prices: price_values(df.column("price")?)?,
            availability: availability.i64()?,
            room_types: room_types.str()?,
            boroughs: boroughs.as_ref().map(|column| column.str()).transpose()?,
        };

        let mut listings = Vec::with_capacity(df.height());
        let mut malformed = missing_availability;
        for i in 0..df.height() {
            if self.null_policy == NullPolicy::AnyColumn && row_has_null(&df, i) {
                malformed += 1;
                continue;
            }
            match columns.listing_at(i) {
                Some(listing) => listings.push(listing),
                None => malformed += 1,
            }
        }

        let stats = LoadStats {
            source_rows,
            loaded: listings.len(),
            unavailable,
            malformed,
        };
        Ok((listings, stats))
    }
}

/// Row counts of one load: every source row is loaded, unavailable or malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    pub source_rows: usize,
    pub loaded: usize,
    /// Rows with `availability_365 <= 0`.
    pub unavailable: usize,
    /// Rows with a missing or invalid field, including availability.
    pub malformed: usize,
}

/// Raw rows read once and sliced per page.
///
/// Slicing the head of the raw rows before validation gives exactly the
/// listings a fresh read with the smaller row limit would give.
pub struct Dataset {
    raw: DataFrame,
    loader: ListingLoader,
}

impl Dataset {
    pub fn load(
        source: &dyn ListingSource,
        max_rows: usize,
        loader: ListingLoader,
    ) -> Result<Self, DataSourceError> {
        if max_rows == 0 {
            return Err(DataSourceError::ZeroRowLimit);
        }
        let raw = source.read(max_rows)?;
        Ok(Self { raw, loader })
    }

    pub fn raw_rows(&self) -> usize {
        self.raw.height()
    }

    /// Listings among the first `max_rows` raw rows.
    pub fn listings(&self, max_rows: usize) -> Result<Vec<Listing>, DataSourceError> {
        if max_rows == 0 {
            return Err(DataSourceError::ZeroRowLimit);
        }
        self.loader.listings_from_frame(self.raw.head(Some(max_rows)))
    }
}

/// Lowercase column names, discard the license column and check the schema.
pub fn normalize_columns(df: DataFrame) -> Result<DataFrame, DataSourceError> {
    let columns: Vec<Column> = df
        .get_columns()
        .iter()
        .cloned()
        .map(|mut column| {
            let lower = column.name().to_lowercase();
            column.rename(lower.into());
            column
        })
        .filter(|column| column.name().as_str() != LICENSE_COLUMN)
        .collect();

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|required| !columns.iter().any(|c| c.name().as_str() == **required))
        .map(|required| required.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(DataSourceError::MissingColumns(missing));
    }

    Ok(DataFrame::new(columns)?)
}

/// Parse a price cell such as `"$1,250.00"`.
pub fn parse_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ','))
        .collect();
    cleaned.parse().ok()
}

fn price_values(column: &Column) -> Result<Vec<Option<f64>>, DataSourceError> {
    if column.dtype() == &DataType::String {
        Ok(column
            .str()?
            .into_iter()
            .map(|value| value.and_then(parse_price))
            .collect())
    } else {
        let prices = column.cast(&DataType::Float64)?;
        Ok(prices.f64()?.into_iter().collect())
    }
}

fn row_has_null(df: &DataFrame, row: usize) -> bool {
    df.get_columns().iter().any(|column| match column.get(row) {
        Ok(AnyValue::Float64(v)) => v.is_nan(),
        Ok(AnyValue::Float32(v)) => v.is_nan(),
        Ok(value) => value.is_null(),
        Err(_) => true,
    })
}

/// Typed views over the required columns of a normalized frame.
struct ListingColumns<'a> {
    ids: &'a StringChunked,
    latitudes: &'a Float64Chunked,
    longitudes: &'a Float64Chunked,
    prices: Vec<Option<f64>>,
    availability: &'a Int64Chunked,
    room_types: &'a StringChunked,
    boroughs: Option<&'a StringChunked>,
}

impl ListingColumns<'_> {
    fn listing_at(&self, i: usize) -> Option<Listing> {
        let id = self.ids.get(i)?.trim();
        if id.is_empty() {
            return None;
        }
        let latitude = self.latitudes.get(i).filter(|v| v.is_finite())?;
        let longitude = self.longitudes.get(i).filter(|v| v.is_finite())?;
        let price = self
            .prices
            .get(i)
            .copied()
            .flatten()
            .filter(|p| p.is_finite() && *p >= 0.0)?;
        let availability = self.availability.get(i)?;
        if !(1..=DAYS_PER_YEAR as i64).contains(&availability) {
            return None;
        }
        let room_type = RoomType::parse(self.room_types.get(i)?)?;
        let neighbourhood_group = self
            .boroughs
            .and_then(|b| b.get(i))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Some(Listing {
            id: id.to_string(),
            neighbourhood_group,
            latitude,
            longitude,
            price,
            availability_365: availability as u32,
            room_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn sample_frame() -> DataFrame {
        df!(
            "ID" => &[1i64, 2, 3, 4, 5],
            "Neighbourhood_Group" => &["Manhattan", "Brooklyn", "Queens", "Bronx", "Manhattan"],
            "Latitude" => &[40.71, 40.72, 40.65, 40.84, 40.78],
            "Longitude" => &[-73.99, -73.95, -73.80, -73.87, -73.97],
            "Room_Type" => &[
                "Entire home/apt",
                "Private room",
                "Hotel room",
                "Shared room",
                "Private room"
            ],
            "Price" => &[Some(100.0), Some(200.0), None, Some(45.0), Some(80.0)],
            "Availability_365" => &[30i64, 0, 120, 365, 200],
            "License" => &[None::<&str>, None, Some("OSE-STRREG-0000008"), None, None]
        )
        .unwrap()
    }

    fn temp_csv(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "nyc_stays_loader_{}_{}.csv",
            name,
            std::process::id()
        ));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn keeps_only_available_complete_rows_in_source_order() {
        let listings = ListingLoader::default()
            .load(&FrameSource::new(sample_frame()), 100)
            .unwrap();

        let ids: Vec<&str> = listings.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "4", "5"]);
        assert!(listings.iter().all(|l| l.availability_365 > 0));
        assert_eq!(listings[0].neighbourhood_group.as_deref(), Some("Manhattan"));
        assert_eq!(listings[1].room_type, RoomType::SharedRoom);
    }

    #[test]
    fn null_availability_counts_as_malformed() {
        let df = df!(
            "id" => &[1i64, 2, 3, 4],
            "latitude" => &[40.71, 40.72, 40.65, 40.84],
            "longitude" => &[-73.99, -73.95, -73.80, -73.87],
            "room_type" => &["Entire home/apt", "Private room", "Hotel room", "Shared room"],
            "price" => &[100.0, 200.0, 150.0, 45.0],
            "availability_365" => &[Some(30i64), None, Some(0), Some(400)]
        )
        .unwrap();
        let (listings, stats) = ListingLoader::default().listings_with_stats(df).unwrap();

        assert_eq!(listings.len(), 1);
        assert_eq!(
            stats,
            LoadStats {
                source_rows: 4,
                loaded: 1,
                unavailable: 1,
                malformed: 2,
            }
        );
    }

    #[test]
    fn row_limit_applies_before_filtering() {
        let listings = ListingLoader::default()
            .load(&FrameSource::new(sample_frame()), 2)
            .unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].id, "1");
    }

    #[test]
    fn zero_row_limit_is_rejected() {
        let err = ListingLoader::default()
            .load(&FrameSource::new(sample_frame()), 0)
            .unwrap_err();
        assert!(matches!(err, DataSourceError::ZeroRowLimit));
    }

    #[test]
    fn normalization_lowercases_and_drops_license() {
        let df = normalize_columns(sample_frame()).unwrap();
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(names.contains(&"availability_365".to_string()));
        assert!(names.contains(&"neighbourhood_group".to_string()));
        assert!(!names.iter().any(|n| n == "license"));
    }

    #[test]
    fn missing_required_columns_are_reported() {
        let df = df!(
            "id" => &[1i64],
            "latitude" => &[40.7],
            "room_type" => &["Private room"]
        )
        .unwrap();
        let err = ListingLoader::default()
            .load(&FrameSource::new(df), 10)
            .unwrap_err();
        match err {
            DataSourceError::MissingColumns(missing) => {
                assert_eq!(missing, vec!["longitude", "price", "availability_365"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn any_column_policy_drops_rows_with_optional_nulls() {
        let df = df!(
            "id" => &[1i64, 2],
            "latitude" => &[40.71, 40.72],
            "longitude" => &[-73.99, -73.95],
            "room_type" => &["Private room", "Private room"],
            "price" => &[90.0, 95.0],
            "availability_365" => &[10i64, 20],
            "reviews_per_month" => &[None, Some(1.2)]
        )
        .unwrap();

        let lenient = ListingLoader::default()
            .load(&FrameSource::new(df.clone()), 10)
            .unwrap();
        let strict = ListingLoader::new(NullPolicy::AnyColumn)
            .load(&FrameSource::new(df), 10)
            .unwrap();
        assert_eq!(lenient.len(), 2);
        assert_eq!(strict.len(), 1);
        assert_eq!(strict[0].id, "2");
    }

    #[test]
    fn malformed_values_are_dropped() {
        let df = df!(
            "id" => &[1i64, 2, 3, 4],
            "latitude" => &[40.71, 40.72, 40.73, 40.74],
            "longitude" => &[-73.99, -73.95, -73.96, -73.97],
            "room_type" => &["Private room", "Castle", "Private room", "Hotel room"],
            "price" => &[-5.0, 95.0, 60.0, 150.0],
            "availability_365" => &[10i64, 20, 400, 365]
        )
        .unwrap();
        let listings = ListingLoader::default()
            .load(&FrameSource::new(df), 10)
            .unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].id, "4");
    }

    #[test]
    fn parses_currency_prices() {
        assert_eq!(parse_price("$1,250.00"), Some(1250.0));
        assert_eq!(parse_price(" 89 "), Some(89.0));
        assert_eq!(parse_price("n/a"), None);
    }

    #[test]
    fn reads_csv_with_currency_prices() {
        let path = temp_csv(
            "currency",
            "id,Latitude,Longitude,room_type,price,availability_365,license\n\
             10,40.71,-73.99,Entire home/apt,\"$1,250.00\",12,\n\
             11,40.72,-73.95,Private room,$80.00,0,\n\
             12,40.73,-73.96,Private room,$95.00,90,LIC-1\n",
        );
        let listings = ListingLoader::default()
            .load(&CsvSource::new(&path), 100)
            .unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].price, 1250.0);
        assert_eq!(listings[1].id, "12");
        assert_eq!(listings[1].neighbourhood_group, None);
    }

    #[test]
    fn missing_file_is_not_found() {
        let source = CsvSource::new("/definitely/not/here/listings.csv");
        let err = ListingLoader::default().load(&source, 10).unwrap_err();
        assert!(matches!(err, DataSourceError::NotFound(_)));
    }

    #[test]
    fn dataset_slices_match_fresh_reads() {
        let source = FrameSource::new(sample_frame());
        let loader = ListingLoader::default();
        let dataset = Dataset::load(&source, 5, loader).unwrap();

        assert_eq!(dataset.raw_rows(), 5);
        for limit in 1..=5 {
            assert_eq!(
                dataset.listings(limit).unwrap(),
                loader.load(&source, limit).unwrap()
            );
        }
    }
}
