//! Dashboard configuration.
//!
//! Loaded from a JSON file; every field has a default so a partial file (or
//! none at all) is valid.

use crate::data::{NullPolicy, RoomType, OUTLIER_RATE_THRESHOLD};
use crate::spatial::{GridError, GridSpec, DEFAULT_KEY_PRECISION, DEFAULT_STEP};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
    #[error("Invalid grid config: {0}")]
    Grid(#[from] GridError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub output_dir: PathBuf,
    pub null_policy: NullPolicy,
    pub limits: RowLimits,
    pub grid: GridConfig,
    /// Relative rate above which listings are left off the revenue chart.
    pub outlier_rate_threshold: f64,
    /// Room type highlighted on the price page.
    pub room_type: RoomType,
    pub top_earners: usize,
    pub chart: ChartConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("listings.csv"),
            output_dir: PathBuf::from("charts"),
            null_policy: NullPolicy::default(),
            limits: RowLimits::default(),
            grid: GridConfig::default(),
            outlier_rate_threshold: OUTLIER_RATE_THRESHOLD,
            room_type: RoomType::EntireHome,
            top_earners: 10,
            chart: ChartConfig::default(),
        }
    }
}

/// Raw rows read for each page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RowLimits {
    pub rental_activity: usize,
    pub price_by_type: usize,
    pub top_revenue: usize,
}

impl Default for RowLimits {
    fn default() -> Self {
        Self {
            rental_activity: 10_000,
            price_by_type: 10_000,
            top_revenue: 15_000,
        }
    }
}

impl RowLimits {
    /// The largest limit, i.e. how many rows one shared read must cover.
    pub fn max(&self) -> usize {
        self.rental_activity
            .max(self.price_by_type)
            .max(self.top_revenue)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub lat_step: f64,
    pub lon_step: f64,
    pub key_precision: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            lat_step: DEFAULT_STEP,
            lon_step: DEFAULT_STEP,
            key_precision: DEFAULT_KEY_PRECISION,
        }
    }
}

impl GridConfig {
    pub fn spec(&self) -> Result<GridSpec, GridError> {
        GridSpec::with_steps(self.lat_step, self.lon_step)?.with_precision(self.key_precision)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 700,
        }
    }
}

impl DashboardConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits = [
            ("rental_activity", self.limits.rental_activity),
            ("price_by_type", self.limits.price_by_type),
            ("top_revenue", self.limits.top_revenue),
        ];
        if let Some((page, _)) = limits.iter().find(|(_, limit)| *limit == 0) {
            return Err(ConfigError::Invalid(format!(
                "row limit for {page} must be positive"
            )));
        }
        self.grid.spec()?;
        if !(self.outlier_rate_threshold.is_finite() && self.outlier_rate_threshold > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "outlier_rate_threshold must be positive (got {})",
                self.outlier_rate_threshold
            )));
        }
        if self.chart.width == 0 || self.chart.height == 0 {
            return Err(ConfigError::Invalid("chart size must be non-zero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = DashboardConfig::from_json("{}").unwrap();
        assert_eq!(config.limits.top_revenue, 15_000);
        assert_eq!(config.limits.max(), 15_000);
        assert_eq!(config.outlier_rate_threshold, 15.0);
        assert_eq!(config.grid.spec().unwrap(), GridSpec::default());
        assert_eq!(config.null_policy, NullPolicy::RequiredColumns);
    }

    #[test]
    fn partial_document_overrides_fields() {
        let config = DashboardConfig::from_json(
            r#"{
                "data_path": "data/nyc.csv",
                "null_policy": "any_column",
                "room_type": "hotel_room",
                "limits": { "top_revenue": 500 },
                "grid": { "lat_step": 0.1 }
            }"#,
        )
        .unwrap();
        assert_eq!(config.data_path, PathBuf::from("data/nyc.csv"));
        assert_eq!(config.null_policy, NullPolicy::AnyColumn);
        assert_eq!(config.room_type, RoomType::HotelRoom);
        assert_eq!(config.limits.top_revenue, 500);
        assert_eq!(config.limits.rental_activity, 10_000);
        assert_eq!(config.grid.lat_step, 0.1);
        assert_eq!(config.grid.lon_step, DEFAULT_STEP);
    }

    #[test]
    fn dataset_room_labels_are_accepted() {
        let config = DashboardConfig::from_json(r#"{ "room_type": "Private room" }"#).unwrap();
        assert_eq!(config.room_type, RoomType::PrivateRoom);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            DashboardConfig::from_json(r#"{ "grid": { "lon_step": 0 } }"#),
            Err(ConfigError::Grid(GridError::InvalidStep(_)))
        ));
        assert!(matches!(
            DashboardConfig::from_json(r#"{ "limits": { "price_by_type": 0 } }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            DashboardConfig::from_json(r#"{ "outlier_rate_threshold": -1 }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            DashboardConfig::from_json(r#"{ "grid": { "key_precision": 15 } }"#),
            Err(ConfigError::Grid(GridError::InvalidPrecision(15)))
        ));
        assert!(matches!(
            DashboardConfig::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = DashboardConfig::from_file(Path::new("/no/such/dashboard.json")).unwrap_err();
        assert!(err.to_string().contains("/no/such/dashboard.json"));
    }
}
