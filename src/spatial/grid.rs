//! Grid Module
//! Floor-based latitude/longitude bucketing and precision-bounded cell keys.

use crate::data::Listing;
use std::fmt;
use thiserror::Error;

/// Default bin size in degrees for both axes.
pub const DEFAULT_STEP: f64 = 0.2;
/// Decimal places kept in a cell key.
pub const DEFAULT_KEY_PRECISION: u32 = 4;
/// Keys are scaled integers, so precision is bounded to stay inside `i64`.
pub const MAX_KEY_PRECISION: u32 = 9;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("Grid step must be a positive, finite number of degrees (got {0})")]
    InvalidStep(f64),
    #[error("Key precision must be at most {MAX_KEY_PRECISION} decimal places (got {0})")]
    InvalidPrecision(u32),
}

/// The lower edge of a spatial bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCell {
    pub lat_bin: f64,
    pub lon_bin: f64,
}

/// Lookup key of a grid cell: bin coordinates rounded to a fixed number of
/// decimals, held as scaled integers so equal cells always hash equally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    lat: i64,
    lon: i64,
    precision: u32,
}

impl CellKey {
    pub fn lat(&self) -> f64 {
        self.lat as f64 / 10f64.powi(self.precision as i32)
    }

    pub fn lon(&self) -> f64 {
        self.lon as f64 / 10f64.powi(self.precision as i32)
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat(), self.lon())
    }
}

/// Bin sizes and key precision shared by binning and lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    lat_step: f64,
    lon_step: f64,
    precision: u32,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            lat_step: DEFAULT_STEP,
            lon_step: DEFAULT_STEP,
            precision: DEFAULT_KEY_PRECISION,
        }
    }
}

impl GridSpec {
    /// Same step on both axes.
    pub fn new(step: f64) -> Result<Self, GridError> {
        Self::with_steps(step, step)
    }

    pub fn with_steps(lat_step: f64, lon_step: f64) -> Result<Self, GridError> {
        for step in [lat_step, lon_step] {
            if !(step.is_finite() && step > 0.0) {
                return Err(GridError::InvalidStep(step));
            }
        }
        Ok(Self {
            lat_step,
            lon_step,
            precision: DEFAULT_KEY_PRECISION,
        })
    }

    pub fn with_precision(mut self, precision: u32) -> Result<Self, GridError> {
        if precision > MAX_KEY_PRECISION {
            return Err(GridError::InvalidPrecision(precision));
        }
        self.precision = precision;
        Ok(self)
    }

    pub fn lat_step(&self) -> f64 {
        self.lat_step
    }

    pub fn lon_step(&self) -> f64 {
        self.lon_step
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// Snap a coordinate pair down to the lower edge of its bin.
    ///
    /// This is floor division, not rounding: coordinates on either side of a
    /// bin edge land in different cells however close they are.
    pub fn cell_of(&self, latitude: f64, longitude: f64) -> GridCell {
        GridCell {
            lat_bin: (latitude / self.lat_step).floor() * self.lat_step,
            lon_bin: (longitude / self.lon_step).floor() * self.lon_step,
        }
    }

    pub fn key_of(&self, cell: GridCell) -> CellKey {
        let scale = 10f64.powi(self.precision as i32);
        CellKey {
            lat: (cell.lat_bin * scale).round() as i64,
            lon: (cell.lon_bin * scale).round() as i64,
            precision: self.precision,
        }
    }

    /// Key of the cell a listing falls in, always derived from its coordinates.
    pub fn key_for(&self, listing: &Listing) -> CellKey {
        self.key_of(self.cell_of(listing.latitude, listing.longitude))
    }
}
