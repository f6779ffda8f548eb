//! Dashboard Module
//! Reads the listings once and builds any page from the shared read.

use crate::config::DashboardConfig;
use crate::data::{CsvSource, Dataset, ListingLoader, ListingSource, OutlierFilter, RoomType};
use crate::pages::{PageError, PriceByType, RentalActivity, TopRevenue};
use crate::spatial::GridSpec;
use tracing::info;

pub struct Dashboard {
    config: DashboardConfig,
    grid: GridSpec,
    dataset: Dataset,
}

impl Dashboard {
    /// Open the CSV named by the config.
    pub fn open(config: DashboardConfig) -> Result<Self, PageError> {
        let source = CsvSource::new(&config.data_path);
        Self::from_source(config, &source)
    }

    pub fn from_source(
        config: DashboardConfig,
        source: &dyn ListingSource,
    ) -> Result<Self, PageError> {
        let grid = config.grid.spec()?;
        let loader = ListingLoader::new(config.null_policy);
        let dataset = Dataset::load(source, config.limits.max(), loader)?;
        info!(
            path = %config.data_path.display(),
            raw_rows = dataset.raw_rows(),
            "Dataset opened"
        );
        Ok(Self {
            config,
            grid,
            dataset,
        })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn rental_activity(&self) -> Result<RentalActivity, PageError> {
        let listings = self.dataset.listings(self.config.limits.rental_activity)?;
        Ok(RentalActivity::build(&listings)?)
    }

    pub fn price_by_type(&self, room_type: RoomType) -> Result<PriceByType, PageError> {
        let listings = self.dataset.listings(self.config.limits.price_by_type)?;
        Ok(PriceByType::build(&listings, room_type)?)
    }

    pub fn top_revenue(&self) -> Result<TopRevenue, PageError> {
        let listings = self.dataset.listings(self.config.limits.top_revenue)?;
        TopRevenue::build(
            &listings,
            self.grid,
            OutlierFilter::new(self.config.outlier_rate_threshold),
            self.config.top_earners,
        )
    }
}
