use nyc_stays::charts::{JsonSurface, VisualizationSurface};
use nyc_stays::config::DashboardConfig;
use nyc_stays::dashboard::Dashboard;
use nyc_stays::data::{
    CsvSource, Enricher, ListingLoader, NullPolicy, OutlierFilter, RoomType, DAYS_PER_YEAR,
};
use nyc_stays::pages::RevenueAnalysis;
use nyc_stays::spatial::{GridSpec, SpatialBinner};
use std::path::PathBuf;

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/listings.csv")
}

#[test]
fn loads_only_actively_rented_complete_listings() {
    let listings = ListingLoader::default()
        .load(&CsvSource::new(fixture()), 15_000)
        .expect("fixture should load");

    assert_eq!(listings.len(), 26);
    assert!(listings.iter().all(|l| l.availability_365 > 0));
    assert!(!listings.iter().any(|l| l.id == "1400" || l.id == "1401" || l.id == "1500"));
    assert_eq!(listings[0].id, "1001");
    assert_eq!(listings.last().map(|l| l.id.as_str()), Some("1300"));
}

#[test]
fn strict_null_policy_matches_dropping_any_incomplete_row() {
    let source = CsvSource::new(fixture());
    let lenient = ListingLoader::default().load(&source, 100).unwrap();
    let strict = ListingLoader::new(NullPolicy::AnyColumn)
        .load(&source, 100)
        .unwrap();

    assert_eq!(strict.len(), 21);
    assert!(strict.len() < lenient.len());
}

#[test]
fn cell_means_cover_exactly_their_members() {
    let listings = ListingLoader::default()
        .load(&CsvSource::new(fixture()), 100)
        .unwrap();
    let grid = GridSpec::default();
    let averages = SpatialBinner::new(grid).bin(&listings);

    assert_eq!(averages.len(), 3);
    for (key, summary) in averages.iter() {
        let members: Vec<f64> = listings
            .iter()
            .filter(|l| grid.key_for(l) == *key)
            .map(|l| l.price)
            .collect();
        assert_eq!(summary.count, members.len());
        let expected = members.iter().sum::<f64>() / members.len() as f64;
        assert!((summary.mean_price() - expected).abs() < 1e-9);
    }

    let manhattan = grid.key_of(grid.cell_of(40.745, -73.98));
    assert_eq!(averages.mean_price(&manhattan), Some(488.0));
}

#[test]
fn revenue_pipeline_excludes_only_outliers() {
    let listings = ListingLoader::default()
        .load(&CsvSource::new(fixture()), 15_000)
        .unwrap();
    let analysis =
        RevenueAnalysis::run(&listings, GridSpec::default(), OutlierFilter::default()).unwrap();

    assert_eq!(analysis.cells, 3);
    assert_eq!(analysis.charted.len(), 25);
    assert_eq!(analysis.excluded.len(), 1);
    assert_eq!(analysis.excluded[0].listing.id, "1099");
    assert_eq!(analysis.excluded[0].relative_rate, Some(18.44));
    assert!(analysis
        .charted
        .iter()
        .all(|e| e.relative_rate.is_some_and(|r| r <= 15.0)));
    assert!(analysis
        .charted
        .iter()
        .all(|e| e.occupied_nights + e.listing.availability_365 == DAYS_PER_YEAR));
}

#[test]
fn rerunning_the_pipeline_is_bit_identical() {
    let run = || {
        let listings = ListingLoader::default()
            .load(&CsvSource::new(fixture()), 100)
            .unwrap();
        let averages = SpatialBinner::default().bin(&listings);
        Enricher::new(&averages)
            .enrich_all(&listings)
            .unwrap()
            .into_iter()
            .map(|e| e.relative_rate.map(f64::to_bits))
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

#[test]
fn dashboard_exports_every_page_as_json() {
    let out_dir = std::env::temp_dir().join(format!("nyc_stays_pipeline_{}", std::process::id()));
    let config = DashboardConfig {
        data_path: fixture(),
        output_dir: out_dir.clone(),
        ..DashboardConfig::default()
    };
    let dashboard = Dashboard::open(config).unwrap();
    let surface = JsonSurface::new(&out_dir);

    let activity = dashboard.rental_activity().unwrap();
    assert_eq!(activity.summary.boroughs[0].borough, "Manhattan");
    assert_eq!(activity.summary.boroughs[0].listings, 20);

    let price = dashboard.price_by_type(RoomType::PrivateRoom).unwrap();
    assert_eq!(price.summary.by_room_type[&RoomType::PrivateRoom].count, 13);

    let revenue = dashboard.top_revenue().unwrap();
    let path = surface.render(&revenue.chart).unwrap();
    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    std::fs::remove_dir_all(&out_dir).ok();

    assert_eq!(written["records"].as_array().unwrap().len(), 25);
    assert_eq!(written["kind"]["size"], "relative_rate");
}
