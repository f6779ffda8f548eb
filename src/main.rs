//! NYC Stays - Airbnb listings dashboard
//!
//! Renders the rental activity, price by rental type and top revenue views as
//! static charts and/or JSON tables.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use nyc_stays::charts::{write_json, Chart, JsonSurface, PngSurface, VisualizationSurface};
use nyc_stays::config::DashboardConfig;
use nyc_stays::dashboard::Dashboard;
use nyc_stays::data::RoomType;
use serde::Serialize;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nyc_stays")]
#[command(about = "Airbnb stay data in New York City", long_about = None)]
struct Cli {
    /// JSON config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Listings CSV (overrides the config)
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,

    /// Directory charts are written to (overrides the config)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// What to write for each page
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Both, global = true)]
    format: OutputFormat,

    /// Open rendered images with the system viewer
    #[arg(long, default_value_t = false, global = true)]
    open: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Which boroughs see the most rental activity
    Activity,
    /// Price level of the city with one rental type highlighted
    PriceByType {
        /// Rental type to highlight (defaults to the config's)
        #[arg(short, long, value_enum)]
        room_type: Option<RoomTypeArg>,
    },
    /// Which listings earn the most relative to their area
    Revenue,
    /// Every page
    All,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Png,
    Json,
    Both,
}

#[derive(Clone, Copy, ValueEnum)]
enum RoomTypeArg {
    EntireHome,
    HotelRoom,
    PrivateRoom,
    SharedRoom,
}

impl From<RoomTypeArg> for RoomType {
    fn from(arg: RoomTypeArg) -> Self {
        match arg {
            RoomTypeArg::EntireHome => RoomType::EntireHome,
            RoomTypeArg::HotelRoom => RoomType::HotelRoom,
            RoomTypeArg::PrivateRoom => RoomType::PrivateRoom,
            RoomTypeArg::SharedRoom => RoomType::SharedRoom,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => DashboardConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => DashboardConfig::default(),
    };
    if let Some(data) = cli.data.clone() {
        config.data_path = data;
    }
    if let Some(output) = cli.output.clone() {
        config.output_dir = output;
    }

    let dashboard = Dashboard::open(config).context("opening listings dataset")?;
    let output = Output::new(&dashboard.config().output_dir, cli.format, dashboard.config());

    let mut rendered = Vec::new();
    let run_activity = matches!(cli.command, Commands::Activity | Commands::All);
    let run_revenue = matches!(cli.command, Commands::Revenue | Commands::All);
    let room_type = match cli.command {
        Commands::PriceByType { room_type } => {
            Some(room_type.map(RoomType::from).unwrap_or(dashboard.config().room_type))
        }
        Commands::All => Some(dashboard.config().room_type),
        _ => None,
    };

    if run_activity {
        let page = dashboard.rental_activity().context("rental activity page")?;
        rendered.extend(output.publish(&page.chart, &page.summary)?);
    }
    if let Some(room_type) = room_type {
        let page = dashboard
            .price_by_type(room_type)
            .context("price by rental type page")?;
        rendered.extend(output.publish(&page.chart, &page.summary)?);
    }
    if run_revenue {
        let page = dashboard.top_revenue().context("top revenue page")?;
        rendered.extend(output.publish(&page.chart, &page.summary)?);
    }

    if cli.open {
        for path in rendered.iter().filter(|p| p.extension().is_some_and(|e| e == "png")) {
            if let Err(e) = open::that(path) {
                warn!(path = %path.display(), error = %e, "Could not open chart");
            }
        }
    }

    Ok(())
}

/// Surfaces selected on the command line plus summary export.
struct Output {
    out_dir: PathBuf,
    surfaces: Vec<Box<dyn VisualizationSurface>>,
    write_summaries: bool,
}

impl Output {
    fn new(out_dir: &Path, format: OutputFormat, config: &DashboardConfig) -> Self {
        let mut surfaces: Vec<Box<dyn VisualizationSurface>> = Vec::new();
        if matches!(format, OutputFormat::Png | OutputFormat::Both) {
            surfaces.push(Box::new(PngSurface::new(
                out_dir,
                config.chart.width,
                config.chart.height,
            )));
        }
        let write_summaries = matches!(format, OutputFormat::Json | OutputFormat::Both);
        if write_summaries {
            surfaces.push(Box::new(JsonSurface::new(out_dir)));
        }
        Self {
            out_dir: out_dir.to_path_buf(),
            surfaces,
            write_summaries,
        }
    }

    /// Print the summary, hand the chart to every surface and export the summary.
    fn publish<S: Serialize + Display>(&self, chart: &Chart, summary: &S) -> Result<Vec<PathBuf>> {
        println!("{summary}");

        let mut written = Vec::new();
        for surface in &self.surfaces {
            let path = surface
                .render(chart)
                .with_context(|| format!("rendering {}", chart.name))?;
            written.push(path);
        }

        if self.write_summaries {
            fs::create_dir_all(&self.out_dir)?;
            let path = self.out_dir.join(format!("{}_summary.json", chart.name));
            write_json(&path, summary)
                .with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "Summary exported");
            written.push(path);
        }

        Ok(written)
    }
}
