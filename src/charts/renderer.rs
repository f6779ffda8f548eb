//! Static Chart Renderer
//! Draws charts to PNG files with plotters.
//!
//! Layout:
//! 1. Title centered above the plot
//! 2. Heatmap / overlay: coloured density rectangles, highlighted points on top
//! 3. Bubble: hollow circles sized by the size field

use crate::charts::plotter::{
    bubble_radius, color_at, padded_range, Aggregation, DensityCell, DensityGrid, BLUE_SCALE,
    BUBBLE_COLOR, HEAT_SCALE, HIGHLIGHT_COLOR,
};
use crate::charts::surface::{Chart, ChartError, ChartKind, VisualizationSurface};
use plotters::prelude::*;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::info;

/// Density grid resolution along each axis.
const DENSITY_CELLS: usize = 120;
const BUBBLE_MIN_PX: u32 = 2;
const BUBBLE_MAX_PX: u32 = 14;

type DrawResult = Result<(), Box<dyn std::error::Error>>;

/// Renders charts as PNG images into a directory.
pub struct PngSurface {
    out_dir: PathBuf,
    width: u32,
    height: u32,
}

impl PngSurface {
    pub fn new(out_dir: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Self {
            out_dir: out_dir.into(),
            width,
            height,
        }
    }
}

/// Everything needed to draw one density layer with optional points.
struct DensityPlot<'a> {
    cells: Vec<DensityCell>,
    scale: &'a [RGBColor],
    points: Vec<(f64, f64)>,
    x_range: Range<f64>,
    y_range: Range<f64>,
}

impl VisualizationSurface for PngSurface {
    fn render(&self, chart: &Chart) -> Result<PathBuf, ChartError> {
        fs::create_dir_all(&self.out_dir)?;
        let path = self.out_dir.join(format!("{}.png", chart.name));
        let table = &chart.table;

        let drawn = match &chart.kind {
            ChartKind::Heatmap { x, y } => {
                let xs = table.numeric(x)?;
                let ys = table.numeric(y)?;
                let plot = Self::density_plot(
                    xs,
                    ys,
                    table.weights(),
                    Aggregation::Sum,
                    &HEAT_SCALE,
                    Vec::new(),
                );
                self.draw_density(&path, chart, plot)
            }
            ChartKind::Overlay {
                x,
                y,
                category,
                highlight,
            } => {
                let xs = table.numeric(x)?;
                let ys = table.numeric(y)?;
                let categories = table.categorical(category)?;
                let points = xs
                    .iter()
                    .zip(ys)
                    .zip(categories)
                    .filter(|(_, c)| *c == highlight)
                    .map(|((&px, &py), _)| (px, py))
                    .collect();
                let plot = Self::density_plot(
                    xs,
                    ys,
                    table.weights(),
                    Aggregation::Mean,
                    &BLUE_SCALE,
                    points,
                );
                self.draw_density(&path, chart, plot)
            }
            ChartKind::Bubble { x, y, size } => {
                let xs = table.numeric(x)?;
                let ys = table.numeric(y)?;
                let sizes = table.numeric(size)?;
                self.draw_bubbles(&path, chart, xs, ys, sizes)
            }
        };
        drawn.map_err(|e| ChartError::Render(e.to_string()))?;

        info!(chart = %chart.name, rows = table.len(), path = %path.display(), "Chart rendered");
        Ok(path)
    }
}

impl PngSurface {
    fn density_plot<'a>(
        xs: &[f64],
        ys: &[f64],
        weights: Option<&[f64]>,
        aggregation: Aggregation,
        scale: &'a [RGBColor],
        points: Vec<(f64, f64)>,
    ) -> DensityPlot<'a> {
        match DensityGrid::build(xs, ys, weights, DENSITY_CELLS, DENSITY_CELLS) {
            Some(grid) => {
                let (x0, x1) = grid.x_range();
                let (y0, y1) = grid.y_range();
                DensityPlot {
                    cells: grid.cells(aggregation),
                    scale,
                    points,
                    x_range: x0..x1,
                    y_range: y0..y1,
                }
            }
            None => DensityPlot {
                cells: Vec::new(),
                scale,
                points,
                x_range: 0.0..1.0,
                y_range: 0.0..1.0,
            },
        }
    }

    fn draw_density(&self, path: &Path, chart: &Chart, plot: DensityPlot<'_>) -> DrawResult {
        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, ("sans-serif", 26))
            .margin(20)
            .x_label_area_size(45)
            .y_label_area_size(70)
            .build_cartesian_2d(plot.x_range, plot.y_range)?;

        ctx.configure_mesh()
            .disable_mesh()
            .x_desc(chart.x_label.as_str())
            .y_desc(chart.y_label.as_str())
            .draw()?;

        let max = plot
            .cells
            .iter()
            .map(|c| c.value)
            .fold(0.0_f64, f64::max);
        let scale = plot.scale;
        ctx.draw_series(plot.cells.iter().map(|c| {
            let t = if max > 0.0 { c.value / max } else { 0.0 };
            Rectangle::new(
                [(c.x0, c.y0), (c.x1, c.y1)],
                color_at(scale, t).mix(0.6).filled(),
            )
        }))?;

        if !plot.points.is_empty() {
            ctx.draw_series(plot.points.iter().map(|&(x, y)| {
                Circle::new((x, y), 3u32, HIGHLIGHT_COLOR.mix(0.8).filled())
            }))?;
        }

        root.present()?;
        Ok(())
    }

    fn draw_bubbles(
        &self,
        path: &Path,
        chart: &Chart,
        xs: &[f64],
        ys: &[f64],
        sizes: &[f64],
    ) -> DrawResult {
        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE)?;

        let (x0, x1) = padded_range(xs, 0.05);
        let (y0, y1) = padded_range(ys, 0.05);
        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, ("sans-serif", 26))
            .margin(20)
            .x_label_area_size(45)
            .y_label_area_size(70)
            .build_cartesian_2d(x0.max(0.0)..x1, y0.max(0.0)..y1)?;

        ctx.configure_mesh()
            .x_desc(chart.x_label.as_str())
            .y_desc(chart.y_label.as_str())
            .draw()?;

        let max_size = sizes.iter().copied().fold(0.0_f64, f64::max);
        ctx.draw_series(xs.iter().zip(ys).zip(sizes).map(|((&x, &y), &s)| {
            Circle::new(
                (x, y),
                bubble_radius(s, max_size, BUBBLE_MIN_PX, BUBBLE_MAX_PX),
                BUBBLE_COLOR.mix(0.7).stroke_width(1),
            )
        }))?;

        root.present()?;
        Ok(())
    }
}
