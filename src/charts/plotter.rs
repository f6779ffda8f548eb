//! Chart Plotter Module
//! Colour scales, density gridding and marker sizing shared by the renderers.

use plotters::style::RGBColor;

/// Heatmap colours, low to high.
pub const HEAT_SCALE: [RGBColor; 6] = [
    RGBColor(255, 255, 178),
    RGBColor(254, 217, 118),
    RGBColor(254, 178, 76),
    RGBColor(253, 141, 60),
    RGBColor(240, 59, 32),
    RGBColor(189, 0, 38),
];

/// ColorBrewer blue scale for price layers, cheap to expensive.
pub const BLUE_SCALE: [RGBColor; 6] = [
    RGBColor(240, 249, 232),
    RGBColor(204, 235, 197),
    RGBColor(168, 221, 181),
    RGBColor(123, 204, 196),
    RGBColor(67, 162, 202),
    RGBColor(8, 104, 172),
];

pub const HIGHLIGHT_COLOR: RGBColor = RGBColor(255, 140, 0); // Orange
pub const BUBBLE_COLOR: RGBColor = RGBColor(76, 120, 168); // Blue

/// How the weights falling in one density cell are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    Sum,
    Mean,
}

/// One non-empty rectangle of a density grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensityCell {
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
    pub value: f64,
}

/// Points accumulated into an `nx` by `ny` grid over their bounding box.
#[derive(Debug, Clone)]
pub struct DensityGrid {
    x_range: (f64, f64),
    y_range: (f64, f64),
    nx: usize,
    ny: usize,
    sums: Vec<f64>,
    counts: Vec<usize>,
}

impl DensityGrid {
    /// Returns `None` when there are no points or the grid has no cells.
    /// Missing weights count each point once.
    pub fn build(
        xs: &[f64],
        ys: &[f64],
        weights: Option<&[f64]>,
        nx: usize,
        ny: usize,
    ) -> Option<Self> {
        if xs.is_empty() || nx == 0 || ny == 0 {
            return None;
        }
        let x_range = padded_range(xs, 0.0);
        let y_range = padded_range(ys, 0.0);

        let mut grid = Self {
            x_range,
            y_range,
            nx,
            ny,
            sums: vec![0.0; nx * ny],
            counts: vec![0; nx * ny],
        };

        for (i, (&x, &y)) in xs.iter().zip(ys).enumerate() {
            let weight = weights.and_then(|w| w.get(i)).copied().unwrap_or(1.0);
            let idx = grid.index(x, y);
            grid.sums[idx] += weight;
            grid.counts[idx] += 1;
        }

        Some(grid)
    }

    pub fn x_range(&self) -> (f64, f64) {
        self.x_range
    }

    pub fn y_range(&self) -> (f64, f64) {
        self.y_range
    }

    fn index(&self, x: f64, y: f64) -> usize {
        let col = Self::bucket(x, self.x_range, self.nx);
        let row = Self::bucket(y, self.y_range, self.ny);
        row * self.nx + col
    }

    fn bucket(v: f64, (lo, hi): (f64, f64), n: usize) -> usize {
        let t = (v - lo) / (hi - lo);
        ((t * n as f64).floor().max(0.0) as usize).min(n - 1)
    }

    /// Non-empty cells with their aggregated value.
    pub fn cells(&self, aggregation: Aggregation) -> Vec<DensityCell> {
        let dx = (self.x_range.1 - self.x_range.0) / self.nx as f64;
        let dy = (self.y_range.1 - self.y_range.0) / self.ny as f64;

        (0..self.nx * self.ny)
            .filter(|&idx| self.counts[idx] > 0)
            .map(|idx| {
                let col = idx % self.nx;
                let row = idx / self.nx;
                let value = match aggregation {
                    Aggregation::Sum => self.sums[idx],
                    Aggregation::Mean => self.sums[idx] / self.counts[idx] as f64,
                };
                DensityCell {
                    x0: self.x_range.0 + col as f64 * dx,
                    x1: self.x_range.0 + (col + 1) as f64 * dx,
                    y0: self.y_range.0 + row as f64 * dy,
                    y1: self.y_range.0 + (row + 1) as f64 * dy,
                    value,
                }
            })
            .collect()
    }
}

/// Min and max of `values` widened by `pad` (a fraction of the span).
/// A degenerate span is widened to keep the axis drawable.
pub fn padded_range(values: &[f64], pad: f64) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in values {
        if v.is_finite() {
            min = min.min(v);
            max = max.max(v);
        }
    }
    if min.is_infinite() {
        return (0.0, 1.0);
    }
    if max - min < f64::EPSILON {
        return (min - 0.5, max + 0.5);
    }
    let margin = (max - min) * pad;
    (min - margin, max + margin)
}

/// Colour at position `t` (clamped to 0..=1) along a piecewise-linear scale.
pub fn color_at(scale: &[RGBColor], t: f64) -> RGBColor {
    match scale.len() {
        0 => RGBColor(0, 0, 0),
        1 => scale[0],
        n => {
            let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
            let pos = t * (n - 1) as f64;
            let lower = (pos.floor() as usize).min(n - 2);
            let frac = pos - lower as f64;
            let (a, b) = (scale[lower], scale[lower + 1]);
            let lerp = |from: u8, to: u8| {
                (from as f64 + (to as f64 - from as f64) * frac).round() as u8
            };
            RGBColor(lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
        }
    }
}

/// Marker radius in pixels with area proportional to `size`.
pub fn bubble_radius(size: f64, max_size: f64, min_px: u32, max_px: u32) -> u32 {
    if !(size.is_finite() && max_size.is_finite()) || max_size <= 0.0 || size <= 0.0 {
        return min_px;
    }
    let t = (size / max_size).clamp(0.0, 1.0).sqrt();
    (min_px as f64 + (max_px - min_px) as f64 * t).round() as u32
}
