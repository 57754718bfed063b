//! Draws the weight distribution (a donut chart) next to a bar chart comparing the personal
//! index with the benchmark, and a box with the comparison sentence.
//!
//! The geometry of the donut is computed by `pie_layout` so that it can be checked without a
//! drawing backend. `render` turns it into an SVG or PNG file.

use crate::model::{CpiResult, UserWeight, Weights};
use crate::Result;
use anyhow::bail;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::ops::Range;
use std::path::Path;
use tracing::{debug, info};

/// Width and height of the whole figure in pixels.
const SIZE: (u32, u32) = (1600, 900);

/// Width of the donut panel. The bar panel gets the rest (about 5:4).
const PIE_PANEL_WIDTH: i32 = 890;

/// Wedge colors, assigned in drawing order.
pub const PALETTE: [RGBColor; 10] = [
    RGBColor(0xBA, 0xB0, 0xAC),
    RGBColor(0x9D, 0x75, 0x5D),
    RGBColor(0xFF, 0x9D, 0xA6),
    RGBColor(0xB2, 0x79, 0xA2),
    RGBColor(0xEE, 0xCA, 0x3B),
    RGBColor(0x54, 0xA2, 0x4B),
    RGBColor(0x72, 0xB7, 0xB2),
    RGBColor(0xE4, 0x57, 0x56),
    RGBColor(0xF5, 0x85, 0x18),
    RGBColor(0x4C, 0x78, 0xA8),
];

const BENCHMARK_COLOR: RGBColor = RGBColor(211, 211, 211);
const USER_COLOR: RGBColor = RGBColor(31, 119, 180);

/// The first wedge starts at 12 o'clock and wedges run counter-clockwise.
const START_ANGLE: f64 = 90.0;

/// The donut hole, as a fraction of the radius. The ring is 0.7 of the radius wide.
const INNER_RADIUS: f64 = 0.3;

/// Where the percentage labels sit, as a fraction of the radius.
const PCT_DISTANCE: f64 = 0.7;

const LABEL_X: f64 = 1.2;
const LABEL_Y_SCALE: f64 = 1.3;

/// The smallest half extents of the donut plot, leaving room for the outside labels.
const PIE_HALF_X: f64 = 1.9;
const PIE_HALF_Y: f64 = 1.7;

const BAR_LABELS: [&str; 2] = ["General Household", "You"];
const BAR_HALF_WIDTH: f64 = 0.25;
const Y_MIN: f64 = 60.0;
const Y_MAX: f64 = 150.0;

/// Which side of the donut a category's label is placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// One wedge of the donut. Angles are in degrees, measured counter-clockwise from 3 o'clock.
#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub raw: u8,
    pub percent: f64,
    pub theta1: f64,
    pub theta2: f64,
    pub color: RGBColor,
}

impl PieSlice {
    pub fn mid_angle(&self) -> f64 {
        (self.theta1 + self.theta2) / 2.0
    }

    /// Labels go on the right when the middle of the wedge points right (or straight up or down).
    pub fn side(&self) -> Side {
        if self.mid_angle().to_radians().cos() >= 0.0 {
            Side::Right
        } else {
            Side::Left
        }
    }

    /// Where the leader line touches the outside of the wedge.
    pub fn anchor(&self) -> (f64, f64) {
        unit(self.mid_angle())
    }

    /// Where the leader line turns from radial to horizontal.
    pub fn elbow(&self) -> (f64, f64) {
        let (x, y) = self.anchor();
        (x * LABEL_Y_SCALE, y * LABEL_Y_SCALE)
    }

    /// Where the label text starts (on the right) or ends (on the left).
    pub fn label_position(&self) -> (f64, f64) {
        let (_, y) = self.anchor();
        let x = match self.side() {
            Side::Right => LABEL_X,
            Side::Left => -LABEL_X,
        };
        (x, y * LABEL_Y_SCALE)
    }

    pub fn percent_position(&self) -> (f64, f64) {
        let (x, y) = self.anchor();
        (x * PCT_DISTANCE, y * PCT_DISTANCE)
    }

    /// The outline of the ring segment: the outer arc forward, then the inner arc back.
    pub fn ring_points(&self) -> Vec<(f64, f64)> {
        let span = self.theta2 - self.theta1;
        let steps = ((span / 2.0).ceil() as usize).max(2);
        let arc = |r: f64| {
            (0..=steps).map(move |i| {
                let (x, y) = unit(self.theta1 + span * i as f64 / steps as f64);
                (x * r, y * r)
            })
        };
        let mut points: Vec<(f64, f64)> = arc(1.0).collect();
        let inner: Vec<(f64, f64)> = arc(INNER_RADIUS).collect();
        points.extend(inner.into_iter().rev());
        points
    }
}

fn unit(degrees: f64) -> (f64, f64) {
    let rad = degrees.to_radians();
    (rad.cos(), rad.sin())
}

/// Lays out the donut with categories in ascending order of raw weight (ties keep their order),
/// so that small wedges sit together.
pub fn pie_layout(weights: &Weights) -> Vec<PieSlice> {
    let sorted: Vec<&UserWeight> = weights.sorted_by_raw();
    let total: f64 = sorted.iter().map(|w| f64::from(w.raw_value())).sum();
    let mut angle = START_ANGLE;
    sorted
        .into_iter()
        .enumerate()
        .map(|(i, w)| {
            let share = if total > 0.0 {
                f64::from(w.raw_value()) / total
            } else {
                0.0
            };
            let theta1 = angle;
            angle += share * 360.0;
            PieSlice {
                label: w.category_name().to_string(),
                raw: w.raw_value(),
                percent: share * 100.0,
                theta1,
                theta2: angle,
                color: PALETTE[i % PALETTE.len()],
            }
        })
        .collect()
}

/// Writes the figure to `path`. A `.png` extension produces a bitmap; `.svg` (or no extension)
/// produces an SVG.
pub fn render(path: &Path, weights: &Weights, result: &CpiResult) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => draw(
            BitMapBackend::new(path, SIZE).into_drawing_area(),
            weights,
            result,
        )?,
        Some("svg") | None => draw(
            SVGBackend::new(path, SIZE).into_drawing_area(),
            weights,
            result,
        )?,
        Some(other) => bail!("Unsupported chart format '{other}', use .svg or .png"),
    }
    info!("Chart saved to {}", path.display());
    Ok(())
}

fn draw<DB>(root: DrawingArea<DB, Shift>, weights: &Weights, result: &CpiResult) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    let (left, right) = root.split_horizontally(PIE_PANEL_WIDTH);
    draw_pie(&left, weights)?;
    draw_bars(&right, result)?;
    draw_annotation(&root, &result.comparison().to_string())?;
    root.present()?;
    Ok(())
}

fn title_font() -> FontDesc<'static> {
    ("sans-serif", 40).into_font().style(FontStyle::Bold)
}

fn draw_pie<DB>(area: &DrawingArea<DB, Shift>, weights: &Weights) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let slices: Vec<PieSlice> = pie_layout(weights)
        .into_iter()
        .filter(|s| s.raw > 0)
        .collect();
    debug!("Drawing {} wedges", slices.len());

    let plot = area
        .titled("Your CPI Component Weights", title_font())?
        .margin(20, 20, 20, 20);
    let (width, height) = plot.dim_in_pixel();
    let (x_range, y_range) = pie_ranges(width, height);
    let mut chart = ChartBuilder::on(&plot).build_cartesian_2d(x_range, y_range)?;

    chart.draw_series(
        slices
            .iter()
            .map(|s| Polygon::new(s.ring_points(), s.color.filled())),
    )?;

    let pct_style = TextStyle::from(("sans-serif", 20).into_font())
        .pos(Pos::new(HPos::Center, VPos::Center));
    chart.draw_series(
        slices
            .iter()
            .map(|s| Text::new(format!("{:.1}%", s.percent), s.percent_position(), pct_style.clone())),
    )?;

    chart.draw_series(slices.iter().map(|s| {
        PathElement::new(
            vec![s.anchor(), s.elbow(), s.label_position()],
            BLACK.stroke_width(1),
        )
    }))?;

    let label_font = ("sans-serif", 22).into_font();
    chart.draw_series(slices.iter().map(|s| {
        let h_pos = match s.side() {
            Side::Right => HPos::Left,
            Side::Left => HPos::Right,
        };
        let style = TextStyle::from(label_font.clone()).pos(Pos::new(h_pos, VPos::Center));
        Text::new(s.label.clone(), s.label_position(), style)
    }))?;

    Ok(())
}

/// Coordinate ranges for a plot of `width` x `height` pixels that cover at least `PIE_HALF_X`
/// by `PIE_HALF_Y` around the origin with the same scale on both axes, so the donut stays round.
fn pie_ranges(width: u32, height: u32) -> (Range<f64>, Range<f64>) {
    let (w, h) = (f64::from(width.max(1)), f64::from(height.max(1)));
    let per_pixel = (2.0 * PIE_HALF_X / w).max(2.0 * PIE_HALF_Y / h);
    let (half_x, half_y) = (per_pixel * w / 2.0, per_pixel * h / 2.0);
    (-half_x..half_x, -half_y..half_y)
}

fn bar_label(x: f64) -> String {
    BAR_LABELS
        .iter()
        .enumerate()
        .find(|(i, _)| (x - *i as f64).abs() < 1e-6)
        .map(|(_, label)| label.to_string())
        .unwrap_or_default()
}

fn draw_bars<DB>(area: &DrawingArea<DB, Shift>, result: &CpiResult) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let mut chart = ChartBuilder::on(area)
        .caption("CPI Benchmark Comparison", title_font())
        .margin(20)
        .x_label_area_size(70)
        .build_cartesian_2d(-0.5f64..1.5f64, Y_MIN..Y_MAX)?;

    // Only the bottom axis line is drawn: no grid, no y axis, no tick marks.
    chart
        .configure_mesh()
        .disable_mesh()
        .disable_y_axis()
        .y_labels(0)
        .x_labels(5)
        .set_all_tick_mark_size(0)
        .x_label_formatter(&|x| bar_label(*x))
        .x_label_style(("sans-serif", 26).into_font())
        .axis_style(BLACK.stroke_width(1))
        .draw()?;

    let bars = [
        (result.benchmark(), BENCHMARK_COLOR),
        (result.computed(), USER_COLOR),
    ];
    chart.draw_series(bars.iter().enumerate().map(|(i, (value, color))| {
        let x = i as f64;
        Rectangle::new(
            [(x - BAR_HALF_WIDTH, Y_MIN), (x + BAR_HALF_WIDTH, *value)],
            color.filled(),
        )
    }))?;

    let value_style = TextStyle::from(("sans-serif", 22).into_font().style(FontStyle::Bold))
        .pos(Pos::new(HPos::Center, VPos::Top));
    chart.draw_series(bars.iter().enumerate().map(|(i, (value, _))| {
        Text::new(
            format!("{value:.1}"),
            (i as f64, value - 2.0),
            value_style.clone(),
        )
    }))?;

    Ok(())
}

fn draw_annotation<DB>(root: &DrawingArea<DB, Shift>, text: &str) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let style = TextStyle::from(("sans-serif", 22).into_font().style(FontStyle::Bold)).color(&BLACK);
    let (w, h) = root.estimate_text_size(text, &style)?;
    let (w, h) = (w as i32, h as i32);
    let pad = 10;
    let (width, height) = (SIZE.0 as i32, SIZE.1 as i32);
    let x = (width * 6 / 10).min(width - w - 2 * pad - 10);
    let y = height * 2 / 10;

    let corners = [(x - pad, y - h / 2 - pad), (x + w + pad, y + h / 2 + pad)];
    root.draw(&Rectangle::new(corners, WHITE.filled()))?;
    root.draw(&Rectangle::new(corners, BLACK.stroke_width(1)))?;
    root.draw(&Text::new(
        text.to_string(),
        (x, y),
        style.pos(Pos::new(HPos::Left, VPos::Center)),
    ))?;
    Ok(())
}
