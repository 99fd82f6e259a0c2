//! SVG chart rendering for the report stage.

use std::ops::Range;
use std::path::Path;

use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use tracing::{debug, warn};

use crate::analytics::{histogram_bins, Breakdown};
use crate::error::Result;
use crate::table::ensure_parent_dir;

type DrawResult<DB> =
    std::result::Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

pub const SINGLE_SIZE: (u32, u32) = (1000, 600);
pub const GRID_SIZE: (u32, u32) = (1600, 1200);

const HISTOGRAM_BINS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Line,
}

#[derive(Debug, Clone)]
pub struct Chart {
    pub kind: ChartKind,
    pub title: String,
    pub x_desc: &'static str,
    pub y_desc: &'static str,
    pub points: Vec<(String, Option<f64>)>,
}

impl Chart {
    pub fn bar(title: &str, x_desc: &'static str, y_desc: &'static str, data: &Breakdown) -> Self {
        Self::from_breakdown(ChartKind::Bar, title, x_desc, y_desc, data)
    }

    pub fn line(title: &str, x_desc: &'static str, y_desc: &'static str, data: &Breakdown) -> Self {
        Self::from_breakdown(ChartKind::Line, title, x_desc, y_desc, data)
    }

    fn from_breakdown(
        kind: ChartKind,
        title: &str,
        x_desc: &'static str,
        y_desc: &'static str,
        data: &Breakdown,
    ) -> Self {
        Self {
            kind,
            title: title.to_string(),
            x_desc,
            y_desc,
            points: data.entries.clone(),
        }
    }

    fn present_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().filter_map(|(_, value)| *value)
    }

    fn label_at(&self, idx: u32) -> String {
        self.points
            .get(idx as usize)
            .map(|(key, _)| key.clone())
            .unwrap_or_default()
    }
}

/// Axis range covering every value and zero, padded so bars do not touch the frame.
fn value_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (mut low, mut high) = (0.0f64, 0.0f64);
    for value in values {
        low = low.min(value);
        high = high.max(value);
    }
    if high == low {
        high = low + 1.0;
    }
    let pad = (high - low) * 0.05;
    let low = if low < 0.0 { low - pad } else { low };
    low..high + pad
}

fn draw_bars<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, data: &Chart) -> DrawResult<DB> {
    let count = data.points.len() as u32;
    let mut chart = ChartBuilder::on(area)
        .caption(&data.title, ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d((0u32..count).into_segmented(), value_range(data.present_values()))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(data.x_desc)
        .y_desc(data.y_desc)
        .x_labels(data.points.len())
        .x_label_formatter(&|segment| match segment {
            SegmentValue::Exact(idx) | SegmentValue::CenterOf(idx) => data.label_at(*idx),
            SegmentValue::Last => String::new(),
        })
        .draw()?;

    chart.draw_series(
        Histogram::vertical(&chart)
            .style(BLUE.mix(0.6).filled())
            .margin(4)
            .data(
                data.points
                    .iter()
                    .enumerate()
                    .filter_map(|(idx, (_, value))| value.map(|v| (idx as u32, v))),
            ),
    )?;
    Ok(())
}

fn draw_line<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, data: &Chart) -> DrawResult<DB> {
    let last = (data.points.len() as u32).saturating_sub(1).max(1);
    let mut chart = ChartBuilder::on(area)
        .caption(&data.title, ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(0u32..last, value_range(data.present_values()))?;

    chart
        .configure_mesh()
        .x_desc(data.x_desc)
        .y_desc(data.y_desc)
        .x_labels(data.points.len().min(12))
        .x_label_formatter(&|idx| data.label_at(*idx))
        .draw()?;

    let points: Vec<(u32, f64)> = data
        .points
        .iter()
        .enumerate()
        .filter_map(|(idx, (_, value))| value.map(|v| (idx as u32, v)))
        .collect();
    chart.draw_series(LineSeries::new(points, RED.stroke_width(2)))?;
    Ok(())
}

fn draw_chart<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, data: &Chart) -> DrawResult<DB> {
    if data.present_values().next().is_none() {
        warn!(title = %data.title, "no values to plot");
        area.titled(&format!("{} (no data)", data.title), ("sans-serif", 22))?;
        return Ok(());
    }
    match data.kind {
        ChartKind::Bar => draw_bars(area, data),
        ChartKind::Line => draw_line(area, data),
    }
}

pub fn render_chart(path: &Path, chart: &Chart) -> Result<()> {
    ensure_parent_dir(path)?;
    let root = SVGBackend::new(path, SINGLE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    draw_chart(&root, chart)?;
    root.present()?;
    debug!(path = %path.display(), title = %chart.title, "chart written");
    Ok(())
}

/// Lays out up to four charts on a 2×2 grid in reading order.
pub fn render_grid(path: &Path, charts: &[Chart]) -> Result<()> {
    ensure_parent_dir(path)?;
    let root = SVGBackend::new(path, GRID_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    for (panel, chart) in root.split_evenly((2, 2)).iter().zip(charts) {
        draw_chart(panel, chart)?;
    }
    root.present()?;
    debug!(path = %path.display(), panels = charts.len().min(4), "chart grid written");
    Ok(())
}

fn draw_histogram<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    values: &[f64],
) -> DrawResult<DB> {
    let bins = histogram_bins(values, HISTOGRAM_BINS);
    let (Some(first), Some(last)) = (bins.first(), bins.last()) else {
        area.titled("Revenue Distribution (no data)", ("sans-serif", 22))?;
        return Ok(());
    };
    let peak = bins.iter().map(|(_, _, count)| *count).max().unwrap_or(0) as f64;

    let mut chart = ChartBuilder::on(area)
        .caption("Revenue Distribution", ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(first.0..last.1, 0f64..peak * 1.05 + 1.0)?;
    chart
        .configure_mesh()
        .x_desc("Revenue")
        .y_desc("Frequency")
        .draw()?;
    chart.draw_series(bins.iter().map(|(lower, upper, count)| {
        Rectangle::new([(*lower, 0.0), (*upper, *count as f64)], BLUE.mix(0.6).filled())
    }))?;
    Ok(())
}

fn draw_box<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, values: &[f64]) -> DrawResult<DB> {
    if values.is_empty() {
        area.titled("Revenue Box Plot (no data)", ("sans-serif", 22))?;
        return Ok(());
    }
    let quartiles = Quartiles::new(values);
    let [low, _, _, _, high] = quartiles.values();
    let pad = ((high - low) * 0.1).max(1.0);

    let mut chart = ChartBuilder::on(area)
        .caption("Revenue Box Plot", ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d((0u32..1u32).into_segmented(), (low - pad)..(high + pad))?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .y_desc("Revenue")
        .x_label_formatter(&|_| "revenue".to_string())
        .draw()?;
    chart.draw_series(std::iter::once(Boxplot::new_vertical(
        SegmentValue::CenterOf(0u32),
        &quartiles,
    )))?;
    Ok(())
}

/// Histogram and box plot of one numeric column, side by side.
pub fn render_distribution(path: &Path, values: &[f64]) -> Result<()> {
    ensure_parent_dir(path)?;
    let root = SVGBackend::new(path, SINGLE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((1, 2));
    draw_histogram(&panels[0], values)?;
    draw_box(&panels[1], values)?;
    root.present()?;
    debug!(path = %path.display(), samples = values.len(), "distribution chart written");
    Ok(())
}
