use std::path::Path;

use csv::{Terminator, WriterBuilder};
use plotters::prelude::*;

use crate::models::{ChartKind, DataPoint};
use crate::types::ChartError;

pub const DEFAULT_TITLE: &str = "Data Visualization";

/// Slice colors for pie charts, cycled by index.
pub const PALETTE: [RGBColor; 6] = [
    RGBColor(0x00, 0x88, 0xFE),
    RGBColor(0x00, 0xC4, 0x9F),
    RGBColor(0xFF, 0xBB, 0x28),
    RGBColor(0xFF, 0x80, 0x42),
    RGBColor(0x88, 0x84, 0xD8),
    RGBColor(0x82, 0xCA, 0x9D),
];

const SERIES_COLOR: RGBColor = RGBColor(0x88, 0x84, 0xD8);

/// Data currently shown on the visualization surface
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub title: String,
    pub kind: ChartKind,
    pub points: Vec<DataPoint>,
}

impl Default for ChartData {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            kind: ChartKind::Bar,
            points: sample_data(),
        }
    }
}

impl ChartData {
    pub fn new(kind: ChartKind, points: Vec<DataPoint>) -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            kind,
            points,
        }
    }

    pub fn total(&self) -> f64 {
        self.points.iter().map(|p| p.value).sum()
    }

    /// Share of each point in the total, in percent
    pub fn percentages(&self) -> Vec<(String, f64)> {
        let total = self.total();
        self.points
            .iter()
            .map(|p| {
                let pct = if total > 0.0 { p.value / total * 100.0 } else { 0.0 };
                (p.name.clone(), pct)
            })
            .collect()
    }
}

/// Placeholder series shown before any analysis has produced data.
pub fn sample_data() -> Vec<DataPoint> {
    vec![
        DataPoint::new("Page A", 400.0),
        DataPoint::new("Page B", 300.0),
        DataPoint::new("Page C", 300.0),
        DataPoint::new("Page D", 200.0),
        DataPoint::new("Page E", 278.0),
        DataPoint::new("Page F", 189.0),
    ]
}

/// Render points as `name,value` CSV with a header row.
pub fn to_csv(points: &[DataPoint]) -> Result<String, ChartError> {
    let mut wtr = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    wtr.write_record(["name", "value"])?;
    for point in points {
        wtr.write_record([point.name.as_str(), format_value(point.value).as_str()])?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| ChartError::Io(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Download filename for a chart title: "Q1 Revenue" -> "q1-revenue.csv"
pub fn csv_filename(title: &str) -> String {
    let slug = title
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    format!("{}.csv", slug)
}

fn format_value(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Write the chart as a PNG image.
pub fn render_chart(output_path: &Path, chart: &ChartData) -> Result<(), ChartError> {
    if chart.points.is_empty() {
        return Err(ChartError::EmptyData);
    }
    let render = match chart.kind {
        ChartKind::Bar => write_bar_chart(output_path, chart),
        ChartKind::Line => write_line_chart(output_path, chart),
        ChartKind::Pie => write_pie_chart(output_path, chart),
    };
    render.map_err(|e| ChartError::Render(e.to_string()))
}

fn value_ceiling(points: &[DataPoint]) -> f64 {
    let max = points.iter().map(|p| p.value).fold(0.0_f64, f64::max);
    if max <= 0.0 {
        1.0
    } else {
        max * 1.1
    }
}

fn write_bar_chart(output_path: &Path, chart: &ChartData) -> anyhow::Result<()> {
    let points = &chart.points;
    let root = BitMapBackend::new(output_path, (900, 500)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut ctx = ChartBuilder::on(&root)
        .margin(20)
        .caption(&chart.title, ("sans-serif", 24))
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..points.len() as f64, 0f64..value_ceiling(points))?;

    ctx.configure_mesh()
        .disable_x_mesh()
        .x_labels(points.len())
        .x_label_formatter(&|x| {
            let idx = (*x).floor() as usize;
            points.get(idx).map(|p| p.name.clone()).unwrap_or_default()
        })
        .draw()?;

    for (idx, point) in points.iter().enumerate() {
        let idx_f = idx as f64;
        ctx.draw_series(std::iter::once(Rectangle::new(
            [(idx_f + 0.15, 0.0), (idx_f + 0.85, point.value)],
            SERIES_COLOR.filled(),
        )))?;
    }

    root.present()?;
    Ok(())
}

fn write_line_chart(output_path: &Path, chart: &ChartData) -> anyhow::Result<()> {
    let points = &chart.points;
    let root = BitMapBackend::new(output_path, (900, 500)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut ctx = ChartBuilder::on(&root)
        .margin(20)
        .caption(&chart.title, ("sans-serif", 24))
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..points.len() as f64, 0f64..value_ceiling(points))?;

    ctx.configure_mesh()
        .x_labels(points.len())
        .x_label_formatter(&|x| {
            let idx = (*x).floor() as usize;
            points.get(idx).map(|p| p.name.clone()).unwrap_or_default()
        })
        .draw()?;

    let coords: Vec<(f64, f64)> = points
        .iter()
        .enumerate()
        .map(|(idx, p)| (idx as f64 + 0.5, p.value))
        .collect();
    ctx.draw_series(LineSeries::new(coords.clone(), &SERIES_COLOR))?;
    ctx.draw_series(
        coords
            .into_iter()
            .map(|c| Circle::new(c, 4, SERIES_COLOR.filled())),
    )?;

    root.present()?;
    Ok(())
}

fn write_pie_chart(output_path: &Path, chart: &ChartData) -> anyhow::Result<()> {
    let root = BitMapBackend::new(output_path, (600, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(&chart.title, ("sans-serif", 24))?;

    let (width, height) = root.dim_in_pixel();
    let center = (width as i32 / 2, height as i32 / 2);
    let radius = (width.min(height) as f64) * 0.4;
    let total = chart.total();
    if total <= 0.0 {
        root.present()?;
        return Ok(());
    }

    let mut start = -std::f64::consts::FRAC_PI_2;
    for (idx, point) in chart.points.iter().enumerate() {
        let sweep = point.value / total * std::f64::consts::TAU;
        let steps = ((sweep / std::f64::consts::TAU) * 120.0).ceil().max(1.0) as usize;
        let mut outline = vec![center];
        for step in 0..=steps {
            let angle = start + sweep * step as f64 / steps as f64;
            outline.push((
                center.0 + (radius * angle.cos()) as i32,
                center.1 + (radius * angle.sin()) as i32,
            ));
        }
        let color = PALETTE[idx % PALETTE.len()];
        root.draw(&Polygon::new(outline, color.filled()))?;

        let mid = start + sweep / 2.0;
        let label_at = (
            center.0 + (radius * 1.05 * mid.cos()) as i32,
            center.1 + (radius * 1.05 * mid.sin()) as i32,
        );
        let pct = point.value / total * 100.0;
        root.draw(&Text::new(
            format!("{}: {:.0}%", point.name, pct),
            label_at,
            ("sans-serif", 14).into_font(),
        ))?;
        start += sweep;
    }

    root.present()?;
    Ok(())
}
