//! Chart Widget
//!
//! Terminal rendering of the visualization surface. Bar and line charts map
//! to ratatui's chart widgets; pie data is shown as share-of-total bars.

use super::truncate_string;
use crate::analysis::ChartData;
use crate::models::ChartKind;
use crate::tui::theme::Palette;
use ratatui::{
    layout::Rect,
    symbols,
    text::{Line, Span},
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

const PIE_BAR_WIDTH: usize = 30;

pub fn render_chart(frame: &mut Frame, area: Rect, chart: &ChartData, palette: &Palette) {
    let block = Block::default()
        .title(format!(" {} ({}) ", chart.title, chart.kind))
        .borders(Borders::ALL)
        .border_style(palette.border_focused());

    if chart.points.is_empty() {
        let empty = Paragraph::new(Span::styled("No data to display", palette.text_dim())).block(block);
        frame.render_widget(empty, area);
        return;
    }

    match chart.kind {
        ChartKind::Bar => render_bars(frame, area, block, chart, palette),
        ChartKind::Line => render_line(frame, area, block, chart, palette),
        ChartKind::Pie => render_shares(frame, area, block, chart, palette),
    }
}

/// Bar heights; negative values draw as zero.
pub fn bar_values(chart: &ChartData) -> Vec<u64> {
    chart
        .points
        .iter()
        .map(|p| p.value.max(0.0).round() as u64)
        .collect()
}

fn render_bars(frame: &mut Frame, area: Rect, block: Block, chart: &ChartData, palette: &Palette) {
    let inner_width = area.width.saturating_sub(2) as usize;
    let count = chart.points.len().max(1);
    let bar_width = ((inner_width / count).saturating_sub(1)).clamp(3, 12) as u16;

    let bars: Vec<Bar> = chart
        .points
        .iter()
        .zip(bar_values(chart))
        .map(|(point, value)| {
            Bar::default()
                .value(value)
                .label(Line::from(truncate_string(&point.name, bar_width as usize)))
                .style(palette.title())
        })
        .collect();

    let widget = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(1)
        .value_style(palette.badge())
        .label_style(palette.text_secondary());
    frame.render_widget(widget, area);
}

fn render_line(frame: &mut Frame, area: Rect, block: Block, chart: &ChartData, palette: &Palette) {
    let data: Vec<(f64, f64)> = chart
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.value))
        .collect();
    let max = chart.points.iter().map(|p| p.value).fold(0.0_f64, f64::max);
    let y_max = if max > 0.0 { max * 1.1 } else { 1.0 };
    let x_max = (chart.points.len().saturating_sub(1)).max(1) as f64;

    let first = chart.points.first().map(|p| p.name.clone()).unwrap_or_default();
    let last = chart.points.last().map(|p| p.name.clone()).unwrap_or_default();

    let datasets = vec![Dataset::default()
        .name("value")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(palette.title())
        .data(&data)];

    let widget = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .style(palette.text_secondary())
                .bounds([0.0, x_max])
                .labels(vec![Span::raw(first), Span::raw(last)]),
        )
        .y_axis(
            Axis::default()
                .style(palette.text_secondary())
                .bounds([0.0, y_max])
                .labels(vec![
                    Span::raw("0"),
                    Span::raw(format!("{:.0}", y_max / 2.0)),
                    Span::raw(format!("{:.0}", y_max)),
                ]),
        );
    frame.render_widget(widget, area);
}

fn render_shares(frame: &mut Frame, area: Rect, block: Block, chart: &ChartData, palette: &Palette) {
    let name_width = chart
        .points
        .iter()
        .map(|p| p.name.chars().count())
        .max()
        .unwrap_or(0)
        .min(20);

    let lines: Vec<Line> = chart
        .percentages()
        .into_iter()
        .map(|(name, percent)| {
            let filled = ((percent / 100.0) * PIE_BAR_WIDTH as f64).round() as usize;
            Line::from(vec![
                Span::styled(
                    format!("{:<width$} ", truncate_string(&name, name_width), width = name_width),
                    palette.text(),
                ),
                Span::styled("█".repeat(filled.min(PIE_BAR_WIDTH)), palette.title()),
                Span::styled(
                    "░".repeat(PIE_BAR_WIDTH - filled.min(PIE_BAR_WIDTH)),
                    palette.text_dim(),
                ),
                Span::styled(format!(" {:>5.1}%", percent), palette.text_secondary()),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
