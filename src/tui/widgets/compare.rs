//! Comparison Widget

use crate::session::ComparisonReport;
use crate::tui::theme::{Icons, Palette};
use crate::types::CompareError;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub fn render_compare(
    frame: &mut Frame,
    area: Rect,
    report: &Result<ComparisonReport, CompareError>,
    palette: &Palette,
) {
    let report = match report {
        Ok(report) => report,
        Err(e) => {
            let block = Block::default()
                .title(" Compare ")
                .borders(Borders::ALL)
                .border_style(palette.border());
            let message = Paragraph::new(Span::styled(e.to_string(), palette.text_dim())).block(block);
            frame.render_widget(message, area);
            return;
        }
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);

    for (summary, column) in report.documents.iter().zip(columns.iter()) {
        let mut lines = vec![
            Line::from(Span::styled(
                format!("{} pages", summary.page_count),
                palette.text_secondary(),
            )),
            Line::from(""),
        ];
        lines.extend(bullets(&summary.key_points, palette));
        let block = Block::default()
            .title(format!(" {} ", summary.name))
            .borders(Borders::ALL)
            .border_style(palette.border_focused());
        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
            *column,
        );
    }

    let mut lines = vec![Line::from(Span::styled("Similarities", palette.heading()))];
    lines.extend(bullets(&report.similarities, palette));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Differences", palette.heading())));
    lines.extend(bullets(&report.differences, palette));

    let block = Block::default()
        .title(" Analysis ")
        .borders(Borders::ALL)
        .border_style(palette.border());
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        rows[1],
    );
}

fn bullets(items: &[String], palette: &Palette) -> Vec<Line<'static>> {
    items
        .iter()
        .map(|item| {
            Line::from(vec![
                Span::styled(format!("{} ", Icons::DOT), palette.text_dim()),
                Span::styled(item.clone(), palette.text()),
            ])
        })
        .collect()
}
