//! Sidebar Widget
//!
//! Documents, model selection, generation parameters, mode and live
//! resource usage.

use super::truncate_string;
use crate::monitor::{format_memory, SystemResources};
use crate::tui::app::App;
use crate::tui::theme::{Icons, Palette};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let palette = &app.palette;
    let block = Block::default()
        .title(" Session ")
        .borders(Borders::ALL)
        .border_style(palette.border());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let width = inner.width.saturating_sub(2) as usize;
    let state = app.controller.state();
    let mut lines = Vec::new();

    lines.push(Line::from(Span::styled(
        format!("Documents ({})", state.documents.len()),
        palette.heading(),
    )));
    if state.documents.is_empty() {
        lines.push(Line::from(Span::styled("  none uploaded", palette.text_dim())));
    }
    for doc in state.documents.list() {
        let pages = format!(" {}p", doc.page_count);
        let name = truncate_string(&doc.name, width.saturating_sub(pages.len() + 2));
        lines.push(Line::from(vec![
            Span::styled(format!("{} ", Icons::DOT), palette.text_dim()),
            Span::styled(name, palette.text()),
            Span::styled(pages, palette.text_secondary()),
        ]));
    }
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled("Model", palette.heading())));
    match state.model.label() {
        Some(label) => {
            let (icon, style) = if state.model.is_active() {
                (Icons::ACTIVE, palette.active())
            } else {
                (Icons::IDLE, palette.success())
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{} ", icon), style),
                Span::styled(truncate_string(&label, width.saturating_sub(2)), palette.text()),
            ]));
        }
        None => lines.push(Line::from(Span::styled("  none selected", palette.text_dim()))),
    }
    if state.custom_path_entry {
        lines.push(Line::from(Span::styled(
            "  custom path: /path <p>",
            palette.text_secondary(),
        )));
    }
    lines.push(Line::from(vec![
        Span::styled("  temperature ", palette.text_secondary()),
        Span::styled(format!("{:.1}", state.params.temperature), palette.text()),
    ]));
    lines.push(Line::from(vec![
        Span::styled("  max tokens  ", palette.text_secondary()),
        Span::styled(state.params.max_tokens.to_string(), palette.text()),
    ]));
    lines.push(Line::from(""));

    lines.push(Line::from(vec![
        Span::styled("Mode ", palette.heading()),
        Span::styled(format!("{:?}", state.mode).to_lowercase(), palette.text()),
    ]));
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled("Resources", palette.heading())));
    match &app.resources {
        Some(resources) => lines.extend(resource_lines(resources, palette)),
        None => lines.push(Line::from(Span::styled(
            "  shown while a model runs",
            palette.text_dim(),
        ))),
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn resource_lines(resources: &SystemResources, palette: &Palette) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(vec![
            Span::styled("  RAM ", palette.text_secondary()),
            Span::styled(
                format!(
                    "{} / {} ({:.0}%)",
                    format_memory(resources.memory.used),
                    format_memory(resources.memory.total),
                    resources.memory.usage_percent
                ),
                palette.text(),
            ),
        ]),
        Line::from(vec![
            Span::styled("  CPU ", palette.text_secondary()),
            Span::styled(format!("{:.0}%", resources.cpu.usage_percent), palette.text()),
        ]),
    ];
    if let Some(gpu) = &resources.gpu {
        let vram = match (gpu.memory_used, gpu.memory_total) {
            (Some(used), Some(total)) => format!(" {:.1}/{:.0} GB", used, total),
            _ => String::new(),
        };
        lines.push(Line::from(vec![
            Span::styled("  GPU ", palette.text_secondary()),
            Span::styled(format!("{:.0}%{}", gpu.usage_percent, vram), palette.text()),
        ]));
    }
    lines
}
