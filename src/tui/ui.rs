//! UI Rendering
//!
//! Main layout: header, sidebar, the active view, input line and status bar.

use crate::models::MessageRole;
use crate::session::{NotificationLevel, View};
use crate::tui::app::{App, SIDEBAR_WIDTH};
use crate::tui::command::HELP;
use crate::tui::theme::Icons;
use crate::tui::widgets;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Render the main UI
pub fn render(frame: &mut Frame, app: &App) {
    frame.render_widget(Block::default().style(app.palette.base()), frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Body
            Constraint::Length(3), // Input
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
        .split(chunks[1]);

    render_header(frame, chunks[0], app);
    widgets::render_sidebar(frame, body[0], app);
    match app.controller.state().view {
        View::Chat => render_messages(frame, body[1], app),
        View::Compare => {
            widgets::render_compare(frame, body[1], &app.controller.comparison(), &app.palette)
        }
        View::Visualization => {
            widgets::render_chart(frame, body[1], &app.controller.chart_or_sample(), &app.palette)
        }
    }
    render_input(frame, chunks[2], app);
    render_status_bar(frame, chunks[3], app);

    if app.show_help {
        render_help(frame, app);
    }
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let title = Line::from(vec![
        Span::raw(format!("{} ", app.header_icon())),
        Span::styled("PDF Genius", app.palette.title()),
        Span::styled("  local document analysis", app.palette.text_secondary()),
        Span::raw("   "),
        Span::styled(format!(" {} ", app.theme.theme().label()), app.palette.badge()),
    ]);

    let header = Paragraph::new(title).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(app.palette.border()),
    );
    frame.render_widget(header, area);
}

fn render_messages(frame: &mut Frame, area: Rect, app: &App) {
    let palette = &app.palette;
    let block = Block::default()
        .title(" Chat ")
        .borders(Borders::ALL)
        .border_style(palette.border_focused());

    let mut lines: Vec<Line> = Vec::new();
    let state = app.controller.state();

    if state.messages.is_empty() {
        lines.push(Line::from(Span::styled(
            "Upload a PDF with /upload <path> and pick a model with /model <id> to start.",
            palette.text_dim(),
        )));
    }

    for msg in &state.messages {
        let (prefix, style) = match msg.role {
            MessageRole::User => ("You", palette.user_message()),
            MessageRole::Assistant => ("Assistant", palette.assistant_message()),
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{}: ", prefix), style),
            Span::styled(msg.timestamp.format("%H:%M").to_string(), palette.text_dim()),
        ]));
        for line in msg.content.lines() {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(line.to_string(), palette.text()),
            ]));
        }
        if let Some(data) = &msg.attached_data {
            let kind = msg.chart_kind.map(|k| k.to_string()).unwrap_or_else(|| "bar".into());
            lines.push(Line::from(Span::styled(
                format!("  [{} chart, {} points; Tab or /view chart]", kind, data.len()),
                palette.text_secondary(),
            )));
        }
        lines.push(Line::from(""));
    }

    if state.is_loading {
        lines.push(Line::from(vec![
            Span::styled("Assistant: ", palette.assistant_message()),
            Span::styled(Icons::CURSOR, palette.active()),
        ]));
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.scroll_offset, 0));
    frame.render_widget(paragraph, area);
}

fn render_input(frame: &mut Frame, area: Rect, app: &App) {
    let focused = app.controller.can_submit();
    let block = Block::default()
        .title(" Input ")
        .borders(Borders::ALL)
        .border_style(if focused {
            app.palette.border_focused()
        } else {
            app.palette.border()
        });

    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(&app.input, inner);
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let palette = &app.palette;
    let status = if app.controller.state().is_model_running() {
        Span::styled(format!("{} Running inference…", Icons::ACTIVE), palette.active())
    } else if app.controller.state().model.status().loading {
        Span::styled(format!("{} Loading model…", Icons::ACTIVE), palette.active())
    } else {
        Span::styled(format!("{} Ready", Icons::IDLE), palette.success())
    };

    let mut spans = vec![status];
    if let Some(notice) = &app.notice {
        let style = match notice.level {
            NotificationLevel::Info => palette.text_secondary(),
            NotificationLevel::Error => palette.error(),
        };
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(
            format!("{}: {}", notice.title, notice.description),
            style,
        ));
    }
    spans.extend([
        Span::raw(" │ "),
        Span::styled("[Tab]", palette.shortcut_key()),
        Span::styled(" View ", palette.shortcut_desc()),
        Span::styled("[F1]", palette.shortcut_key()),
        Span::styled(" Help ", palette.shortcut_desc()),
        Span::styled("[Ctrl+Q]", palette.shortcut_key()),
        Span::styled(" Quit", palette.shortcut_desc()),
    ]);

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_help(frame: &mut Frame, app: &App) {
    let palette = &app.palette;
    let area = centered_rect(70, 80, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(Span::styled("Commands", palette.heading())),
        Line::from(""),
    ];
    for (usage, description) in HELP {
        lines.push(Line::from(vec![
            Span::styled(format!("{:<28}", usage), palette.shortcut_key()),
            Span::styled(*description, palette.text()),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(format!("{:<28}", "Enter"), palette.shortcut_key()),
        Span::styled("Send query / run command", palette.text()),
    ]));
    lines.push(Line::from(vec![
        Span::styled(format!("{:<28}", "Tab / Esc"), palette.shortcut_key()),
        Span::styled("Next view / back to chat", palette.text()),
    ]));
    lines.push(Line::from(vec![
        Span::styled(format!("{:<28}", "↑/↓ PageUp/PageDown"), palette.shortcut_key()),
        Span::styled("Scroll messages", palette.text()),
    ]));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Press any key to close", palette.text_dim())));

    let paragraph = Paragraph::new(lines).style(palette.base()).block(
        Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(palette.border_focused()),
    );
    frame.render_widget(paragraph, area);
}

/// Helper to create a centered rect
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
