//! Terminal User Interface Module
//!
//! Chat front end for the document analysis session, built with Ratatui.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  📄 PDF Genius  local document analysis             [ Dark ]  │
//! ├─ Session ─────────┬─ Chat / Compare / Visualization ──────────┤
//! │ Documents (2)     │ You: show me a bar chart                  │
//! │ • q1.pdf 12p      │ Assistant: Here's a bar chart ...         │
//! │ Model             │   [bar chart, 6 points; Tab or /view ...] │
//! │ ● Phi-2           │                                           │
//! │ Resources         │                                           │
//! ├───────────────────┴───────────────────────────────────────────┤
//! │ > Ask about your PDFs, or type /help                          │
//! └───────────────────────────────────────────────────────────────┘
//!  ● Running inference… │ 1 PDF uploaded │ [Tab] View [F1] Help
//! ```

pub mod app;
pub mod command;
pub mod event;
pub mod theme;
pub mod ui;
pub mod widgets;

pub use app::App;
pub use command::{Command, CommandError};
pub use event::{AppAction, EventHandler};

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::time::Duration;
use tracing::{error, info};

use crate::config::Config;

/// Type alias for our terminal backend
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

const TICK_RATE: Duration = Duration::from_millis(100);

/// Initialize the terminal for TUI mode
pub fn init_terminal() -> anyhow::Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to its original state
pub fn restore_terminal(terminal: &mut Tui) -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the TUI application
pub async fn run(config: Config) -> anyhow::Result<()> {
    info!("Starting TUI mode");

    let mut app = App::new(config).await;
    let mut terminal = init_terminal()?;
    let mut events = EventHandler::new(TICK_RATE);

    let result = run_app(&mut terminal, &mut app, &mut events).await;

    app.shutdown();
    if let Err(e) = restore_terminal(&mut terminal) {
        error!("Failed to restore terminal: {}", e);
    }

    result
}

/// Main application loop
async fn run_app(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> anyhow::Result<()> {
    loop {
        app.update();

        let size = terminal.size()?;
        app.calculate_scroll_bounds(size.width, size.height);
        terminal.draw(|frame| ui::render(frame, app))?;

        // Tick events keep this from blocking longer than TICK_RATE
        match events.next().await {
            Some(action) => app.handle_action(action).await,
            None => break,
        }

        if app.should_quit {
            break;
        }
    }

    info!("TUI exited normally");
    Ok(())
}
