//! Application State
//!
//! Owns the conversation controller plus the UI-only state around it:
//! input box, scroll position, theme, resource monitor and header icon.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};
use tui_textarea::TextArea;

use crate::analysis;
use crate::backend::{BackendGateway, MockBackend};
use crate::config::Config;
use crate::llm::{find_catalog_model, MODEL_CATALOG};
use crate::models::UploadedFile;
use crate::monitor::{HttpSampler, MockSampler, ResourceMonitor, ResourceSampler, SystemResources};
use crate::scheduler::{self, TaskHandle};
use crate::session::{ConversationController, Notification, NotificationLevel, SubmitOutcome, View};
use crate::settings::{self, SettingsStorage, ThemeSettings};
use crate::tui::command::{self, Command};
use crate::tui::event::AppAction;
use crate::tui::theme::{Icons, Palette};
use crate::types::ChartError;

const INPUT_PLACEHOLDER: &str = "Ask about your PDFs, or type /help";
const DEFAULT_REPORT_FILE: &str = "report.csv";

/// Rows taken by header, input and status bar, plus the message borders
const CHROME_HEIGHT: u16 = 3 + 3 + 1 + 2;
pub const SIDEBAR_WIDTH: u16 = 34;

pub struct App {
    pub config: Config,
    pub controller: ConversationController,
    pub theme: ThemeSettings,
    pub palette: Palette,
    pub monitor: ResourceMonitor,
    pub resources: Option<SystemResources>,

    pub input: TextArea<'static>,
    pub scroll_offset: u16,
    pub max_scroll: u16,
    follow_output: bool,

    pub show_help: bool,
    pub should_quit: bool,
    /// Most recent notification, shown in the status bar
    pub notice: Option<Notification>,

    icon_index: Arc<AtomicUsize>,
    icon_task: Option<TaskHandle>,
}

impl App {
    pub async fn new(config: Config) -> Self {
        let gateway: Arc<dyn BackendGateway> = Arc::new(MockBackend::new(config.mock_latency()));
        let sampler: Arc<dyn ResourceSampler> = match &config.monitor.resource_api_url {
            Some(url) => Arc::new(HttpSampler::new(url.clone(), MockSampler::new(true))),
            None => Arc::new(MockSampler::new(true)),
        };

        let storage = SettingsStorage::with_path(config.paths.data_dir.clone());
        let colorfgbg = std::env::var("COLORFGBG").ok();
        let preference = settings::detect_preference(config.ui.theme.as_deref(), colorfgbg.as_deref());
        let theme = ThemeSettings::load(storage, preference).await;

        Self::with_parts(config, gateway, sampler, theme)
    }

    /// Assemble an app from explicit parts. Must run inside a tokio runtime.
    pub fn with_parts(
        config: Config,
        gateway: Arc<dyn BackendGateway>,
        sampler: Arc<dyn ResourceSampler>,
        theme: ThemeSettings,
    ) -> Self {
        let controller = ConversationController::new(gateway, config.generation_params())
            .with_view_switch_delay(config.view_switch_delay())
            .with_model_load_delay(config.model_load_delay());
        let monitor = ResourceMonitor::new(sampler, config.poll_interval());

        let icon_index = Arc::new(AtomicUsize::new(0));
        let icon_task = if config.ui.icon_animation && !config.icon_interval().is_zero() {
            let index = Arc::clone(&icon_index);
            Some(scheduler::spawn_every("header-icon", config.icon_interval(), move || {
                let index = Arc::clone(&index);
                async move {
                    index.fetch_add(1, Ordering::Relaxed);
                    true
                }
            }))
        } else {
            None
        };

        Self {
            palette: Palette::for_theme(theme.theme()),
            config,
            controller,
            theme,
            monitor,
            resources: None,
            input: new_input(),
            scroll_offset: 0,
            max_scroll: 0,
            follow_output: true,
            show_help: false,
            should_quit: false,
            notice: None,
            icon_index,
            icon_task,
        }
    }

    pub fn header_icon(&self) -> &'static str {
        let index = self.icon_index.load(Ordering::Relaxed);
        Icons::HEADER[index % Icons::HEADER.len()]
    }

    /// Reconcile async results, notifications and the resource monitor.
    pub fn update(&mut self) {
        if self.controller.poll_events() > 0 {
            self.scroll_to_bottom();
        }
        for notice in self.controller.take_notifications() {
            self.push_notice(notice);
        }
        self.monitor
            .sync(self.controller.state().model.is_active());
        self.resources = self.monitor.latest();
    }

    fn push_notice(&mut self, notice: Notification) {
        match notice.level {
            NotificationLevel::Info => debug!(title = %notice.title, "{}", notice.description),
            NotificationLevel::Error => warn!(title = %notice.title, "{}", notice.description),
        }
        self.notice = Some(notice);
    }

    /// Handle a user action
    pub async fn handle_action(&mut self, action: AppAction) {
        match action {
            AppAction::Quit | AppAction::ForceQuit => self.should_quit = true,
            AppAction::Submit => self.submit_line().await,
            AppAction::ToggleHelp => self.show_help = !self.show_help,
            AppAction::Escape => {
                if self.show_help {
                    self.show_help = false;
                } else {
                    self.controller.set_view(View::Chat);
                }
            }
            AppAction::ScrollUp => {
                self.scroll_offset = self.scroll_offset.saturating_sub(1);
                self.follow_output = false;
            }
            AppAction::ScrollDown => self.scroll_by(1),
            AppAction::ScrollPageUp => {
                self.scroll_offset = self.scroll_offset.saturating_sub(10);
                self.follow_output = false;
            }
            AppAction::ScrollPageDown => self.scroll_by(10),
            AppAction::NextView => self.cycle_view(),
            AppAction::Input(key) => {
                if self.show_help {
                    self.show_help = false;
                } else {
                    self.input.input(key);
                }
            }
            AppAction::Tick => {}
        }
    }

    fn cycle_view(&mut self) {
        let next = match self.controller.state().view {
            View::Chat if self.controller.state().compare_available() => View::Compare,
            View::Chat | View::Compare => View::Visualization,
            View::Visualization => View::Chat,
        };
        self.controller.set_view(next);
    }

    async fn submit_line(&mut self) {
        let line = self.input.lines().join("\n");

        if command::is_command(&line) {
            self.input = new_input();
            match command::parse(&line) {
                Ok(cmd) => self.execute(cmd).await,
                Err(e) => self.push_notice(Notification::error("Command error", e.to_string())),
            }
            return;
        }

        // Keep the typed text until the current answer lands
        if self.controller.is_pending() {
            return;
        }

        self.controller.set_input(line.clone());
        match self.controller.submit_input() {
            Ok(SubmitOutcome::Dispatched) => {
                self.input = new_input();
                self.scroll_to_bottom();
            }
            Ok(SubmitOutcome::Ignored) => {}
            Err(e) => debug!(error = %e, "Query not sent"),
        }
    }

    pub async fn execute(&mut self, cmd: Command) {
        info!(command = ?cmd, "Executing command");
        match cmd {
            Command::Upload(paths) => self.upload_paths(&paths).await,
            Command::Model(id) => {
                if find_catalog_model(&id).is_some() {
                    self.controller.select_model(&id);
                } else {
                    let known: Vec<&str> = MODEL_CATALOG.iter().map(|m| m.id).collect();
                    self.push_notice(Notification::error(
                        "Unknown model",
                        format!("'{}' is not in the catalog ({})", id, known.join(", ")),
                    ));
                }
            }
            Command::ModelCustom => {
                self.controller.choose_custom_path();
                self.push_notice(Notification::info(
                    "Custom model",
                    "Enter the model location with /path <p>",
                ));
            }
            Command::Path(path) => {
                if !self.controller.state().custom_path_entry {
                    self.controller.choose_custom_path();
                }
                self.controller.set_model_path(path);
                self.controller.confirm_model_path();
            }
            Command::DeleteModel => self.controller.delete_model(),
            Command::Temperature(value) => {
                self.controller.set_temperature(value);
                let applied = self.controller.state().params.temperature;
                self.push_notice(Notification::info("Temperature", format!("{:.1}", applied)));
            }
            Command::Tokens(value) => {
                self.controller.set_max_tokens(value);
                let applied = self.controller.state().params.max_tokens;
                self.push_notice(Notification::info("Max tokens", applied.to_string()));
            }
            Command::Mode(mode) => self.controller.set_mode(mode),
            Command::View(view) => {
                self.controller.set_view(view);
                if view == View::Compare && self.controller.state().view != View::Compare {
                    self.push_notice(Notification::error(
                        "Compare unavailable",
                        "Switch to compare mode and upload at least two PDFs.",
                    ));
                }
            }
            Command::Theme(theme) => {
                let result = self.theme.set(theme).await;
                self.palette = Palette::for_theme(theme);
                match result {
                    Ok(()) => self.push_notice(Notification::info("Theme", theme.label())),
                    Err(e) => self.push_notice(Notification::error("Theme not saved", e.to_string())),
                }
            }
            Command::Clear => self.controller.clear_chat(),
            Command::ClearDocs => self.controller.clear_documents_and_chat(),
            Command::Export(path) => self.export_csv(path).await,
            Command::SaveChart(path) => self.save_chart(path),
            Command::Report(path) => {
                let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_FILE));
                self.controller.export_report(path);
            }
            Command::Help => self.show_help = true,
            Command::Quit => self.should_quit = true,
        }
    }

    async fn upload_paths(&mut self, paths: &[PathBuf]) {
        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            match tokio::fs::read(path).await {
                Ok(data) => files.push(uploaded_file(path, data)),
                Err(e) => {
                    self.push_notice(Notification::error(
                        "Upload failed",
                        format!("{}: {}", path.display(), e),
                    ));
                }
            }
        }
        if !files.is_empty() {
            self.controller.upload(&files);
            self.scroll_to_bottom();
        }
    }

    async fn export_csv(&mut self, path: Option<PathBuf>) {
        let chart = self.controller.chart_or_sample();
        let path = path.unwrap_or_else(|| PathBuf::from(analysis::csv_filename(&chart.title)));

        let result: Result<(), ChartError> = async {
            let csv = analysis::to_csv(&chart.points)?;
            tokio::fs::write(&path, csv).await?;
            Ok(())
        }
        .await;

        match result {
            Ok(()) => self.push_notice(Notification::info("Data exported", path.display().to_string())),
            Err(e) => self.push_notice(Notification::error("Export failed", e.to_string())),
        }
    }

    fn save_chart(&mut self, path: Option<PathBuf>) {
        let chart = self.controller.chart_or_sample();
        let path = path.unwrap_or_else(|| {
            PathBuf::from(analysis::csv_filename(&chart.title)).with_extension("png")
        });

        match analysis::render_chart(&path, &chart) {
            Ok(()) => self.push_notice(Notification::info("Chart saved", path.display().to_string())),
            Err(e) => self.push_notice(Notification::error("Chart not saved", e.to_string())),
        }
    }

    // === Scrolling ===

    fn scroll_by(&mut self, lines: u16) {
        self.scroll_offset = self.scroll_offset.saturating_add(lines).min(self.max_scroll);
        self.follow_output = self.scroll_offset == self.max_scroll;
    }

    fn scroll_to_bottom(&mut self) {
        self.follow_output = true;
        self.scroll_offset = self.max_scroll;
    }

    /// Recompute the scroll range for a terminal of the given size.
    pub fn calculate_scroll_bounds(&mut self, width: u16, height: u16) {
        let text_width = width.saturating_sub(SIDEBAR_WIDTH + 4).max(1) as usize;
        let viewport = height.saturating_sub(CHROME_HEIGHT);

        let mut content: usize = 0;
        for message in self.controller.messages() {
            content += 1;
            for line in message.content.lines() {
                content += line.chars().count().max(1).div_ceil(text_width);
            }
            if message.attached_data.is_some() {
                content += 1;
            }
            content += 1;
        }
        if self.controller.state().is_loading {
            content += 1;
        }

        let content = u16::try_from(content).unwrap_or(u16::MAX);
        self.max_scroll = content.saturating_sub(viewport);
        if self.follow_output || self.scroll_offset > self.max_scroll {
            self.scroll_offset = self.max_scroll;
        }
    }

    /// Stop background work before the terminal is restored.
    pub fn shutdown(&mut self) {
        self.monitor.stop();
        if let Some(mut task) = self.icon_task.take() {
            task.cancel();
        }
        info!("App shut down");
    }
}

fn new_input() -> TextArea<'static> {
    let mut input = TextArea::default();
    input.set_cursor_line_style(ratatui::style::Style::default());
    input.set_placeholder_text(INPUT_PLACEHOLDER);
    input
}

/// Build the ingestion record for a file read from disk.
fn uploaded_file(path: &Path, data: Vec<u8>) -> UploadedFile {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let content_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();
    UploadedFile::new(filename, content_type, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MonitorConfig, PathsConfig, SessionConfig, UiConfig};
    use crate::settings::Theme;
    use std::time::Duration;
    use tempfile::TempDir;

    fn test_config(dir: &Path) -> Config {
        Config {
            session: SessionConfig {
                mock_latency_ms: 0,
                view_switch_delay_ms: 0,
                model_load_ms: 0,
                default_temperature: 0.7,
                default_max_tokens: 512,
            },
            monitor: MonitorConfig {
                poll_interval_ms: 2000,
                resource_api_url: None,
            },
            ui: UiConfig {
                icon_interval_ms: 5000,
                icon_animation: false,
                theme: None,
            },
            paths: PathsConfig {
                data_dir: dir.to_path_buf(),
                log_dir: dir.join("logs"),
            },
        }
    }

    async fn test_app(dir: &Path) -> App {
        let config = test_config(dir);
        let theme = ThemeSettings::load(SettingsStorage::with_path(dir.to_path_buf()), None).await;
        App::with_parts(
            config,
            Arc::new(MockBackend::new(Duration::ZERO)),
            Arc::new(MockSampler::new(false)),
            theme,
        )
    }

    fn type_line(app: &mut App, text: &str) {
        app.input = new_input();
        app.input.insert_str(text);
    }

    #[test]
    fn test_uploaded_file_guesses_mime() {
        let file = uploaded_file(Path::new("/tmp/report.pdf"), vec![1, 2]);
        assert_eq!(file.filename, "report.pdf");
        assert_eq!(file.content_type, "application/pdf");

        let file = uploaded_file(Path::new("notes.txt"), Vec::new());
        assert_eq!(file.content_type, "text/plain");
    }

    #[tokio::test]
    async fn test_upload_command_reads_files() {
        let dir = TempDir::new().unwrap();
        let pdf = dir.path().join("q1.pdf");
        let txt = dir.path().join("notes.txt");
        std::fs::write(&pdf, b"%PDF-1.4").unwrap();
        std::fs::write(&txt, b"hello").unwrap();
        let mut app = test_app(dir.path()).await;

        app.execute(Command::Upload(vec![pdf, txt, dir.path().join("missing.pdf")]))
            .await;
        app.update();

        assert_eq!(app.controller.documents().len(), 1);
        assert_eq!(app.controller.documents()[0].name, "q1.pdf");
        // Greeting seeded on first upload
        assert_eq!(app.controller.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_query_round_trip_through_input() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(dir.path()).await;
        app.controller.add_documents(crate::documents::ingest(&[UploadedFile::new(
            "q1.pdf",
            "application/pdf",
            Vec::new(),
        )])
        .accepted);
        app.execute(Command::Model("mistral-7b".into())).await;

        type_line(&mut app, "show me a bar chart");
        app.handle_action(AppAction::Submit).await;
        assert_eq!(app.input.lines().join(""), "");
        assert!(app.controller.is_pending());

        app.controller.settle().await;
        assert_eq!(app.controller.messages().len(), 3);
        assert!(app.controller.messages()[2].attached_data.is_some());
    }

    #[tokio::test]
    async fn test_rejected_query_keeps_input() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(dir.path()).await;

        type_line(&mut app, "what is this?");
        app.handle_action(AppAction::Submit).await;
        app.update();

        assert_eq!(app.input.lines().join("\n"), "what is this?");
        assert_eq!(
            app.notice.as_ref().map(|n| n.title.as_str()),
            Some("No PDF document")
        );
    }

    #[tokio::test]
    async fn test_bad_command_raises_notice() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(dir.path()).await;

        type_line(&mut app, "/temp warm");
        app.handle_action(AppAction::Submit).await;

        let notice = app.notice.clone().unwrap();
        assert_eq!(notice.level, NotificationLevel::Error);
        assert_eq!(app.input.lines().join(""), "");
    }

    #[tokio::test]
    async fn test_unknown_model_is_refused() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(dir.path()).await;

        app.execute(Command::Model("gpt-9".into())).await;
        assert!(!app.controller.state().model.is_selected());
        assert_eq!(app.notice.as_ref().map(|n| n.title.as_str()), Some("Unknown model"));
    }

    #[tokio::test]
    async fn test_path_command_enters_custom_mode() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(dir.path()).await;
        app.execute(Command::Model("phi-2".into())).await;

        app.execute(Command::Path("/models/local.gguf".into())).await;
        let model = &app.controller.state().model;
        assert_eq!(model.model_id(), "");
        assert_eq!(model.custom_path(), "/models/local.gguf");
    }

    #[tokio::test]
    async fn test_params_are_clamped() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(dir.path()).await;

        app.execute(Command::Temperature(3.0)).await;
        app.execute(Command::Tokens(5000)).await;

        assert_eq!(app.controller.state().params.temperature, 1.0);
        assert_eq!(app.controller.state().params.max_tokens, 2048);
    }

    #[tokio::test]
    async fn test_theme_command_persists() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(dir.path()).await;

        app.execute(Command::Theme(Theme::Light)).await;

        assert_eq!(app.palette, Palette::LIGHT);
        let storage = SettingsStorage::with_path(dir.path().to_path_buf());
        assert_eq!(storage.load_theme().await.unwrap(), Some(Theme::Light));
    }

    #[tokio::test]
    async fn test_export_writes_sample_csv() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("data.csv");
        let mut app = test_app(dir.path()).await;

        app.execute(Command::Export(Some(out.clone()))).await;

        let csv = std::fs::read_to_string(out).unwrap();
        assert!(csv.starts_with("name,value\n"));
        assert_eq!(csv.lines().count(), 7);
    }

    #[tokio::test]
    async fn test_view_cycle_skips_unavailable_compare() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(dir.path()).await;

        app.handle_action(AppAction::NextView).await;
        assert_eq!(app.controller.state().view, View::Visualization);
        app.handle_action(AppAction::NextView).await;
        assert_eq!(app.controller.state().view, View::Chat);
    }

    #[tokio::test]
    async fn test_monitor_follows_model_activity() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(dir.path()).await;
        app.update();
        assert!(!app.monitor.is_polling());

        app.controller.add_documents(crate::documents::ingest(&[UploadedFile::new(
            "a.pdf",
            "application/pdf",
            Vec::new(),
        )])
        .accepted);
        app.execute(Command::Model("phi-2".into())).await;
        app.controller.submit("summarize").unwrap();
        app.update();
        assert!(app.monitor.is_polling());

        app.controller.settle().await;
        app.update();
        assert!(!app.monitor.is_polling());
    }
}
