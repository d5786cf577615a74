use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use pdf_genius::{config::Config, settings::Theme, tui, utils};

/// Chat with your PDF documents using a local language model
#[derive(Debug, Parser)]
#[command(name = "pdf-genius", version, about)]
struct Args {
    /// Directory for settings and logs
    #[arg(long, env = "PDF_GENIUS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Startup theme preference (a saved theme still wins)
    #[arg(long)]
    theme: Option<Theme>,

    /// Simulated backend latency in milliseconds
    #[arg(long, env = "MOCK_LATENCY_MS")]
    mock_latency_ms: Option<u64>,

    /// Keep the header icon still
    #[arg(long)]
    no_icon_animation: bool,
}

impl Args {
    fn apply(self, config: &mut Config) {
        if let Some(dir) = self.data_dir {
            if std::env::var_os("PDF_GENIUS_LOG_DIR").is_none() {
                config.paths.log_dir = dir.join("logs");
            }
            config.paths.data_dir = dir;
        }
        if let Some(theme) = self.theme {
            config.ui.theme = Some(theme.to_string());
        }
        if let Some(ms) = self.mock_latency_ms {
            config.session.mock_latency_ms = ms;
        }
        if self.no_icon_animation {
            config.ui.icon_animation = false;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut config = Config::from_env().context("Failed to load configuration")?;
    Args::parse().apply(&mut config);

    let _log_guard = utils::init_logger(&config.paths.log_dir)?;
    info!(
        data_dir = %config.paths.data_dir.display(),
        mock_latency_ms = config.session.mock_latency_ms,
        "Configuration loaded"
    );

    tui::run(config).await
}
