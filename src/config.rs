use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::llm::GenerationParams;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub session: SessionConfig,
    pub monitor: MonitorConfig,
    pub ui: UiConfig,
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Simulated latency of the mock backend
    pub mock_latency_ms: u64,
    pub view_switch_delay_ms: u64,
    /// Simulated model load after a selection; zero skips it
    pub model_load_ms: u64,
    pub default_temperature: f32,
    pub default_max_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    pub poll_interval_ms: u64,
    /// When set, resources come from `<url>/api/system-resources`
    pub resource_api_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    pub icon_interval_ms: u64,
    pub icon_animation: bool,
    pub theme: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", name, raw)),
        Err(_) => Ok(default),
    }
}

/// Timer periods in milliseconds; zero is refused.
fn parse_interval(name: &str, default: u64) -> Result<u64> {
    let ms = parse_var(name, default)?;
    if ms == 0 {
        anyhow::bail!("{} must be greater than zero", name);
    }
    Ok(ms)
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pdf-genius")
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let data_dir = env::var("PDF_GENIUS_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_data_dir());
        let log_dir = env::var("PDF_GENIUS_LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("logs"));

        Ok(Self {
            session: SessionConfig {
                mock_latency_ms: parse_var("MOCK_LATENCY_MS", 1500)?,
                view_switch_delay_ms: parse_var("VIEW_SWITCH_DELAY_MS", 100)?,
                model_load_ms: parse_var("MODEL_LOAD_MS", 800)?,
                default_temperature: parse_var("DEFAULT_TEMPERATURE", 0.7)?,
                default_max_tokens: parse_var("DEFAULT_MAX_TOKENS", 512)?,
            },
            monitor: MonitorConfig {
                poll_interval_ms: parse_interval("POLL_INTERVAL_MS", 2000)?,
                resource_api_url: env::var("RESOURCE_API_URL")
                    .ok()
                    .filter(|u| !u.trim().is_empty()),
            },
            ui: UiConfig {
                icon_interval_ms: parse_interval("ICON_INTERVAL_MS", 5000)?,
                icon_animation: true,
                theme: env::var("PDF_GENIUS_THEME").ok(),
            },
            paths: PathsConfig { data_dir, log_dir },
        })
    }

    pub fn mock_latency(&self) -> Duration {
        Duration::from_millis(self.session.mock_latency_ms)
    }

    pub fn view_switch_delay(&self) -> Duration {
        Duration::from_millis(self.session.view_switch_delay_ms)
    }

    pub fn model_load_delay(&self) -> Duration {
        Duration::from_millis(self.session.model_load_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.monitor.poll_interval_ms)
    }

    pub fn icon_interval(&self) -> Duration {
        Duration::from_millis(self.ui.icon_interval_ms)
    }

    /// Generation defaults, snapped to the allowed ranges
    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams::new(self.session.default_temperature, self.session.default_max_tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_var_default_and_error() {
        assert_eq!(parse_var::<u64>("PDF_GENIUS_TEST_UNSET_VAR", 42).unwrap(), 42);

        env::set_var("PDF_GENIUS_TEST_BAD_VAR", "fast");
        assert!(parse_var::<u64>("PDF_GENIUS_TEST_BAD_VAR", 1).is_err());
        env::set_var("PDF_GENIUS_TEST_BAD_VAR", " 250 ");
        assert_eq!(parse_var::<u64>("PDF_GENIUS_TEST_BAD_VAR", 1).unwrap(), 250);
        env::remove_var("PDF_GENIUS_TEST_BAD_VAR");
    }

    #[test]
    fn test_zero_interval_is_refused() {
        assert_eq!(parse_interval("PDF_GENIUS_TEST_UNSET_INTERVAL", 2000).unwrap(), 2000);

        env::set_var("PDF_GENIUS_TEST_ZERO_INTERVAL", "0");
        let err = parse_interval("PDF_GENIUS_TEST_ZERO_INTERVAL", 2000).unwrap_err();
        assert!(err.to_string().contains("must be greater than zero"));
        env::set_var("PDF_GENIUS_TEST_ZERO_INTERVAL", "750");
        assert_eq!(parse_interval("PDF_GENIUS_TEST_ZERO_INTERVAL", 2000).unwrap(), 750);
        env::remove_var("PDF_GENIUS_TEST_ZERO_INTERVAL");
    }
}
