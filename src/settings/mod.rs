//! Settings Module
//!
//! The theme preference is the only state that outlives a session. It is
//! resolved once at startup (persisted value, then environment preference,
//! then `system`) and written through on every change.

pub mod storage;

pub use storage::*;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::types::SettingsError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    /// Capitalized label for buttons and headers
    pub fn label(&self) -> &'static str {
        match self {
            Theme::Light => "Light",
            Theme::Dark => "Dark",
            Theme::System => "System",
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
            Theme::System => write!(f, "system"),
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            other => Err(SettingsError::UnknownTheme(other.to_string())),
        }
    }
}

/// Environment preference: an explicit theme name wins, otherwise the
/// terminal background from `COLORFGBG` ("fg;bg") decides.
pub fn detect_preference(explicit: Option<&str>, colorfgbg: Option<&str>) -> Option<Theme> {
    if let Some(theme) = explicit.and_then(|v| v.parse::<Theme>().ok()) {
        return Some(theme);
    }
    let background = colorfgbg?.rsplit(';').next()?.trim().parse::<u8>().ok()?;
    match background {
        0..=6 | 8 => Some(Theme::Dark),
        _ => Some(Theme::Light),
    }
}

pub fn preference_from_env() -> Option<Theme> {
    let explicit = std::env::var("PDF_GENIUS_THEME").ok();
    let colorfgbg = std::env::var("COLORFGBG").ok();
    detect_preference(explicit.as_deref(), colorfgbg.as_deref())
}

/// Current theme plus write-through persistence
pub struct ThemeSettings {
    storage: SettingsStorage,
    theme: Theme,
}

impl ThemeSettings {
    /// Resolve the startup theme: persisted, else `preference`, else system.
    pub async fn load(storage: SettingsStorage, preference: Option<Theme>) -> Self {
        let persisted = match storage.load_theme().await {
            Ok(theme) => theme,
            Err(e) => {
                warn!("Failed to read persisted theme, ignoring it: {}", e);
                None
            }
        };
        let theme = persisted.or(preference).unwrap_or_default();
        info!(theme = %theme, persisted = persisted.is_some(), "Theme resolved");
        Self { storage, theme }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub async fn set(&mut self, theme: Theme) -> Result<(), SettingsError> {
        self.theme = theme;
        self.storage.save_theme(theme).await
    }
}
