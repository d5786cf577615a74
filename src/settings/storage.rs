//! Settings Storage
//!
//! File-backed key-value store for the persisted preferences. The file is a
//! flat JSON object; keys this build does not know about are preserved.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tokio::fs;
use tracing::{info, warn};

use super::Theme;
use crate::types::SettingsError;

const SETTINGS_FILE: &str = "settings.json";
const THEME_KEY: &str = "theme";

pub struct SettingsStorage {
    settings_path: PathBuf,
}

impl SettingsStorage {
    /// Storage rooted at `base_dir`, normally the configured data directory
    pub fn with_path(base_dir: PathBuf) -> Self {
        Self {
            settings_path: base_dir.join(SETTINGS_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.settings_path
    }

    async fn ensure_dir(&self) -> Result<(), SettingsError> {
        if let Some(parent) = self.settings_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    async fn read_map(&self) -> Result<Map<String, Value>, SettingsError> {
        if !fs::try_exists(&self.settings_path).await? {
            return Ok(Map::new());
        }
        let content = fs::read_to_string(&self.settings_path).await?;
        match serde_json::from_str::<Value>(&content)? {
            Value::Object(map) => Ok(map),
            _ => {
                warn!("Settings file {:?} is not a JSON object, starting fresh", self.settings_path);
                Ok(Map::new())
            }
        }
    }

    /// The persisted theme, if one was saved and is recognized.
    pub async fn load_theme(&self) -> Result<Option<Theme>, SettingsError> {
        let map = self.read_map().await?;
        let theme = map
            .get(THEME_KEY)
            .and_then(Value::as_str)
            .and_then(|v| v.parse::<Theme>().ok());
        Ok(theme)
    }

    pub async fn save_theme(&self, theme: Theme) -> Result<(), SettingsError> {
        self.ensure_dir().await?;
        let mut map = self.read_map().await.unwrap_or_default();
        map.insert(THEME_KEY.to_string(), Value::String(theme.to_string()));

        let content = serde_json::to_string_pretty(&Value::Object(map))?;
        fs::write(&self.settings_path, content).await?;

        info!("Saved theme '{}' to {:?}", theme, self.settings_path);
        Ok(())
    }
}
