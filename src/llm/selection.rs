//! Model Selection
//!
//! Tracks which local model is active, either picked from the catalog or
//! given as a custom path, plus the advisory loading/running flags.

use serde::{Deserialize, Serialize};

/// A model offered in the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogModel {
    pub id: &'static str,
    pub name: &'static str,
}

pub const MODEL_CATALOG: &[CatalogModel] = &[
    CatalogModel {
        id: "llama2-7b",
        name: "LLaMA 2 (7B)",
    },
    CatalogModel {
        id: "mistral-7b",
        name: "Mistral (7B)",
    },
    CatalogModel {
        id: "phi-2",
        name: "Phi-2",
    },
    CatalogModel {
        id: "ggml-gpt4all-j",
        name: "GPT4All-J",
    },
];

/// Look up a catalog entry by id
pub fn find_catalog_model(id: &str) -> Option<&'static CatalogModel> {
    MODEL_CATALOG.iter().find(|m| m.id == id)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModelStatus {
    pub loading: bool,
    pub running: bool,
}

/// Active model reference.
///
/// A model counts as selected when either field is non-empty. Selecting a
/// catalog model clears the custom path; setting a custom path leaves the
/// model id alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelSelectionState {
    model_id: String,
    custom_path: String,
    status: ModelStatus,
}

impl ModelSelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_catalog_model(&mut self, id: impl Into<String>) {
        self.model_id = id.into();
        self.custom_path.clear();
    }

    pub fn set_custom_path(&mut self, path: impl Into<String>) {
        self.custom_path = path.into();
    }

    /// Clear only the catalog id (switching the selector to "custom").
    pub fn clear_model_id(&mut self) {
        self.model_id.clear();
    }

    pub fn clear(&mut self) {
        self.model_id.clear();
        self.custom_path.clear();
    }

    pub fn is_selected(&self) -> bool {
        !self.model_id.is_empty() || !self.custom_path.is_empty()
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn custom_path(&self) -> &str {
        &self.custom_path
    }

    /// Display label: catalog name, raw id, then custom path.
    pub fn label(&self) -> Option<String> {
        if !self.model_id.is_empty() {
            let name = find_catalog_model(&self.model_id)
                .map(|m| m.name.to_string())
                .unwrap_or_else(|| self.model_id.clone());
            return Some(name);
        }
        if !self.custom_path.is_empty() {
            return Some(self.custom_path.clone());
        }
        None
    }

    pub fn status(&self) -> ModelStatus {
        self.status
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.status.loading = loading;
    }

    pub fn set_running(&mut self, running: bool) {
        self.status.running = running;
    }

    /// Loading or running; the resource monitor polls while this holds.
    pub fn is_active(&self) -> bool {
        self.status.loading || self.status.running
    }
}

pub const TEMPERATURE_MIN: f32 = 0.0;
pub const TEMPERATURE_MAX: f32 = 1.0;
pub const TEMPERATURE_STEP: f32 = 0.1;
pub const MAX_TOKENS_MIN: u32 = 64;
pub const MAX_TOKENS_MAX: u32 = 2048;
pub const MAX_TOKENS_STEP: u32 = 64;

/// Sampling parameters forwarded with every analysis request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 512,
        }
    }
}

impl GenerationParams {
    pub fn new(temperature: f32, max_tokens: u32) -> Self {
        let mut params = Self::default();
        params.set_temperature(temperature);
        params.set_max_tokens(max_tokens);
        params
    }

    /// Clamp to [0, 1] and snap to the 0.1 grid
    pub fn set_temperature(&mut self, value: f32) {
        let value = if value.is_finite() { value } else { Self::default().temperature };
        let clamped = value.clamp(TEMPERATURE_MIN, TEMPERATURE_MAX);
        let steps = (clamped / TEMPERATURE_STEP).round();
        self.temperature = (steps * TEMPERATURE_STEP * 10.0).round() / 10.0;
    }

    /// Clamp to [64, 2048] and snap to multiples of 64
    pub fn set_max_tokens(&mut self, value: u32) {
        let clamped = value.clamp(MAX_TOKENS_MIN, MAX_TOKENS_MAX);
        let steps = (clamped + MAX_TOKENS_STEP / 2) / MAX_TOKENS_STEP;
        self.max_tokens = (steps * MAX_TOKENS_STEP).clamp(MAX_TOKENS_MIN, MAX_TOKENS_MAX);
    }
}
