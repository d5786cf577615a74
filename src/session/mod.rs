//! Chat Session
//!
//! In-memory state of one interactive session and the controller that
//! guards it.
//!
//! ```text
//! submit(query)
//!      │
//!      ▼
//! ┌──────────────┐  no documents / no model
//! │  Validating  │ ───────────────────────────► notification, Idle
//! └──────────────┘
//!      │ user message appended, input cleared
//!      ▼
//! ┌──────────────┐  AnalysisRouter → BackendGateway (spawned task)
//! │   Pending    │
//! └──────────────┘
//!      │ SessionEvent over mpsc
//!      ▼
//!  assistant message (or error notification), Idle
//! ```

pub mod compare;
pub mod controller;

pub use compare::{compare, ComparisonReport, DocumentSummary};
pub use controller::{ConversationController, SessionEvent, SubmitOutcome, GREETING};

use serde::{Deserialize, Serialize};

use crate::analysis::ChartData;
use crate::documents::DocumentStore;
use crate::llm::{GenerationParams, ModelSelectionState};
use crate::models::Message;

/// Analyze one PDF at a time, or compare two side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiMode {
    #[default]
    Single,
    Compare,
}

impl std::str::FromStr for UiMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "single" => Ok(UiMode::Single),
            "compare" => Ok(UiMode::Compare),
            other => Err(format!("unknown mode: {}", other)),
        }
    }
}

/// Surface currently shown in the main panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Chat,
    Compare,
    Visualization,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
}

/// A transient user-facing notice (toast)
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            level: NotificationLevel::Info,
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            level: NotificationLevel::Error,
        }
    }
}

/// Everything one session holds. Only the controller mutates it.
#[derive(Debug, Default)]
pub struct SessionState {
    pub documents: DocumentStore,
    pub model: ModelSelectionState,
    pub params: GenerationParams,
    pub messages: Vec<Message>,
    pub input: String,
    pub is_loading: bool,
    pub mode: UiMode,
    pub view: View,
    pub chart: Option<ChartData>,
    /// Set while the selector is in "custom path" entry
    pub custom_path_entry: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(params: GenerationParams) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    pub fn is_model_running(&self) -> bool {
        self.model.status().running
    }

    /// Compare view is offered only in compare mode with two or more PDFs.
    pub fn compare_available(&self) -> bool {
        self.mode == UiMode::Compare && self.documents.len() >= 2
    }
}
