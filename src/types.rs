// Error taxonomy for the session engine

/// Errors raised by the conversation controller.
///
/// Precondition failures are raised synchronously, before any backend work
/// starts, and never reach the message log.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("No PDF document: please upload at least one PDF document first")]
    NoDocuments,

    #[error("No LLM model selected: please select or provide a path to an LLM model")]
    NoModel,
}

/// A rejected analysis or report call. No structured codes are defined.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct BackendError {
    pub message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Per-file rejection raised at the ingestion boundary.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IngestionError {
    #[error("{filename} is not a PDF file")]
    InvalidFileType {
        filename: String,
        content_type: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Settings I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings format error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown theme: {0}")]
    UnknownTheme(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("Nothing to chart: the data set is empty")]
    EmptyData,

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Chart rendering failed: {0}")]
    Render(String),

    #[error("Chart I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompareError {
    #[error("Please select at least two documents to compare (have {0})")]
    NotEnoughDocuments(usize),
}

pub type SessionResult<T> = std::result::Result<T, SessionError>;
pub type BackendResult<T> = std::result::Result<T, BackendError>;
