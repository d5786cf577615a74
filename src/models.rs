// Core session models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::llm::GenerationParams;

/// An ingested PDF document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: uuid::Uuid,
    pub name: String,
    pub content: String,
    pub page_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// One `{name, value}` pair of chart data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub name: String,
    pub value: f64,
}

impl DataPoint {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Pie,
    Line,
}

impl std::fmt::Display for ChartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChartKind::Bar => write!(f, "bar"),
            ChartKind::Pie => write!(f, "pie"),
            ChartKind::Line => write!(f, "line"),
        }
    }
}

impl std::str::FromStr for ChartKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bar" => Ok(ChartKind::Bar),
            "pie" => Ok(ChartKind::Pie),
            "line" => Ok(ChartKind::Line),
            other => Err(format!("unknown chart kind: {}", other)),
        }
    }
}

/// A conversation log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    /// Present only on visualization results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attached_data: Option<Vec<DataPoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_kind: Option<ChartKind>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            attached_data: None,
            chart_kind: None,
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            attached_data: None,
            chart_kind: None,
            timestamp: Utc::now(),
        }
    }

    /// Assistant message carrying visualization data
    pub fn assistant_with_data(
        content: impl Into<String>,
        data: Vec<DataPoint>,
        chart_kind: Option<ChartKind>,
    ) -> Self {
        Self {
            attached_data: Some(data),
            chart_kind,
            ..Self::assistant(content)
        }
    }
}

/// Which response path a query takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    Visualization,
    Generic,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub query: String,
    pub document_names: Vec<String>,
    pub kind: AnalysisKind,
    /// Display label of the active model
    pub model: String,
    pub params: GenerationParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub narrative: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<DataPoint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_kind: Option<ChartKind>,
}

impl AnalysisResponse {
    pub fn narrative(text: impl Into<String>) -> Self {
        Self {
            narrative: text.into(),
            data: None,
            chart_kind: None,
        }
    }

    pub fn chart(text: impl Into<String>, data: Vec<DataPoint>, kind: ChartKind) -> Self {
        Self {
            narrative: text.into(),
            data: Some(data),
            chart_kind: Some(kind),
        }
    }

    pub fn has_chart_data(&self) -> bool {
        self.data.as_ref().map_or(false, |d| !d.is_empty())
    }
}

/// A generated export blob.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub content_type: String,
    pub bytes: bytes::Bytes,
}

/// A file handed to the ingestion boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            data,
        }
    }
}
