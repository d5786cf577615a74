// Simulated analysis service
// Answers after a fixed latency with canned narratives and chart series.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use super::{BackendGateway, REPORT_CONTENT_TYPE};
use crate::analysis;
use crate::models::{AnalysisKind, AnalysisRequest, AnalysisResponse, ChartKind, DataPoint, Report};
use crate::types::{BackendError, BackendResult};

pub const DEFAULT_LATENCY: Duration = Duration::from_millis(1500);

const GENERIC_NARRATIVE: &str = "Analyzed the document content: The documents contain information \
    about financial trends and market analysis for Q1-Q2 2024.";

#[derive(Debug, Clone)]
pub struct MockBackend {
    latency: Duration,
    fail_with: Option<String>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new(DEFAULT_LATENCY)
    }
}

impl MockBackend {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            fail_with: None,
        }
    }

    /// A backend whose every call rejects with the given message
    pub fn failing(latency: Duration, message: impl Into<String>) -> Self {
        Self {
            latency,
            fail_with: Some(message.into()),
        }
    }

    async fn simulate(&self) -> BackendResult<()> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        match &self.fail_with {
            Some(message) => Err(BackendError::new(message.clone())),
            None => Ok(()),
        }
    }

    /// The canned answer for a request, without latency.
    pub fn respond(request: &AnalysisRequest) -> AnalysisResponse {
        let query = request.query.to_lowercase();

        if query.contains("pie chart") {
            AnalysisResponse::chart(
                "Generated pie chart visualization of the document data.",
                category_series(),
                ChartKind::Pie,
            )
        } else if query.contains("bar chart") {
            AnalysisResponse::chart(
                "Generated bar chart visualization of the document data.",
                monthly_series(),
                ChartKind::Bar,
            )
        } else if query.contains("line chart") {
            AnalysisResponse::chart(
                "Generated line chart visualization of the document trends.",
                monthly_series(),
                ChartKind::Line,
            )
        } else if request.kind == AnalysisKind::Visualization {
            AnalysisResponse::chart(
                "Generated bar chart visualization of the document data.",
                monthly_series(),
                ChartKind::Bar,
            )
        } else {
            AnalysisResponse::narrative(GENERIC_NARRATIVE)
        }
    }
}

#[async_trait]
impl BackendGateway for MockBackend {
    async fn analyze(&self, request: AnalysisRequest) -> BackendResult<AnalysisResponse> {
        debug!(kind = ?request.kind, documents = request.document_names.len(), "Mock analysis started");
        self.simulate().await?;
        let response = Self::respond(&request);
        info!(
            chart = ?response.chart_kind,
            points = response.data.as_ref().map_or(0, |d| d.len()),
            "Mock analysis finished"
        );
        Ok(response)
    }

    async fn generate_report(&self, query: &str, document_names: &[String]) -> BackendResult<Report> {
        debug!(query_len = query.len(), documents = document_names.len(), "Mock report requested");
        self.simulate().await?;
        let csv = analysis::to_csv(&category_series())
            .map_err(|e| BackendError::new(format!("Report generation failed: {}", e)))?;
        Ok(Report {
            content_type: REPORT_CONTENT_TYPE.to_string(),
            bytes: bytes::Bytes::from(csv),
        })
    }
}

fn category_series() -> Vec<DataPoint> {
    vec![
        DataPoint::new("Category A", 400.0),
        DataPoint::new("Category B", 300.0),
        DataPoint::new("Category C", 300.0),
        DataPoint::new("Category D", 200.0),
    ]
}

fn monthly_series() -> Vec<DataPoint> {
    vec![
        DataPoint::new("Jan", 400.0),
        DataPoint::new("Feb", 300.0),
        DataPoint::new("Mar", 500.0),
        DataPoint::new("Apr", 200.0),
        DataPoint::new("May", 350.0),
        DataPoint::new("Jun", 450.0),
    ]
}
