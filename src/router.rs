//! Analysis Router
//!
//! Decides whether a query asks for a visualization or a plain answer and
//! forwards it to the backend. Picking pie/bar/line is left to the backend.

use std::sync::Arc;

use tracing::info;

use crate::backend::BackendGateway;
use crate::llm::GenerationParams;
use crate::models::{AnalysisKind, AnalysisRequest, AnalysisResponse};
use crate::types::BackendResult;

const VISUALIZATION_KEYWORDS: [&str; 4] = ["chart", "graph", "plot", "visualize"];

#[derive(Clone)]
pub struct AnalysisRouter {
    gateway: Arc<dyn BackendGateway>,
}

impl AnalysisRouter {
    pub fn new(gateway: Arc<dyn BackendGateway>) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> Arc<dyn BackendGateway> {
        Arc::clone(&self.gateway)
    }

    /// Keyword classification, case-insensitive substring match
    pub fn classify(query: &str) -> AnalysisKind {
        let lower = query.to_lowercase();
        if VISUALIZATION_KEYWORDS.iter().any(|k| lower.contains(k)) {
            AnalysisKind::Visualization
        } else {
            AnalysisKind::Generic
        }
    }

    /// Build the request for `query` and run it on the matching path.
    pub async fn dispatch(
        &self,
        query: String,
        document_names: Vec<String>,
        model: String,
        params: GenerationParams,
    ) -> BackendResult<AnalysisResponse> {
        let kind = Self::classify(&query);
        info!(kind = ?kind, documents = document_names.len(), model = %model, "Dispatching analysis");

        let request = AnalysisRequest {
            query,
            document_names,
            kind,
            model,
            params,
        };
        let mut response = self.gateway.analyze(request).await?;

        if kind == AnalysisKind::Generic {
            // Generic answers never carry chart data.
            response.data = None;
            response.chart_kind = None;
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChartKind, DataPoint, Report};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[test]
    fn test_classify_visualization() {
        assert_eq!(AnalysisRouter::classify("show me a bar chart"), AnalysisKind::Visualization);
        assert_eq!(AnalysisRouter::classify("GRAPH the totals"), AnalysisKind::Visualization);
        assert_eq!(AnalysisRouter::classify("can you plot revenue?"), AnalysisKind::Visualization);
        assert_eq!(AnalysisRouter::classify("Visualize Q2"), AnalysisKind::Visualization);
        // Substring match, not word match
        assert_eq!(AnalysisRouter::classify("paragraphs about plotting"), AnalysisKind::Visualization);
    }

    #[test]
    fn test_classify_generic() {
        assert_eq!(AnalysisRouter::classify("summarize the report"), AnalysisKind::Generic);
        assert_eq!(AnalysisRouter::classify("what is the total revenue?"), AnalysisKind::Generic);
        assert_eq!(AnalysisRouter::classify(""), AnalysisKind::Generic);
    }

    struct RecordingGateway {
        seen: Mutex<Vec<AnalysisKind>>,
    }

    #[async_trait]
    impl BackendGateway for RecordingGateway {
        async fn analyze(&self, request: AnalysisRequest) -> BackendResult<AnalysisResponse> {
            self.seen.lock().unwrap().push(request.kind);
            Ok(AnalysisResponse::chart(
                "always a chart",
                vec![DataPoint::new("x", 1.0)],
                ChartKind::Bar,
            ))
        }

        async fn generate_report(&self, _query: &str, _names: &[String]) -> BackendResult<Report> {
            unreachable!("not used by router tests")
        }
    }

    #[tokio::test]
    async fn test_dispatch_passes_kind_and_strips_generic_data() {
        let gateway = Arc::new(RecordingGateway {
            seen: Mutex::new(Vec::new()),
        });
        let router = AnalysisRouter::new(gateway.clone());

        let generic = router
            .dispatch("summarize".into(), vec!["a.pdf".into()], "Phi-2".into(), GenerationParams::default())
            .await
            .unwrap();
        assert!(generic.data.is_none());
        assert!(generic.chart_kind.is_none());

        let chart = router
            .dispatch("plot it".into(), vec!["a.pdf".into()], "Phi-2".into(), GenerationParams::default())
            .await
            .unwrap();
        assert!(chart.has_chart_data());

        assert_eq!(
            *gateway.seen.lock().unwrap(),
            vec![AnalysisKind::Generic, AnalysisKind::Visualization]
        );
    }
}
