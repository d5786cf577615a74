//! Analysis Backend
//!
//! The session controller talks to analysis services only through
//! [`BackendGateway`]. The bundled [`MockBackend`] simulates a document
//! analysis service; tests swap in deterministic fakes.

pub mod mock;

pub use mock::MockBackend;

use async_trait::async_trait;

use crate::models::{AnalysisRequest, AnalysisResponse, Report};
use crate::types::BackendResult;

pub const REPORT_CONTENT_TYPE: &str = "text/csv";

#[async_trait]
pub trait BackendGateway: Send + Sync {
    /// Run one analysis. Single-shot: no retry, no cancellation, no timeout.
    async fn analyze(&self, request: AnalysisRequest) -> BackendResult<AnalysisResponse>;

    /// Produce a `name,value` CSV export for the query.
    async fn generate_report(&self, query: &str, document_names: &[String]) -> BackendResult<Report>;
}
