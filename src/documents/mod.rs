//! Document Store
//!
//! Holds the PDFs uploaded during the active session, in insertion order.

pub mod ingest;

pub use ingest::{ingest, IngestReport, PLACEHOLDER_CONTENT};

use crate::models::Document;

#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    documents: Vec<Document>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append documents. Returns false (and changes nothing) for an empty batch.
    pub fn add(&mut self, documents: Vec<Document>) -> bool {
        if documents.is_empty() {
            return false;
        }
        self.documents.extend(documents);
        true
    }

    pub fn clear(&mut self) {
        self.documents.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn list(&self) -> &[Document] {
        &self.documents
    }

    pub fn names(&self) -> Vec<String> {
        self.documents.iter().map(|d| d.name.clone()).collect()
    }
}
