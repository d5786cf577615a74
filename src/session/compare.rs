// Side-by-side comparison of the first two documents (simulated findings)

use serde::Serialize;

use crate::models::Document;
use crate::types::CompareError;

const KEY_POINTS: [&str; 3] = [
    "This is a simulated key point from the document",
    "Another important concept from this PDF",
    "A third significant item extracted from the text",
];

const SIMILARITIES: [&str; 3] = [
    "This is a simulated common point between documents",
    "Both documents mention this similar concept",
    "This topic appears in both documents with similar context",
];

const DIFFERENCES: [&str; 3] = [
    "Document 1 focuses on X while Document 2 emphasizes Y",
    "This concept is presented differently in each document",
    "Document 1 includes this information that is absent in Document 2",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentSummary {
    pub name: String,
    pub page_count: u32,
    pub key_points: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub documents: [DocumentSummary; 2],
    pub similarities: Vec<String>,
    pub differences: Vec<String>,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn summarize(doc: &Document) -> DocumentSummary {
    DocumentSummary {
        name: doc.name.clone(),
        page_count: doc.page_count,
        key_points: owned(&KEY_POINTS),
    }
}

pub fn compare(documents: &[Document]) -> Result<ComparisonReport, CompareError> {
    match documents {
        [first, second, ..] => Ok(ComparisonReport {
            documents: [summarize(first), summarize(second)],
            similarities: owned(&SIMILARITIES),
            differences: owned(&DIFFERENCES),
        }),
        _ => Err(CompareError::NotEnoughDocuments(documents.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(name: &str, pages: u32) -> Document {
        Document {
            id: uuid::Uuid::new_v4(),
            name: name.to_string(),
            content: String::new(),
            page_count: pages,
        }
    }

    #[test]
    fn test_needs_two_documents() {
        assert_eq!(compare(&[]), Err(CompareError::NotEnoughDocuments(0)));
        assert_eq!(compare(&[doc("a.pdf", 1)]), Err(CompareError::NotEnoughDocuments(1)));
    }

    #[test]
    fn test_uses_first_two() {
        let docs = vec![doc("a.pdf", 4), doc("b.pdf", 9), doc("c.pdf", 2)];
        let report = compare(&docs).unwrap();
        assert_eq!(report.documents[0].name, "a.pdf");
        assert_eq!(report.documents[1].page_count, 9);
        assert_eq!(report.documents[0].key_points.len(), 3);
        assert_eq!(report.similarities.len(), 3);
        assert_eq!(report.differences.len(), 3);
    }
}
