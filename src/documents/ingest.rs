// File ingestion boundary
// Text extraction is simulated: accepted files get placeholder content and a
// random page count.

use rand::Rng;
use tracing::{info, warn};

use crate::models::{Document, UploadedFile};
use crate::types::IngestionError;

pub const PLACEHOLDER_CONTENT: &str = "This is simulated PDF content. In a real implementation, \
    this would contain the extracted text from the PDF.";

const MAX_SIMULATED_PAGES: u32 = 20;

/// Outcome of one upload batch
#[derive(Debug, Default)]
pub struct IngestReport {
    pub accepted: Vec<Document>,
    pub rejected: Vec<IngestionError>,
}

/// Turn a batch of uploads into documents. Non-PDF files are rejected one by
/// one; the rest of the batch still goes through.
pub fn ingest(files: &[UploadedFile]) -> IngestReport {
    let mut report = IngestReport::default();
    let mut rng = rand::thread_rng();

    for file in files {
        if !is_pdf(&file.content_type) {
            warn!(filename = %file.filename, content_type = %file.content_type, "Rejected non-PDF upload");
            report.rejected.push(IngestionError::InvalidFileType {
                filename: file.filename.clone(),
                content_type: file.content_type.clone(),
            });
            continue;
        }

        report.accepted.push(Document {
            id: uuid::Uuid::new_v4(),
            name: file.filename.clone(),
            content: PLACEHOLDER_CONTENT.to_string(),
            page_count: rng.gen_range(1..=MAX_SIMULATED_PAGES),
        });
    }

    info!(
        accepted = report.accepted.len(),
        rejected = report.rejected.len(),
        "Processed upload batch"
    );
    report
}

fn is_pdf(content_type: &str) -> bool {
    match content_type.parse::<mime::Mime>() {
        Ok(parsed) => parsed.essence_str() == mime::APPLICATION_PDF.essence_str(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_batch_rejects_individually() {
        let files = vec![
            UploadedFile::new("report.pdf", "application/pdf", b"%PDF-1.7".to_vec()),
            UploadedFile::new("notes.txt", "text/plain", b"hello".to_vec()),
            UploadedFile::new("paper.pdf", "application/pdf", Vec::new()),
        ];

        let report = ingest(&files);

        assert_eq!(report.accepted.len(), 2);
        assert_eq!(report.accepted[0].name, "report.pdf");
        assert_eq!(report.accepted[1].name, "paper.pdf");
        assert_eq!(
            report.rejected,
            vec![IngestionError::InvalidFileType {
                filename: "notes.txt".to_string(),
                content_type: "text/plain".to_string(),
            }]
        );
    }

    #[test]
    fn test_accepted_documents_are_simulated() {
        let files = vec![UploadedFile::new("a.pdf", "application/pdf", Vec::new()); 10];
        let report = ingest(&files);
        for doc in &report.accepted {
            assert!((1..=MAX_SIMULATED_PAGES).contains(&doc.page_count));
            assert_eq!(doc.content, PLACEHOLDER_CONTENT);
        }
        let first = report.accepted[0].id;
        assert!(report.accepted.iter().skip(1).all(|d| d.id != first));
    }

    #[test]
    fn test_media_type_check() {
        assert!(is_pdf("application/pdf"));
        assert!(is_pdf("application/pdf; charset=binary"));
        assert!(!is_pdf("application/x-pdf"));
        assert!(!is_pdf(""));
        assert!(!is_pdf("image/png"));
    }
}
