use chrono::{DateTime, Utc};

use crate::modules::pdf::{DocumentInfo, PdfSummary};

/// In-memory metadata for one uploaded file
#[derive(Debug, Clone, PartialEq)]
pub struct FileRecord {
    pub owner: String,
    pub filename: String,
    pub size: u64,
    pub mime_type: String,
    /// Present only for files stored with a `.pdf` name
    pub pdf: Option<PdfMetadata>,
    pub uploaded_at: DateTime<Utc>,
}

/// What could be learned about an uploaded PDF
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdfMetadata {
    /// `None` when the document could not be parsed
    pub pages: Option<u32>,
    pub doc_info: Option<DocumentInfo>,
}

impl PdfMetadata {
    pub fn unreadable() -> Self {
        Self::default()
    }
}

impl From<PdfSummary> for PdfMetadata {
    fn from(summary: PdfSummary) -> Self {
        Self {
            pages: Some(summary.page_count),
            doc_info: summary.info,
        }
    }
}
