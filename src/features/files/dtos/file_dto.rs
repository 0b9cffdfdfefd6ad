use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::files::models::FileRecord;
use crate::modules::pdf::DocumentInfo;

/// Metadata of an uploaded file
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FileResponseDto {
    /// Owner of the upload
    pub username: String,
    pub filename: String,
    /// Size on disk in bytes
    pub size: u64,
    /// Content type declared by the client
    pub mimetype: String,
    /// Page count, only present for PDFs (`null` when unreadable)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<u32>)]
    pub pages: Option<Option<u32>>,
    /// Title/Author/Creator, only present when the PDF carries any of them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docinfo: Option<DocumentInfo>,
    pub uploaded_at: DateTime<Utc>,
}

impl From<FileRecord> for FileResponseDto {
    fn from(record: FileRecord) -> Self {
        let (pages, docinfo) = match record.pdf {
            Some(pdf) => (Some(pdf.pages), pdf.doc_info),
            None => (None, None),
        };

        Self {
            username: record.owner,
            filename: record.filename,
            size: record.size,
            mimetype: record.mime_type,
            pages,
            docinfo,
            uploaded_at: record.uploaded_at,
        }
    }
}

/// Multipart body of `POST /upload`, for the OpenAPI document only
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadFileDto {
    /// The file to store; its part filename becomes the stored name
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteFileResponseDto {
    pub status: String,
}

impl DeleteFileResponseDto {
    pub fn deleted() -> Self {
        Self {
            status: "deleted".to_string(),
        }
    }
}

/// Where to fetch the PDF rendition of a file
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ConvertResponseDto {
    /// Set to "Already PDF" when no conversion was needed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub download_url: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ParseResponseDto {
    /// Extracted text, ending in a truncation marker when cut short
    pub text: String,
}
