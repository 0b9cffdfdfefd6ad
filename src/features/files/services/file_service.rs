use chrono::Utc;
use std::sync::Arc;
use tokio::fs::File;
use tracing::{debug, info, warn};

use crate::core::error::{AppError, Result};
use crate::features::files::models::{FileRecord, PdfMetadata};
use crate::features::files::services::FileRegistry;
use crate::modules::pdf::{self, ExtractedText};
use crate::modules::storage::{LocalStorage, StorageArea};
use crate::shared::constants::{
    CONVERTIBLE_EXTENSIONS, DOWNLOAD_ROUTE_PREFIX, MAX_EXTRACTED_TEXT_CHARS, PDF_EXTENSION,
};
use crate::shared::filename::{extension_of, is_pdf_name, secure_filename, stem_of};

/// Result of a conversion request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    /// The file was a PDF already; nothing was written
    AlreadyPdf { download_url: String },
    Converted { download_url: String },
}

/// An opened file ready to be streamed back to the client
#[derive(Debug)]
pub struct DownloadFile {
    pub file: File,
    pub name: String,
    pub content_type: String,
    pub size: u64,
}

pub struct FileService {
    registry: Arc<FileRegistry>,
    storage: Arc<LocalStorage>,
}

impl FileService {
    pub fn new(registry: Arc<FileRegistry>, storage: Arc<LocalStorage>) -> Self {
        Self { registry, storage }
    }

    /// Store an upload and register it under `owner`
    ///
    /// PDF metadata is best effort: a document that fails to parse is still
    /// stored, with an unknown page count.
    pub async fn upload(
        &self,
        owner: &str,
        client_filename: &str,
        content_type: &str,
        data: &[u8],
    ) -> Result<FileRecord> {
        let filename = secure_filename(client_filename);
        if filename.is_empty() {
            return Err(AppError::BadRequest("No selected file".to_string()));
        }

        let size = self
            .storage
            .write(StorageArea::Uploads, &filename, data)
            .await?;

        let pdf = if is_pdf_name(&filename) {
            Some(describe_pdf(&filename, data.to_vec()).await)
        } else {
            None
        };

        let record = FileRecord {
            owner: owner.to_string(),
            filename,
            size,
            mime_type: content_type.to_string(),
            pdf,
            uploaded_at: Utc::now(),
        };
        self.registry.add(record.clone()).await;

        info!(
            "User '{}' uploaded '{}' ({} bytes)",
            owner, record.filename, record.size
        );
        Ok(record)
    }

    pub async fn list(&self, owner: &str) -> Vec<FileRecord> {
        self.registry.list_for(owner).await
    }

    /// Delete a file owned by `owner`
    ///
    /// Removes the registry entry and the same name from both storage areas.
    /// Derived files under another name (`photo.pdf` for `photo.png`) stay.
    pub async fn delete(&self, owner: &str, filename: &str) -> Result<()> {
        self.registry
            .remove_owned(owner, filename)
            .await
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

        self.storage
            .remove_if_exists(StorageArea::Uploads, filename)
            .await;
        self.storage
            .remove_if_exists(StorageArea::Converted, filename)
            .await;

        info!("User '{}' deleted '{}'", owner, filename);
        Ok(())
    }

    /// Convert an uploaded PNG/JPEG into a single page PDF
    ///
    /// Works on any file present on disk, whoever uploaded it.
    pub async fn convert(&self, requester: &str, filename: &str) -> Result<ConversionOutcome> {
        if !self.storage.exists(StorageArea::Uploads, filename).await {
            return Err(AppError::NotFound("File not found".to_string()));
        }

        if is_pdf_name(filename) {
            return Ok(ConversionOutcome::AlreadyPdf {
                download_url: download_url(filename),
            });
        }

        let convertible = extension_of(filename)
            .is_some_and(|ext| CONVERTIBLE_EXTENSIONS.contains(&ext.as_str()));
        if !convertible {
            return Err(AppError::UnsupportedType(
                "Only PNG/JPG files can be converted".to_string(),
            ));
        }

        let data = self.storage.read(StorageArea::Uploads, filename).await?;
        let pdf_bytes = tokio::task::spawn_blocking(move || pdf::image_to_pdf(&data))
            .await
            .map_err(|e| AppError::Internal(format!("Conversion task panicked: {}", e)))?
            .map_err(|e| AppError::ConversionFailed(e.to_string()))?;

        let output_name = format!("{}.{}", stem_of(filename), PDF_EXTENSION);
        self.storage
            .write(StorageArea::Converted, &output_name, &pdf_bytes)
            .await
            .map_err(|e| AppError::ConversionFailed(e.to_string()))?;

        info!(
            "User '{}' converted '{}' to '{}'",
            requester, filename, output_name
        );
        Ok(ConversionOutcome::Converted {
            download_url: download_url(&output_name),
        })
    }

    /// Open a file for download, converted output first
    pub async fn open_download(&self, path: &str) -> Result<DownloadFile> {
        let resolved = self
            .storage
            .resolve_download(path)
            .await
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

        let file = File::open(&resolved).await?;
        let size = file.metadata().await?.len();
        let name = resolved
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(path)
            .to_string();
        let content_type = mime_guess::from_path(&resolved)
            .first_or_octet_stream()
            .to_string();

        debug!("Serving '{}' ({} bytes)", resolved.display(), size);
        Ok(DownloadFile {
            file,
            name,
            content_type,
            size,
        })
    }

    /// Extract text from an uploaded PDF, capped at a fixed length
    pub async fn extract_text(&self, filename: &str) -> Result<ExtractedText> {
        if !self.storage.exists(StorageArea::Uploads, filename).await {
            return Err(AppError::NotFound("File not found".to_string()));
        }
        if !is_pdf_name(filename) {
            return Err(AppError::UnsupportedType("Not a PDF".to_string()));
        }

        let data = self.storage.read(StorageArea::Uploads, filename).await?;
        tokio::task::spawn_blocking(move || pdf::extract_text(&data, MAX_EXTRACTED_TEXT_CHARS))
            .await
            .map_err(|e| AppError::Internal(format!("Parse task panicked: {}", e)))?
            .map_err(|e| AppError::ExtractionFailed(e.to_string()))
    }
}

fn download_url(name: &str) -> String {
    format!("{}/{}", DOWNLOAD_ROUTE_PREFIX, name)
}

async fn describe_pdf(filename: &str, data: Vec<u8>) -> PdfMetadata {
    match tokio::task::spawn_blocking(move || pdf::inspect(&data)).await {
        Ok(Ok(summary)) => summary.into(),
        Ok(Err(e)) => {
            warn!("Could not read PDF '{}': {}", filename, e);
            PdfMetadata::unreadable()
        }
        Err(e) => {
            warn!("PDF inspection of '{}' panicked: {}", filename, e);
            PdfMetadata::unreadable()
        }
    }
}
