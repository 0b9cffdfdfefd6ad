//! PDF module for document handling
//!
//! Reads page counts, document info and page text from uploaded PDFs,
//! and renders raster images (PNG/JPEG) into single-page PDFs.
//!
//! Everything here is synchronous and CPU bound; callers run it on the
//! blocking thread pool.

mod image_to_pdf;
mod reader;

use thiserror::Error;

pub use image_to_pdf::image_to_pdf;
pub use reader::{extract_text, inspect, DocumentInfo, ExtractedText, PdfSummary};

/// Errors produced while reading or writing PDF documents
#[derive(Debug, Error)]
pub enum PdfError {
    /// The underlying lopdf parser or writer returned an error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// The source image could not be decoded
    #[error("Image decode error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The bytes are an image type the converter does not handle
    #[error("Unsupported image: {0}")]
    UnsupportedImage(String),
}

pub type Result<T> = std::result::Result<T, PdfError>;
