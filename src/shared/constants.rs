/// Text extraction stops once the accumulated output exceeds this many characters
pub const MAX_EXTRACTED_TEXT_CHARS: usize = 5000;

/// Appended to extracted text when it was cut short
pub const TRUNCATION_MARKER: &str = "\n... (truncated)";

/// Raster image extensions accepted by the PDF converter (lowercase, no dot)
pub const CONVERTIBLE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

pub const PDF_EXTENSION: &str = "pdf";

/// Content type recorded when the upload part declares none
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Multipart field that carries the uploaded file
pub const UPLOAD_FIELD_NAME: &str = "file";

/// Public prefix of download references handed back to clients
pub const DOWNLOAD_ROUTE_PREFIX: &str = "/download";
