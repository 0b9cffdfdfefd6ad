use axum::{
    body::Body,
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::files::dtos::{
    ConvertResponseDto, DeleteFileResponseDto, FileResponseDto, ParseResponseDto, UploadFileDto,
};
use crate::features::files::services::{ConversionOutcome, FileService};
use crate::shared::constants::{DEFAULT_CONTENT_TYPE, UPLOAD_FIELD_NAME};
use crate::shared::types::ErrorResponse;

fn multipart_error(e: MultipartError) -> AppError {
    debug!("Failed to read multipart data: {}", e);
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::BadRequest(format!("Failed to read multipart data: {}", e.body_text()))
    }
}

/// Upload a file
///
/// Accepts multipart/form-data with a single `file` part. The part filename
/// is sanitized and used as the stored name, replacing any previous file of
/// that name.
#[utoipa::path(
    post,
    path = "/upload",
    tag = "files",
    request_body(
        content = UploadFileDto,
        content_type = "multipart/form-data",
    ),
    responses(
        (status = 200, description = "File stored", body = FileResponseDto),
        (status = 400, description = "No file part or empty filename", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    mut multipart: Multipart,
) -> Result<Json<FileResponseDto>> {
    let mut upload: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD_NAME) {
            debug!("Ignoring multipart field: {:?}", field.name());
            continue;
        }

        // A part without a filename is a plain form value, not a file
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field
            .content_type()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let data = field.bytes().await.map_err(multipart_error)?;

        upload = Some((file_name, content_type, data.to_vec()));
        break;
    }

    let (file_name, content_type, data) =
        upload.ok_or_else(|| AppError::BadRequest("No file part".to_string()))?;
    if file_name.is_empty() {
        return Err(AppError::BadRequest("No selected file".to_string()));
    }

    let record = service
        .upload(&user.username, &file_name, &content_type, &data)
        .await?;
    Ok(Json(record.into()))
}

/// List the caller's files
#[utoipa::path(
    get,
    path = "/files",
    tag = "files",
    responses(
        (status = 200, description = "Files owned by the caller, oldest first", body = [FileResponseDto]),
        (status = 401, description = "Authentication required", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_files(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
) -> Json<Vec<FileResponseDto>> {
    let files = service.list(&user.username).await;
    Json(files.into_iter().map(FileResponseDto::from).collect())
}

/// Delete one of the caller's files
///
/// Only the owner can delete a file. PDFs converted from it are kept.
#[utoipa::path(
    delete,
    path = "/files/{filename}",
    tag = "files",
    params(
        ("filename" = String, Path, description = "Stored file name")
    ),
    responses(
        (status = 200, description = "File deleted", body = DeleteFileResponseDto),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "No such file owned by the caller", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    Path(filename): Path<String>,
) -> Result<Json<DeleteFileResponseDto>> {
    service.delete(&user.username, &filename).await?;
    Ok(Json(DeleteFileResponseDto::deleted()))
}

/// Convert an uploaded PNG or JPEG into a PDF
#[utoipa::path(
    post,
    path = "/convert/{filename}",
    tag = "files",
    params(
        ("filename" = String, Path, description = "Stored file name")
    ),
    responses(
        (status = 200, description = "Download reference of the PDF", body = ConvertResponseDto),
        (status = 400, description = "Only PNG/JPG files can be converted", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "File not found", body = ErrorResponse),
        (status = 500, description = "Conversion failed", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn convert_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    Path(filename): Path<String>,
) -> Result<Json<ConvertResponseDto>> {
    let response = match service.convert(&user.username, &filename).await? {
        ConversionOutcome::AlreadyPdf { download_url } => ConvertResponseDto {
            message: Some("Already PDF".to_string()),
            download_url,
        },
        ConversionOutcome::Converted { download_url } => ConvertResponseDto {
            message: None,
            download_url,
        },
    };
    Ok(Json(response))
}

/// Download a file as an attachment
///
/// Converted PDFs shadow raw uploads of the same name.
#[utoipa::path(
    get,
    path = "/download/{filename}",
    tag = "files",
    params(
        ("filename" = String, Path, description = "File name, may include a sub path")
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "File not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn download_file(
    _user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    Path(filename): Path<String>,
) -> Result<Response> {
    let download = service.open_download(&filename).await?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        download.name.replace(['"', '\\'], "")
    );
    let disposition = HeaderValue::from_str(&disposition)
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
    let content_type = HeaderValue::from_str(&download.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));

    let body = Body::from_stream(ReaderStream::new(download.file));
    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CONTENT_LENGTH, HeaderValue::from(download.size)),
        ],
        body,
    )
        .into_response())
}

/// Extract text from an uploaded PDF
#[utoipa::path(
    get,
    path = "/parse/{filename}",
    tag = "files",
    params(
        ("filename" = String, Path, description = "Stored file name")
    ),
    responses(
        (status = 200, description = "Extracted text", body = ParseResponseDto),
        (status = 400, description = "Not a PDF", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "File not found", body = ErrorResponse),
        (status = 500, description = "Parse failed", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn parse_file(
    _user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    Path(filename): Path<String>,
) -> Result<Json<ParseResponseDto>> {
    let extracted = service.extract_text(&filename).await?;
    Ok(Json(ParseResponseDto {
        text: extracted.text,
    }))
}
