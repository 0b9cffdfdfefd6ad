use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use crate::features::files::handlers::{
    convert_file, delete_file, download_file, list_files, parse_file, upload_file,
};
use crate::features::files::services::FileService;

/// Create routes for the files feature (all behind the auth middleware)
pub fn routes(file_service: Arc<FileService>, max_upload_size: usize) -> Router {
    Router::new()
        .route(
            "/upload",
            post(upload_file).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/files", get(list_files))
        .route("/files/{filename}", delete(delete_file))
        .route("/convert/{filename}", post(convert_file))
        .route("/download/{*filename}", get(download_file))
        .route("/parse/{filename}", get(parse_file))
        .with_state(file_service)
}
