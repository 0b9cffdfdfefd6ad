use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth;
use crate::features::files::{dtos as files_dtos, handlers as files_handlers};
use crate::modules::pdf::DocumentInfo;
use crate::shared::types::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handlers::login,
        // Files
        files_handlers::upload_file,
        files_handlers::list_files,
        files_handlers::delete_file,
        files_handlers::convert_file,
        files_handlers::download_file,
        files_handlers::parse_file,
    ),
    components(
        schemas(
            ErrorResponse,
            // Auth
            auth::model::AuthenticatedUser,
            auth::dtos::LoginRequestDto,
            auth::dtos::LoginResponseDto,
            // Files
            files_dtos::UploadFileDto,
            files_dtos::FileResponseDto,
            files_dtos::DeleteFileResponseDto,
            files_dtos::ConvertResponseDto,
            files_dtos::ParseResponseDto,
            DocumentInfo,
        )
    ),
    tags(
        (name = "auth", description = "Login and session tokens"),
        (name = "files", description = "Upload, convert, download and parse files"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Filedesk API",
        version = "0.1.0",
        description = "API documentation for Filedesk",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
