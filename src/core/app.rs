use axum::{middleware::from_fn, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::middleware;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::features::auth::routes as auth_routes;
use crate::features::auth::{AuthService, CredentialStore, TokenService};
use crate::features::files::{routes as files_routes, FileRegistry, FileService};
use crate::modules::storage::LocalStorage;

/// Services shared by every request, wired once at startup
pub struct AppContext {
    pub config: Config,
    pub storage: Arc<LocalStorage>,
    pub token_service: Arc<TokenService>,
    pub auth_service: Arc<AuthService>,
    pub file_service: Arc<FileService>,
}

impl AppContext {
    /// Wire services with the seed user from config as the only account
    pub fn new(config: Config) -> Result<Self> {
        let credentials =
            CredentialStore::with_user(&config.auth.seed_username, &config.auth.seed_password)?;
        tracing::info!("Credential store seeded with user '{}'", config.auth.seed_username);

        Ok(Self::with_credentials(config, credentials))
    }

    pub fn with_credentials(config: Config, credentials: CredentialStore) -> Self {
        let credentials = Arc::new(credentials);
        let token_service = Arc::new(TokenService::new(&config.auth, Arc::clone(&credentials)));
        let auth_service = Arc::new(AuthService::new(credentials, Arc::clone(&token_service)));
        tracing::info!("Auth service initialized");

        let storage = Arc::new(LocalStorage::new(config.storage.clone()));
        let registry = Arc::new(FileRegistry::new());
        let file_service = Arc::new(FileService::new(registry, Arc::clone(&storage)));
        tracing::info!("File service initialized");

        Self {
            config,
            storage,
            token_service,
            auth_service,
            file_service,
        }
    }

    /// Build the full application router
    pub fn router(&self) -> Router {
        let config = &self.config;

        let swagger_modifier = SwaggerInfoModifier {
            title: config.swagger.title.clone(),
            version: config.swagger.version.clone(),
            description: config.swagger.description.clone(),
        };

        let mut openapi = ApiDoc::openapi();
        swagger_modifier.modify(&mut openapi);

        let swagger = if let Some(credentials) = config.swagger.credentials() {
            tracing::info!("Swagger UI basic auth enabled");
            Router::new()
                .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
                .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                    credentials,
                ))))
        } else {
            tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
            Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
        };

        // Protected routes (require a session token)
        let protected_routes = Router::new()
            .merge(files_routes::routes(
                Arc::clone(&self.file_service),
                config.app.max_request_body_size,
            ))
            .route_layer(axum::middleware::from_fn_with_state(
                Arc::clone(&self.token_service),
                middleware::auth_middleware,
            ));

        async fn health_check() -> axum::http::StatusCode {
            axum::http::StatusCode::OK
        }
        let health_route = Router::new().route("/health", axum::routing::get(health_check));

        let public_routes =
            Router::new().merge(auth_routes::public_routes(Arc::clone(&self.auth_service)));

        Router::new()
            .merge(swagger)
            .merge(protected_routes)
            .merge(public_routes)
            .merge(health_route)
            .layer(middleware::cors_layer(
                config.app.cors_allowed_origins.clone(),
            ))
            // Propagate X-Request-Id to response headers
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(middleware::MakeSpanWithRequestId)
                    .on_request(DefaultOnRequest::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            )
            // Generate X-Request-Id using UUID v7 (or use client-provided one)
            .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid))
    }
}

#[cfg(test)]
mod tests {
    use crate::shared::test_helpers::TestApp;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_health_is_public() {
        let app = TestApp::new();
        app.server.get("/health").await.assert_status_ok();
    }

    #[tokio::test]
    async fn test_responses_carry_request_id() {
        let app = TestApp::new();
        let response = app.server.get("/health").await;
        assert!(response.maybe_header("x-request-id").is_some());
    }

    #[tokio::test]
    async fn test_openapi_document_served() {
        let app = TestApp::new();
        let response = app.server.get("/api-docs/openapi.json").await;
        response.assert_status_ok();
        assert!(response.text().contains("/convert/{filename}"));
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let app = TestApp::new();
        app.server
            .get("/nope")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
