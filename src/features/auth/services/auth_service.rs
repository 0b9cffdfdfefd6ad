use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::{LoginRequestDto, LoginResponseDto};
use crate::features::auth::services::credential_store::CredentialStore;
use crate::features::auth::services::token_service::TokenService;
use std::sync::Arc;
use tracing::info;

/// Service for authentication operations (login)
pub struct AuthService {
    credentials: Arc<CredentialStore>,
    token_service: Arc<TokenService>,
}

impl AuthService {
    pub fn new(credentials: Arc<CredentialStore>, token_service: Arc<TokenService>) -> Self {
        Self {
            credentials,
            token_service,
        }
    }

    /// Exchange a username and password for a session token
    pub async fn login(&self, dto: LoginRequestDto) -> Result<LoginResponseDto> {
        let credentials = Arc::clone(&self.credentials);
        let (username, password) = (dto.username, dto.password);

        // Argon2 is deliberately slow, keep it off the async workers
        let (username, valid) = tokio::task::spawn_blocking(move || {
            let valid = credentials.verify(&username, &password);
            (username, valid)
        })
        .await
        .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))?;

        if !valid {
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        }

        let issued = self.token_service.issue(&username)?;
        info!("User '{}' logged in", username);

        Ok(LoginResponseDto {
            token: issued.token,
            token_type: "Bearer".to_string(),
            expires_in: issued.expires_in,
        })
    }
}
