use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use std::sync::Arc;
use std::time::Duration;

use crate::core::config::AuthConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::{AuthenticatedUser, SessionClaims};
use crate::features::auth::services::credential_store::CredentialStore;

/// A freshly signed session token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    /// Seconds until the token expires
    pub expires_in: i64,
}

/// Issues and validates HS256 session tokens
///
/// Holds no per-session state: a token is valid while its signature and
/// expiry check out and its user is still known.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
    credentials: Arc<CredentialStore>,
}

impl TokenService {
    pub fn new(config: &AuthConfig, credentials: Arc<CredentialStore>) -> Self {
        let secret = config.jwt_secret.as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.jwt_leeway.as_secs();
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl: config.token_ttl,
            credentials,
        }
    }

    /// Sign a token for `username` expiring `ttl` from now
    pub fn issue(&self, username: &str) -> Result<IssuedToken> {
        let now = Utc::now().timestamp();
        let expires_in = i64::try_from(self.ttl.as_secs())
            .map_err(|_| AppError::Internal("Token lifetime out of range".to_string()))?;
        let exp = now
            .checked_add(expires_in)
            .ok_or_else(|| AppError::Internal("Token expiry out of range".to_string()))?;

        let claims = SessionClaims {
            username: username.to_string(),
            iat: now,
            exp,
        };

        Ok(IssuedToken {
            token: self.sign(&claims)?,
            expires_in,
        })
    }

    /// Check signature and expiry, then make sure the user still exists
    pub fn validate(&self, token: &str) -> Result<AuthenticatedUser> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => {
                    AppError::InvalidToken("Signature has expired".to_string())
                }
                _ => AppError::InvalidToken(e.to_string()),
            },
        )?;

        let username = data.claims.username;
        if !self.credentials.contains(&username) {
            tracing::debug!("Token names unknown user '{}'", username);
            return Err(AppError::InvalidToken("user not found".to_string()));
        }

        Ok(AuthenticatedUser::new(username))
    }

    fn sign(&self, claims: &SessionClaims) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }
}
