use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub swagger: SwaggerConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_request_body_size: usize,
}

/// Token signing and the seeded login credential
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub jwt_leeway: Duration,
    pub seed_username: String,
    pub seed_password: String,
}

// Keep secrets out of logs
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"***")
            .field("token_ttl", &self.token_ttl)
            .field("jwt_leeway", &self.jwt_leeway)
            .field("seed_username", &self.seed_username)
            .field("seed_password", &"***")
            .finish()
    }
}

/// Local directories for raw uploads and converted PDF output
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
    pub converted_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            auth: AuthConfig::from_env()?,
            storage: StorageConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
        })
    }
}

impl AppConfig {
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 25 * 1024 * 1024; // 25MB

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_request_body_size = env::var("MAX_REQUEST_BODY_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_REQUEST_BODY_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_REQUEST_BODY_SIZE must be a valid number".to_string())?;

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            max_request_body_size,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl AuthConfig {
    const DEFAULT_TOKEN_TTL_SECS: u64 = 2 * 60 * 60; // 2 hours
    const DEFAULT_JWT_LEEWAY_SECS: u64 = 0;

    pub fn from_env() -> Result<Self, String> {
        let jwt_secret = env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "JWT_SECRET environment variable is required".to_string())?;

        let token_ttl = Self::parse_token_ttl(
            &env::var("AUTH_TOKEN_TTL_SECS")
                .unwrap_or_else(|_| Self::DEFAULT_TOKEN_TTL_SECS.to_string()),
        )?;

        let jwt_leeway_secs = env::var("JWT_LEEWAY")
            .unwrap_or_else(|_| Self::DEFAULT_JWT_LEEWAY_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "JWT_LEEWAY must be a valid number".to_string())?;

        let seed_username = env::var("AUTH_SEED_USERNAME").unwrap_or_else(|_| "admin".to_string());
        let seed_password =
            env::var("AUTH_SEED_PASSWORD").unwrap_or_else(|_| "password".to_string());

        Ok(Self {
            jwt_secret,
            token_ttl,
            jwt_leeway: Duration::from_secs(jwt_leeway_secs),
            seed_username,
            seed_password,
        })
    }

    /// Token lifetime in seconds; must fit the signed `exp` claim
    fn parse_token_ttl(raw: &str) -> Result<Duration, String> {
        let secs = raw
            .trim()
            .parse::<u64>()
            .map_err(|_| "AUTH_TOKEN_TTL_SECS must be a valid number".to_string())?;

        i64::try_from(secs)
            .map_err(|_| format!("AUTH_TOKEN_TTL_SECS must not exceed {}", i64::MAX))?;
        Ok(Duration::from_secs(secs))
    }
}

impl StorageConfig {
    pub fn from_env() -> Result<Self, String> {
        let upload_dir = PathBuf::from(env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()));

        // Converted output lives inside the upload dir unless told otherwise
        let converted_dir = env::var("CONVERTED_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| upload_dir.join("converted"));

        if upload_dir.as_os_str().is_empty() {
            return Err("UPLOAD_DIR must not be empty".to_string());
        }

        Ok(Self {
            upload_dir,
            converted_dir,
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Filedesk API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "Upload, convert and parse files".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_token_ttl() {
        assert_eq!(
            AuthConfig::parse_token_ttl("7200"),
            Ok(Duration::from_secs(7200))
        );
        assert!(AuthConfig::parse_token_ttl("two hours").is_err());
        assert!(AuthConfig::parse_token_ttl("-1").is_err());
    }

    #[test]
    fn test_parse_token_ttl_rejects_values_past_i64() {
        assert!(AuthConfig::parse_token_ttl(&i64::MAX.to_string()).is_ok());
        assert!(AuthConfig::parse_token_ttl(&u64::MAX.to_string()).is_err());
        assert!(AuthConfig::parse_token_ttl(&(i64::MAX as u64 + 1).to_string()).is_err());
    }
}
