mod auth_service;
mod credential_store;
mod token_service;

pub use auth_service::AuthService;
pub use credential_store::CredentialStore;
pub use token_service::TokenService;
