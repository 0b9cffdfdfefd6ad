pub mod dtos;
pub mod handlers;
pub mod model;
pub mod routes;
pub mod services;

pub use services::{AuthService, CredentialStore, TokenService};
