//! Account domain: credential rules and the service implementing `AuthApi`.

pub mod credentials;
pub mod service;

pub use credentials::{credential_matches, validate_email, validate_login, validate_password};
pub use service::AuthService;
