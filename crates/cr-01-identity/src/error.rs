//! Identity error types.

use thiserror::Error;

/// Why a credential was refused. Both variants are "unauthorized".
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// No credential, or not of the form `Bearer <token>`.
    #[error("missing or malformed credential")]
    MissingOrMalformedCredential,

    /// Token has a bad signature, is expired, or carries unreadable claims.
    #[error("invalid credential")]
    InvalidCredential,
}

/// Token could not be produced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token signing failed: {0}")]
    Signing(String),
}

/// Identity configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Signing secret shorter than the minimum.
    #[error("JWT secret must be at least {min} bytes, got {actual}")]
    SecretTooShort { min: usize, actual: usize },

    /// Signing secret is the shipped placeholder.
    #[error(
        "SECURITY VIOLATION: JWT secret is the development placeholder. \
         Set COURIER_JWT_SECRET."
    )]
    InsecureSecret,

    /// Token lifetime of zero.
    #[error("token TTL must be greater than zero")]
    ZeroTtl,
}
