//! # Identity Verifier
//!
//! Turns an `Authorization` header value into an [`IdentityClaim`], or
//! refuses. Also issues the signed tokens the auth service hands out on
//! login and registration.
//!
//! ## Outcomes
//!
//! | Input | Result |
//! |-------|--------|
//! | absent, empty, or not `Bearer <token>` | `MissingOrMalformedCredential` |
//! | bad signature, expired, or garbled claims | `InvalidCredential` |
//! | valid token | the embedded claim, verbatim |
//!
//! Both failures mean "unauthorized" to the caller. The verifier never
//! consults storage: a claim is trusted for one request only.
//!
//! [`IdentityClaim`]: shared_types::IdentityClaim

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod claims;
pub mod config;
pub mod error;
pub mod issuer;
pub mod verifier;

pub use claims::TokenClaims;
pub use config::{IdentityConfig, DEV_SECRET_PLACEHOLDER, MIN_SECRET_LEN};
pub use error::{AuthError, ConfigError, TokenError};
pub use issuer::TokenIssuer;
pub use verifier::{parse_bearer, IdentityVerifier};

use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the Unix epoch.
pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
