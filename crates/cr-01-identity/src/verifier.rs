//! Bearer credential verification.

use crate::claims::TokenClaims;
use crate::config::IdentityConfig;
use crate::error::{AuthError, ConfigError};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use shared_types::IdentityClaim;
use tracing::debug;

/// Extract the token from a `Bearer <token>` credential.
pub fn parse_bearer(credential: &str) -> Result<&str, AuthError> {
    let (scheme, token) = credential
        .split_once(' ')
        .ok_or(AuthError::MissingOrMalformedCredential)?;
    if scheme != "Bearer" || token.is_empty() || token.contains(char::is_whitespace) {
        return Err(AuthError::MissingOrMalformedCredential);
    }
    Ok(token)
}

/// Validates signed bearer credentials.
pub struct IdentityVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl IdentityVerifier {
    pub fn new(config: &IdentityConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.leeway_secs;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
        })
    }

    /// Verify a full `Authorization` header value.
    pub fn verify(&self, credential: &str) -> Result<IdentityClaim, AuthError> {
        let token = parse_bearer(credential)?;

        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            debug!(error = %e, "Bearer token rejected");
            AuthError::InvalidCredential
        })?;

        data.claims.into_identity()
    }
}
