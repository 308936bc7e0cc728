//! Token issuing for login and registration.

use crate::claims::TokenClaims;
use crate::config::IdentityConfig;
use crate::error::{ConfigError, TokenError};
use crate::unix_now;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use shared_types::User;
use std::time::Duration;

/// Signs HS256 tokens for authenticated users.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(config: &IdentityConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            ttl: config.token_ttl,
        })
    }

    /// Issue a token for `user`, valid from now for the configured TTL.
    pub fn issue(&self, user: &User) -> Result<String, TokenError> {
        self.issue_at(user, unix_now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(&self, user: &User, now: u64) -> Result<String, TokenError> {
        let claims = TokenClaims {
            sub: user.id.to_string(),
            iat: now,
            exp: now.saturating_add(self.ttl.as_secs()),
            roles: user.roles.clone(),
            login: Some(user.login.clone()),
            email: Some(user.email.clone()),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
