//! Identity configuration.

use crate::error::ConfigError;
use std::fmt;
use std::time::Duration;

/// Minimum HS256 secret length in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Default secret. Long enough to pass `validate`, rejected by
/// `validate_for_production`.
pub const DEV_SECRET_PLACEHOLDER: &str = "courier-development-secret-change-me-0000";

/// Token lifetime when none is configured (24 hours).
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Signing and validation settings shared by issuer and verifier.
#[derive(Clone)]
pub struct IdentityConfig {
    /// HS256 signing secret.
    pub secret: String,
    /// Lifetime of issued tokens.
    pub token_ttl: Duration,
    /// Clock skew tolerated when checking expiry, in seconds.
    pub leeway_secs: u64,
}

impl IdentityConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Self::default()
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::SecretTooShort {
                min: MIN_SECRET_LEN,
                actual: self.secret.len(),
            });
        }
        if self.token_ttl.is_zero() {
            return Err(ConfigError::ZeroTtl);
        }
        Ok(())
    }

    /// Validate configuration for production use.
    ///
    /// Returns `Err` if:
    /// - the secret is the development placeholder
    /// - any check in [`validate`](Self::validate) fails
    pub fn validate_for_production(&self) -> Result<(), ConfigError> {
        if self.secret == DEV_SECRET_PLACEHOLDER {
            return Err(ConfigError::InsecureSecret);
        }
        self.validate()
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            secret: DEV_SECRET_PLACEHOLDER.to_string(),
            token_ttl: DEFAULT_TOKEN_TTL,
            leeway_secs: 0,
        }
    }
}

impl fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("leeway_secs", &self.leeway_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_passes_validate_but_not_production() {
        let config = IdentityConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.validate_for_production(), Err(ConfigError::InsecureSecret));
    }

    #[test]
    fn test_short_secret_rejected() {
        let config = IdentityConfig::new("short");
        assert_eq!(
            config.validate(),
            Err(ConfigError::SecretTooShort { min: 32, actual: 5 })
        );
        assert!(IdentityConfig::new("").validate().is_err());
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let mut config = IdentityConfig::new("k".repeat(40));
        config.token_ttl = Duration::ZERO;
        assert_eq!(config.validate(), Err(ConfigError::ZeroTtl));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = IdentityConfig::new("super-secret-value-that-is-long-enough");
        assert!(!format!("{config:?}").contains("super-secret"));
    }
}
