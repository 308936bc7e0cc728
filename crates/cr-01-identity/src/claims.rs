//! JWT claim set.

use crate::error::AuthError;
use serde::{Deserialize, Serialize};
use shared_types::{IdentityClaim, Role, UserId};

/// Claims as they appear inside the signed token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user id, decimal).
    pub sub: String,
    /// Issued at, seconds since the Unix epoch.
    pub iat: u64,
    /// Expiration, seconds since the Unix epoch.
    pub exp: u64,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl TokenClaims {
    /// Convert to the claim handed to the rest of the request.
    pub fn into_identity(self) -> Result<IdentityClaim, AuthError> {
        let subject = self
            .sub
            .parse::<u64>()
            .map_err(|_| AuthError::InvalidCredential)?;
        Ok(IdentityClaim {
            subject_id: UserId(subject),
            issued_at: self.iat,
            expires_at: self.exp,
            roles: self.roles,
        })
    }
}
