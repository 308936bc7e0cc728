//! # Identity Claim
//!
//! Verified caller attributes, valid for the lifetime of one request.

use crate::entities::{Role, UserId};
use serde::{Deserialize, Serialize};

/// Produced by the identity verifier from a signed credential. Consumed by
/// the access guard and passed explicitly to whatever needs the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaim {
    /// Authenticated account.
    pub subject_id: UserId,
    /// Issue time, seconds since the Unix epoch.
    pub issued_at: u64,
    /// Expiry time, seconds since the Unix epoch.
    pub expires_at: u64,
    /// Granted roles. Empty for tokens issued without roles.
    #[serde(default)]
    pub roles: Vec<Role>,
}

impl IdentityClaim {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_roles_default_to_empty() {
        let claim: IdentityClaim =
            serde_json::from_str(r#"{"subject_id":3,"issued_at":1,"expires_at":2}"#).unwrap();
        assert!(claim.roles.is_empty());
        assert!(!claim.is_admin());
    }

    #[test]
    fn test_admin_role_detected() {
        let claim = IdentityClaim {
            subject_id: UserId(1),
            issued_at: 0,
            expires_at: 10,
            roles: vec![Role::User, Role::Admin],
        };
        assert!(claim.is_admin());
        assert!(claim.has_role(Role::User));
    }
}
