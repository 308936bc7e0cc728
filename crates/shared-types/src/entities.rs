//! # Core Domain Entities
//!
//! Only what the dispatch core needs to know: identifiers, ownership links
//! and the public shape of users and profiles.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a user account, assigned by the auth service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

/// Identifier of a profile, assigned by the profile service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role carried in an identity claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Every registered account.
    User,
    /// Administrative override for ownership checks.
    Admin,
}

/// Public view of a user account. The password hash never leaves the auth
/// service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Account id.
    pub id: UserId,
    /// Unique login name.
    pub login: String,
    /// Unique email address.
    pub email: String,
    /// Linked profile, set once registration completes.
    pub profile_id: Option<ProfileId>,
    /// Roles granted to the account.
    pub roles: Vec<Role>,
}

/// A user's personal profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Profile id.
    pub id: ProfileId,
    /// First name.
    pub name: String,
    /// Family name.
    pub surname: String,
    /// Contact phone number.
    pub phone_number: String,
    /// Postal address.
    pub address: String,
    /// Owning account. `None` only for profiles created without an owner.
    pub user_id: Option<UserId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_as_plain_numbers() {
        let json = serde_json::to_string(&UserId(7)).unwrap();
        assert_eq!(json, "7");
        let id: ProfileId = serde_json::from_str("12").unwrap();
        assert_eq!(id, ProfileId(12));
    }

    #[test]
    fn test_role_wire_names() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        let role: Role = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(role, Role::User);
    }
}
