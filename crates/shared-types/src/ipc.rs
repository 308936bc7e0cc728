//! # Command Payloads
//!
//! Request and response payloads for every command on the surface.
//!
//! Commands with no input (`get-all-users`, `get-all-profiles`) take `()`,
//! which travels as JSON `null`.

use crate::entities::{ProfileId, UserId};
use serde::{Deserialize, Serialize};

// =============================================================================
// AUTH SERVICE
// =============================================================================

/// Payload of `login`. All three fields must belong to the same account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub login: String,
    pub email: String,
    pub password: String,
}

/// Payload of `registration`: credentials plus the fields of the profile
/// created alongside the account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub login: String,
    pub email: String,
    pub password: String,
    pub name: String,
    pub surname: String,
    pub phone_number: String,
    pub address: String,
}

impl RegistrationRequest {
    /// Profile half of the registration form.
    pub fn profile_fields(&self) -> ProfileFields {
        ProfileFields {
            name: self.name.clone(),
            surname: self.surname.clone(),
            phone_number: self.phone_number.clone(),
            address: self.address.clone(),
        }
    }
}

/// Reply to `login` and `registration`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Partial update of an account. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Payload of `edit-user`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditUserRequest {
    pub id: UserId,
    pub user: UserUpdate,
}

// =============================================================================
// PROFILE SERVICE
// =============================================================================

/// Fields of a new profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileFields {
    pub name: String,
    pub surname: String,
    pub phone_number: String,
    pub address: String,
}

/// Payload of `create-profile`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProfileRequest {
    /// Owning account, if known at creation time.
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub profile: ProfileFields,
}

/// Partial update of a profile. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub surname: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Payload of `edit-profile`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditProfileRequest {
    pub id: ProfileId,
    pub profile: ProfileUpdate,
}

// =============================================================================
// SHARED
// =============================================================================

/// Payload of the single-resource commands (`get-*`, `delete-*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ById<I> {
    pub id: I,
}

impl<I> ById<I> {
    pub fn new(id: I) -> Self {
        Self { id }
    }
}

/// Reply to `delete-user` and `delete-profile`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deleted<I> {
    pub id: I,
    pub deleted: bool,
}

impl<I> Deleted<I> {
    pub fn new(id: I) -> Self {
        Self { id, deleted: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_fields_are_optional() {
        let update: UserUpdate = serde_json::from_str(r#"{"email":"a@b.c"}"#).unwrap();
        assert_eq!(update.email.as_deref(), Some("a@b.c"));
        assert!(update.login.is_none());
        assert!(update.password.is_none());
    }

    #[test]
    fn test_create_profile_without_owner() {
        let req: CreateProfileRequest = serde_json::from_str(
            r#"{"profile":{"name":"A","surname":"B","phone_number":"+10000000000","address":"C"}}"#,
        )
        .unwrap();
        assert!(req.user_id.is_none());
    }

    #[test]
    fn test_unit_payload_is_null() {
        let json = serde_json::to_value(()).unwrap();
        assert!(json.is_null());
        let _: () = serde_json::from_value(serde_json::Value::Null).unwrap();
    }
}
