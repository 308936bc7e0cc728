//! # Inbound Port - ProfileApi
//!
//! One method per profile command. Errors are the structured replies the
//! router publishes back to the caller.

use async_trait::async_trait;
use shared_types::{CommandError, CreateProfileRequest, Deleted, EditProfileRequest, Profile, ProfileId};

#[async_trait]
pub trait ProfileApi: Send + Sync {
    /// `create-profile`.
    ///
    /// # Errors
    /// - `ValidationFailed`: empty field or bad phone number
    async fn create_profile(&self, request: CreateProfileRequest) -> Result<Profile, CommandError>;

    /// `get-all-profiles`.
    async fn get_all_profiles(&self) -> Result<Vec<Profile>, CommandError>;

    /// `get-profile`.
    ///
    /// # Errors
    /// - `NotFound`: no profile with this id
    async fn get_profile(&self, id: ProfileId) -> Result<Profile, CommandError>;

    /// `edit-profile`. Only the fields present in the update change.
    ///
    /// # Errors
    /// - `NotFound`: no profile with this id
    /// - `ValidationFailed`: a present field is invalid
    async fn edit_profile(&self, request: EditProfileRequest) -> Result<Profile, CommandError>;

    /// `delete-profile`.
    ///
    /// # Errors
    /// - `NotFound`: no profile with this id
    async fn delete_profile(&self, id: ProfileId) -> Result<Deleted<ProfileId>, CommandError>;
}
