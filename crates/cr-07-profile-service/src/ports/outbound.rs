//! Outbound (Driven) ports for the profile service.

use async_trait::async_trait;
use shared_types::{CommandError, Profile, ProfileFields, ProfileId, UserId};
use thiserror::Error;

/// Storage failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("profile {0} not found")]
    NotFound(ProfileId),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl From<RepositoryError> for CommandError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(_) => CommandError::not_found(err.to_string()),
            RepositoryError::Unavailable(_) => CommandError::internal(err.to_string()),
        }
    }
}

/// Profile storage. Ids are assigned by the repository.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Store a new profile and return it with its id.
    async fn insert(&self, user_id: Option<UserId>, fields: ProfileFields) -> Result<Profile, RepositoryError>;

    async fn find(&self, id: ProfileId) -> Result<Option<Profile>, RepositoryError>;

    /// The profile owned by `user_id`, if any.
    async fn find_by_owner(&self, user_id: UserId) -> Result<Option<Profile>, RepositoryError>;

    /// All profiles ordered by id.
    async fn list(&self) -> Result<Vec<Profile>, RepositoryError>;

    /// Replace a stored profile. `NotFound` if it does not exist.
    async fn update(&self, profile: Profile) -> Result<Profile, RepositoryError>;

    /// Remove a profile. `NotFound` if it does not exist.
    async fn delete(&self, id: ProfileId) -> Result<(), RepositoryError>;
}
