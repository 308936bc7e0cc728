//! `ProfileApi` over a `ProfileRepository`.

use crate::domain::validation::{validate_fields, validate_update};
use crate::ports::{ProfileApi, ProfileRepository, RepositoryError};
use async_trait::async_trait;
use shared_types::{CommandError, CreateProfileRequest, Deleted, EditProfileRequest, Profile, ProfileId};
use std::sync::Arc;
use tracing::{debug, info};

pub struct ProfileService {
    repository: Arc<dyn ProfileRepository>,
}

impl ProfileService {
    pub fn new(repository: Arc<dyn ProfileRepository>) -> Self {
        Self { repository }
    }

    async fn load(&self, id: ProfileId) -> Result<Profile, CommandError> {
        self.repository
            .find(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(id).into())
    }
}

#[async_trait]
impl ProfileApi for ProfileService {
    async fn create_profile(&self, request: CreateProfileRequest) -> Result<Profile, CommandError> {
        validate_fields(&request.profile)?;

        if let Some(owner) = request.user_id {
            // Redelivery of a create that already landed
            if let Some(existing) = self.repository.find_by_owner(owner).await? {
                debug!(profile_id = %existing.id, user_id = %owner, "Profile already exists for owner");
                return Ok(existing);
            }
        }

        let profile = self.repository.insert(request.user_id, request.profile).await?;
        info!(profile_id = %profile.id, user_id = ?profile.user_id, "Profile created");
        Ok(profile)
    }

    async fn get_all_profiles(&self) -> Result<Vec<Profile>, CommandError> {
        Ok(self.repository.list().await?)
    }

    async fn get_profile(&self, id: ProfileId) -> Result<Profile, CommandError> {
        self.load(id).await
    }

    async fn edit_profile(&self, request: EditProfileRequest) -> Result<Profile, CommandError> {
        validate_update(&request.profile)?;
        let mut profile = self.load(request.id).await?;

        let update = request.profile;
        if let Some(name) = update.name {
            profile.name = name;
        }
        if let Some(surname) = update.surname {
            profile.surname = surname;
        }
        if let Some(phone_number) = update.phone_number {
            profile.phone_number = phone_number;
        }
        if let Some(address) = update.address {
            profile.address = address;
        }

        let profile = self.repository.update(profile).await?;
        debug!(profile_id = %profile.id, "Profile updated");
        Ok(profile)
    }

    async fn delete_profile(&self, id: ProfileId) -> Result<Deleted<ProfileId>, CommandError> {
        self.repository.delete(id).await?;
        info!(profile_id = %id, "Profile deleted");
        Ok(Deleted::new(id))
    }
}
