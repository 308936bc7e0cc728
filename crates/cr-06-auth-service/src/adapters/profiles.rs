//! Profile service client over the queue.

use crate::ports::{ProfileDirectory, ProfileDirectoryError};
use async_trait::async_trait;
use cr_03_dispatcher::{ServiceCallError, ServiceClient};
use shared_types::{
    ById, CommandName, CreateProfileRequest, Deleted, Profile, ProfileFields, ProfileId, UserId,
};

/// `ProfileDirectory` that sends `create-profile` and `delete-profile`
/// commands through a [`ServiceClient`].
#[derive(Clone)]
pub struct QueueProfileDirectory {
    client: ServiceClient,
}

impl QueueProfileDirectory {
    pub fn new(client: ServiceClient) -> Self {
        Self { client }
    }
}

fn map_call_error(err: ServiceCallError) -> ProfileDirectoryError {
    match err {
        ServiceCallError::Rejected(inner) => ProfileDirectoryError::Rejected(inner),
        other => ProfileDirectoryError::Unavailable(other.to_string()),
    }
}

#[async_trait]
impl ProfileDirectory for QueueProfileDirectory {
    async fn create_profile(&self, owner: UserId, fields: ProfileFields) -> Result<Profile, ProfileDirectoryError> {
        let request = CreateProfileRequest {
            user_id: Some(owner),
            profile: fields,
        };
        self.client
            .request(CommandName::CreateProfile, &request)
            .await
            .map_err(map_call_error)
    }

    async fn delete_profile(&self, id: ProfileId) -> Result<(), ProfileDirectoryError> {
        let _: Deleted<ProfileId> = self
            .client
            .request(CommandName::DeleteProfile, &ById::new(id))
            .await
            .map_err(map_call_error)?;
        Ok(())
    }
}
