//! Command table for the profile queue.

use crate::ports::ProfileApi;
use cr_04_command_router::HandlerRegistry;
use shared_types::{ById, CommandName, CreateProfileRequest, EditProfileRequest, ProfileId, ServiceName};
use std::sync::Arc;

/// Handlers for every profile command, backed by `api`.
pub fn register_handlers<A: ProfileApi + 'static>(api: Arc<A>) -> HandlerRegistry {
    let mut registry = HandlerRegistry::new(ServiceName::Profile);
    registry
        .route(CommandName::CreateProfile, api.clone(), |api, req: CreateProfileRequest| async move {
            api.create_profile(req).await
        })
        .route(CommandName::GetAllProfiles, api.clone(), |api, _: ()| async move {
            api.get_all_profiles().await
        })
        .route(CommandName::GetProfile, api.clone(), |api, req: ById<ProfileId>| async move {
            api.get_profile(req.id).await
        })
        .route(CommandName::EditProfile, api.clone(), |api, req: EditProfileRequest| async move {
            api.edit_profile(req).await
        })
        .route(CommandName::DeleteProfile, api, |api, req: ById<ProfileId>| async move {
            api.delete_profile(req.id).await
        });
    registry
}
