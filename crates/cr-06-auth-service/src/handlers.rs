//! Command table for the auth queue.

use crate::ports::AuthApi;
use cr_04_command_router::HandlerRegistry;
use shared_types::{ById, CommandName, EditUserRequest, LoginRequest, RegistrationRequest, ServiceName, UserId};
use std::sync::Arc;

/// Handlers for every auth command, backed by `api`.
pub fn register_handlers<A: AuthApi + 'static>(api: Arc<A>) -> HandlerRegistry {
    let mut registry = HandlerRegistry::new(ServiceName::Auth);
    registry
        .route(CommandName::Login, api.clone(), |api, req: LoginRequest| async move {
            api.login(req).await
        })
        .route(CommandName::Registration, api.clone(), |api, req: RegistrationRequest| async move {
            api.registration(req).await
        })
        .route(CommandName::GetAllUsers, api.clone(), |api, _: ()| async move {
            api.get_all_users().await
        })
        .route(CommandName::GetUser, api.clone(), |api, req: ById<UserId>| async move {
            api.get_user(req.id).await
        })
        .route(CommandName::EditUser, api.clone(), |api, req: EditUserRequest| async move {
            api.edit_user(req).await
        })
        .route(CommandName::DeleteUser, api, |api, req: ById<UserId>| async move {
            api.delete_user(req.id).await
        });
    registry
}
