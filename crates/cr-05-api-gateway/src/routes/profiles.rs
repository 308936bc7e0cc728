//! Profile routes. The owner of an existing profile is looked up with
//! `get-profile` before the guard runs.

use crate::error::ApiError;
use crate::extract::{json_body, path_id, Authenticated};
use crate::state::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use cr_02_access_guard::AccessPolicy;
use serde_json::Value;
use shared_types::{
    ById, CommandName, CreateProfileRequest, EditProfileRequest, IdentityClaim, Profile, ProfileFields, ProfileId,
    ProfileUpdate,
};

/// Resolve the profile's owner and check the caller against it.
async fn admit_owner(state: &AppState, claim: &IdentityClaim, id: ProfileId) -> Result<(), ApiError> {
    let profile: Profile = state.call_as(CommandName::GetProfile, &ById::new(id)).await?;
    state.admit(AccessPolicy::OwnerOrAdmin, claim, profile.user_id)
}

pub async fn create(
    State(state): State<AppState>,
    Authenticated(claim): Authenticated,
    body: Result<Json<ProfileFields>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let request = CreateProfileRequest {
        user_id: Some(claim.subject_id),
        profile: json_body(body)?,
    };
    let reply = state.call(CommandName::CreateProfile, &request).await?;
    // 201 also when the caller's existing profile comes back
    Ok((StatusCode::CREATED, Json(reply)))
}

pub async fn list(State(state): State<AppState>, Authenticated(_): Authenticated) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.call(CommandName::GetAllProfiles, &()).await?))
}

pub async fn get_one(
    State(state): State<AppState>,
    Authenticated(_): Authenticated,
    path: Result<Path<u64>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let id = ProfileId(path_id(path)?);
    Ok(Json(state.call(CommandName::GetProfile, &ById::new(id)).await?))
}

pub async fn edit(
    State(state): State<AppState>,
    Authenticated(claim): Authenticated,
    path: Result<Path<u64>, PathRejection>,
    body: Result<Json<ProfileUpdate>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let id = ProfileId(path_id(path)?);
    let profile = json_body(body)?;
    admit_owner(&state, &claim, id).await?;
    Ok(Json(state.call(CommandName::EditProfile, &EditProfileRequest { id, profile }).await?))
}

pub async fn remove(
    State(state): State<AppState>,
    Authenticated(claim): Authenticated,
    path: Result<Path<u64>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let id = ProfileId(path_id(path)?);
    admit_owner(&state, &claim, id).await?;
    Ok(Json(state.call(CommandName::DeleteProfile, &ById::new(id)).await?))
}
