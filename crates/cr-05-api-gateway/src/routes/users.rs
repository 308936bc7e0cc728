//! Account routes. Edit and delete are limited to the account owner or an
//! admin; the check runs before anything is published.

use crate::error::ApiError;
use crate::extract::{json_body, path_id, Authenticated};
use crate::state::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::Json;
use cr_02_access_guard::AccessPolicy;
use serde_json::Value;
use shared_types::{ById, CommandName, EditUserRequest, UserId, UserUpdate};

pub async fn list(State(state): State<AppState>, Authenticated(_): Authenticated) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.call(CommandName::GetAllUsers, &()).await?))
}

pub async fn get_one(
    State(state): State<AppState>,
    Authenticated(_): Authenticated,
    path: Result<Path<u64>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let id = UserId(path_id(path)?);
    Ok(Json(state.call(CommandName::GetUser, &ById::new(id)).await?))
}

pub async fn edit(
    State(state): State<AppState>,
    Authenticated(claim): Authenticated,
    path: Result<Path<u64>, PathRejection>,
    body: Result<Json<UserUpdate>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let id = UserId(path_id(path)?);
    state.admit(AccessPolicy::OwnerOrAdmin, &claim, Some(id))?;
    let user = json_body(body)?;
    Ok(Json(state.call(CommandName::EditUser, &EditUserRequest { id, user }).await?))
}

pub async fn remove(
    State(state): State<AppState>,
    Authenticated(claim): Authenticated,
    path: Result<Path<u64>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let id = UserId(path_id(path)?);
    state.admit(AccessPolicy::OwnerOrAdmin, &claim, Some(id))?;
    Ok(Json(state.call(CommandName::DeleteUser, &ById::new(id)).await?))
}
