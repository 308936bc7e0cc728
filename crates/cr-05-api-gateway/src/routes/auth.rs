//! Public account routes.

use crate::error::ApiError;
use crate::extract::json_body;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;
use shared_types::{CommandName, LoginRequest, RegistrationRequest};

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let request = json_body(body)?;
    Ok(Json(state.call(CommandName::Login, &request).await?))
}

pub async fn registration(
    State(state): State<AppState>,
    body: Result<Json<RegistrationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let request = json_body(body)?;
    let reply = state.call(CommandName::Registration, &request).await?;
    Ok((StatusCode::CREATED, Json(reply)))
}
