//! Request extractors.

use crate::error::ApiError;
use crate::state::AppState;
use axum::async_trait;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{FromRequestParts, Path};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::Json;
use courier_telemetry::{metric_inc, ACCESS_DENIED};
use shared_types::IdentityClaim;
use tracing::debug;

/// Verified caller. Rejects with 401 before any other extractor runs when
/// listed first in a handler's arguments.
#[derive(Debug, Clone)]
pub struct Authenticated(pub IdentityClaim);

#[async_trait]
impl FromRequestParts<AppState> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let credential = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        state.verifier().verify(credential).map(Authenticated).map_err(|e| {
            metric_inc!(ACCESS_DENIED, &["unauthorized"]);
            debug!(path = %parts.uri.path(), error = %e, "Request unauthorized");
            ApiError::from(e)
        })
    }
}

/// Unwrap a JSON body, turning axum's rejection into a JSON error.
pub fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// Unwrap a numeric path id.
pub fn path_id(path: Result<Path<u64>, PathRejection>) -> Result<u64, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}
