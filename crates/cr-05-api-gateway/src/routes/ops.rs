use crate::error::ApiError;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use courier_telemetry::encode_metrics;
use tracing::error;

pub async fn health() -> &'static str {
    "OK"
}

pub async fn metrics() -> Result<impl IntoResponse, ApiError> {
    match encode_metrics() {
        Ok(text) => Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )),
        Err(e) => {
            error!(error = %e, "Metrics encoding failed");
            Err(ApiError::Rejected(shared_types::CommandError::internal("metrics unavailable")))
        }
    }
}
