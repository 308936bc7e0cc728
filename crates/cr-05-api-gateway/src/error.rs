//! Gateway errors and their HTTP mapping.
//!
//! Every error response is JSON `{"error": <kind>, "message": <text>}`.

use crate::config::ConfigError;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use cr_01_identity::AuthError;
use cr_02_access_guard::AccessError;
use cr_03_dispatcher::DispatchError;
use serde_json::json;
use shared_types::{CommandError, ErrorKind};
use thiserror::Error;

/// Failure of one HTTP request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No usable credential. Decided here, never reaches a service.
    #[error(transparent)]
    Unauthorized(#[from] AuthError),

    /// Known caller, not entitled. Decided here, never reaches a service.
    #[error(transparent)]
    Forbidden(#[from] AccessError),

    /// Structured error returned by the service, passed through verbatim.
    #[error("{}", .0.message)]
    Rejected(CommandError),

    /// No reply from the service.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// The service replied with something the gateway could not read.
    #[error("unexpected reply from service: {0}")]
    UnexpectedReply(String),

    /// Request path or body could not be parsed.
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Rejected(e) => match e.kind {
                ErrorKind::MalformedPayload | ErrorKind::UnknownCommand | ErrorKind::ValidationFailed => {
                    StatusCode::BAD_REQUEST
                }
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::DomainConflict => StatusCode::CONFLICT,
                ErrorKind::InvalidCredentials => StatusCode::UNAUTHORIZED,
                ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Dispatch(DispatchError::UpstreamTimeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Dispatch(DispatchError::Encode(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Dispatch(_) | ApiError::UnexpectedReply(_) => StatusCode::BAD_GATEWAY,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Machine-readable kind for the response body.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(AuthError::MissingOrMalformedCredential) => "missing_or_malformed_credential",
            ApiError::Unauthorized(AuthError::InvalidCredential) => "invalid_credential",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::Rejected(e) => e.kind.as_str(),
            ApiError::Dispatch(DispatchError::UpstreamTimeout { .. }) => "upstream_timeout",
            ApiError::Dispatch(DispatchError::Encode(_)) => "internal",
            ApiError::Dispatch(_) => "upstream_unavailable",
            ApiError::UnexpectedReply(_) => "unexpected_reply",
            ApiError::BadRequest(_) => "malformed_payload",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": self.kind(),
            "message": self.to_string(),
        }));
        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}

/// Gateway lifecycle errors.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid gateway configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid identity configuration: {0}")]
    Identity(#[from] cr_01_identity::ConfigError),

    #[error("failed to bind HTTP listener: {0}")]
    Bind(std::io::Error),

    #[error("HTTP server failed: {0}")]
    Serve(std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use cr_02_access_guard::DecisionReason;
    use shared_types::{CommandName, ServiceName, UserId};
    use std::time::Duration;

    #[test]
    fn test_unauthorized_and_forbidden_are_distinct() {
        let unauthorized = ApiError::from(AuthError::InvalidCredential);
        let forbidden = ApiError::from(AccessError::Forbidden {
            subject: UserId(1),
            owner: Some(UserId(2)),
            reason: DecisionReason::NotOwner,
        });
        assert_eq!(unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);
        assert_ne!(unauthorized.kind(), forbidden.kind());
    }

    #[test]
    fn test_service_errors_map_by_kind() {
        let cases = [
            (CommandError::malformed("x"), StatusCode::BAD_REQUEST),
            (CommandError::unknown_command("x"), StatusCode::BAD_REQUEST),
            (CommandError::validation("x"), StatusCode::BAD_REQUEST),
            (CommandError::not_found("x"), StatusCode::NOT_FOUND),
            (CommandError::conflict("x"), StatusCode::CONFLICT),
            (CommandError::invalid_credentials(), StatusCode::UNAUTHORIZED),
            (CommandError::internal("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::Rejected(err).status(), status);
        }
    }

    #[test]
    fn test_timeout_is_gateway_timeout() {
        let err = ApiError::from(DispatchError::UpstreamTimeout {
            service: ServiceName::Auth,
            command: CommandName::GetUser,
            timeout: Duration::from_secs(1),
        });
        assert_eq!(err.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(err.kind(), "upstream_timeout");
    }

    #[test]
    fn test_conflict_message_passes_through() {
        let err = ApiError::Rejected(CommandError::conflict("user with this email already exists"));
        assert_eq!(err.to_string(), "user with this email already exists");
        assert_eq!(err.kind(), "domain_conflict");
    }
}
