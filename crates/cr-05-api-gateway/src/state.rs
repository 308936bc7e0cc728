//! Shared request state.

use crate::error::ApiError;
use courier_telemetry::{metric_inc, ACCESS_DENIED};
use cr_01_identity::IdentityVerifier;
use cr_02_access_guard::{AccessGuard, AccessPolicy};
use cr_03_dispatcher::Dispatcher;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use shared_types::{CommandName, IdentityClaim, UserId};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Collaborators every handler needs, assembled once at startup.
#[derive(Clone)]
pub struct AppState {
    dispatcher: Arc<Dispatcher>,
    verifier: Arc<IdentityVerifier>,
    guard: AccessGuard,
    call_timeout: Duration,
}

impl AppState {
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        verifier: Arc<IdentityVerifier>,
        guard: AccessGuard,
        call_timeout: Duration,
    ) -> Self {
        Self {
            dispatcher,
            verifier,
            guard,
            call_timeout,
        }
    }

    pub fn verifier(&self) -> &IdentityVerifier {
        &self.verifier
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Check `claim` against `policy` for a resource owned by `owner`.
    pub fn admit(&self, policy: AccessPolicy, claim: &IdentityClaim, owner: Option<UserId>) -> Result<(), ApiError> {
        match policy {
            AccessPolicy::Public | AccessPolicy::Authenticated => Ok(()),
            AccessPolicy::OwnerOrAdmin => self.guard.authorize(claim, owner).map_err(|e| {
                metric_inc!(ACCESS_DENIED, &["forbidden"]);
                warn!(subject = %claim.subject_id, owner = ?owner, error = %e, "Request forbidden");
                ApiError::from(e)
            }),
        }
    }

    /// Dispatch `command` and return the service's success payload verbatim.
    pub async fn call<P>(&self, command: CommandName, payload: &P) -> Result<Value, ApiError>
    where
        P: Serialize + ?Sized,
    {
        let reply = self
            .dispatcher
            .call(command.service(), command, payload, Some(self.call_timeout))
            .await?;
        debug!(
            correlation_id = %reply.correlation_id,
            command = %command,
            ok = reply.outcome.is_ok(),
            "Reply received"
        );
        reply.outcome.map_err(ApiError::Rejected)
    }

    /// Dispatch `command` and decode the reply for the gateway's own use.
    pub async fn call_as<P, R>(&self, command: CommandName, payload: &P) -> Result<R, ApiError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let value = self.call(command, payload).await?;
        serde_json::from_value(value).map_err(|e| ApiError::UnexpectedReply(format!("{command}: {e}")))
    }
}
