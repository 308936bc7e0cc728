//! Service-to-service calls.
//!
//! A backend service that needs another service uses the same request/reply
//! contract as the gateway, through its own dispatcher and reply queue. Each
//! nested call gets a fresh correlation id, distinct from the id of the
//! delivery being handled.

use crate::dispatcher::{DispatchError, Dispatcher};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_types::{CommandError, CommandName};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Failure of a typed service call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceCallError {
    /// No reply (timeout, transport failure).
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// The remote service answered with a structured error.
    #[error("rejected by remote service: {0}")]
    Rejected(CommandError),

    /// The reply did not have the expected shape.
    #[error("unexpected reply to '{command}': {reason}")]
    UnexpectedReply { command: CommandName, reason: String },
}

/// Typed client over a [`Dispatcher`].
#[derive(Clone)]
pub struct ServiceClient {
    dispatcher: Arc<Dispatcher>,
    timeout: Option<Duration>,
}

impl ServiceClient {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            dispatcher,
            timeout: None,
        }
    }

    /// Override the dispatcher's default timeout for calls made by this client.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Call `command` on the service that owns it and decode the success reply.
    pub async fn request<P, R>(&self, command: CommandName, payload: &P) -> Result<R, ServiceCallError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let reply = self
            .dispatcher
            .call(command.service(), command, payload, self.timeout)
            .await?;

        let value = reply.outcome.map_err(ServiceCallError::Rejected)?;
        serde_json::from_value(value).map_err(|e| ServiceCallError::UnexpectedReply {
            command,
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{spawn_responder, test_dispatcher};
    use serde_json::json;
    use shared_bus::InMemoryBroker;
    use shared_types::{ById, ErrorKind, Profile, ProfileId, UserId};

    #[tokio::test]
    async fn test_typed_reply_decoded() {
        let broker = Arc::new(InMemoryBroker::new());
        let dispatcher = test_dispatcher(&broker, "svc").await;
        spawn_responder(&broker, "profile_queue", |_, data| {
            Ok(json!({
                "id": data["id"],
                "name": "Ada",
                "surname": "Lovelace",
                "phone_number": "+4400000000",
                "address": "London",
                "user_id": 3
            }))
        })
        .await;

        let client = ServiceClient::new(dispatcher);
        let profile: Profile = client
            .request(CommandName::GetProfile, &ById::new(ProfileId(8)))
            .await
            .unwrap();

        assert_eq!(profile.id, ProfileId(8));
        assert_eq!(profile.user_id, Some(UserId(3)));
    }

    #[tokio::test]
    async fn test_remote_error_is_rejected() {
        let broker = Arc::new(InMemoryBroker::new());
        let dispatcher = test_dispatcher(&broker, "svc").await;
        spawn_responder(&broker, "profile_queue", |_, _| {
            Err(CommandError::not_found("profile 8 not found"))
        })
        .await;

        let err = ServiceClient::new(dispatcher)
            .request::<_, Profile>(CommandName::GetProfile, &ById::new(ProfileId(8)))
            .await
            .unwrap_err();

        match err {
            ServiceCallError::Rejected(e) => assert_eq!(e.kind, ErrorKind::NotFound),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_wrong_reply_shape() {
        let broker = Arc::new(InMemoryBroker::new());
        let dispatcher = test_dispatcher(&broker, "svc").await;
        spawn_responder(&broker, "profile_queue", |_, _| Ok(json!("surprise"))).await;

        let err = ServiceClient::new(dispatcher)
            .request::<_, Profile>(CommandName::GetProfile, &ById::new(ProfileId(1)))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceCallError::UnexpectedReply { .. }));
    }

    #[tokio::test]
    async fn test_client_timeout_override() {
        let broker = Arc::new(InMemoryBroker::new());
        let dispatcher = test_dispatcher(&broker, "svc").await;

        let err = ServiceClient::new(dispatcher)
            .with_timeout(Duration::from_millis(20))
            .request::<_, Profile>(CommandName::GetProfile, &ById::new(ProfileId(1)))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceCallError::Dispatch(DispatchError::UpstreamTimeout { .. })
        ));
    }
}
