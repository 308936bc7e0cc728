//! Static command-name to handler mapping.
//!
//! Each handler is a typed async function of the service state and the
//! command's payload type. The registry erases the types so the router can
//! hold one table, and checks at startup that the table covers exactly the
//! service's declared command surface.

use crate::error::RouterError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use shared_bus::decode_payload;
use shared_types::{CommandError, CommandName, ServiceName};
use std::collections::HashMap;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed handler future.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Value, CommandError>> + Send + 'static>>;

/// A handler with its payload and output types erased.
pub trait DynHandler: Send + Sync {
    /// Decode `data` and run the handler. Decode failures are
    /// `MalformedPayload` replies.
    fn call(&self, command: CommandName, data: Value) -> HandlerFuture;
}

struct FnHandler<S, F, P> {
    state: Arc<S>,
    f: F,
    _payload: PhantomData<fn() -> P>,
}

impl<S, F, P, R, Fut> DynHandler for FnHandler<S, F, P>
where
    S: Send + Sync + 'static,
    F: Fn(Arc<S>, P) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, CommandError>> + Send + 'static,
    P: DeserializeOwned + 'static,
    R: Serialize + 'static,
{
    fn call(&self, command: CommandName, data: Value) -> HandlerFuture {
        let payload = match decode_payload::<P>(command, data) {
            Ok(payload) => payload,
            Err(e) => return Box::pin(async move { Err(e) }),
        };
        let fut = (self.f)(self.state.clone(), payload);
        Box::pin(async move {
            let output = fut.await?;
            serde_json::to_value(output)
                .map_err(|e| CommandError::internal(format!("reply for '{command}' not serializable: {e}")))
        })
    }
}

/// Handlers for one service, keyed by command.
pub struct HandlerRegistry {
    service: ServiceName,
    handlers: HashMap<CommandName, Arc<dyn DynHandler>>,
    problems: Vec<RouterError>,
}

impl HandlerRegistry {
    pub fn new(service: ServiceName) -> Self {
        Self {
            service,
            handlers: HashMap::new(),
            problems: Vec::new(),
        }
    }

    /// Register `f` as the handler for `command`.
    ///
    /// ```rust,ignore
    /// registry.route(CommandName::GetUser, service.clone(), |s, req: ById<UserId>| async move {
    ///     s.get_user(req.id).await
    /// });
    /// ```
    pub fn route<S, F, P, R, Fut>(&mut self, command: CommandName, state: Arc<S>, f: F) -> &mut Self
    where
        S: Send + Sync + 'static,
        F: Fn(Arc<S>, P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, CommandError>> + Send + 'static,
        P: DeserializeOwned + 'static,
        R: Serialize + 'static,
    {
        if command.service() != self.service {
            self.problems.push(RouterError::ForeignCommand {
                service: self.service,
                command,
            });
            return self;
        }
        let handler = FnHandler {
            state,
            f,
            _payload: PhantomData,
        };
        if self.handlers.insert(command, Arc::new(handler)).is_some() {
            self.problems.push(RouterError::DuplicateHandler(command));
        }
        self
    }

    /// Check the table against the service's command surface.
    pub fn verify(&self) -> Result<(), RouterError> {
        if let Some(problem) = self.problems.first() {
            return Err(problem.clone());
        }
        let missing: Vec<CommandName> = self
            .service
            .commands()
            .into_iter()
            .filter(|c| !self.handlers.contains_key(c))
            .collect();
        if !missing.is_empty() {
            return Err(RouterError::MissingHandlers {
                service: self.service,
                missing,
            });
        }
        Ok(())
    }

    pub fn service(&self) -> ServiceName {
        self.service
    }

    pub fn get(&self, command: CommandName) -> Option<Arc<dyn DynHandler>> {
        self.handlers.get(&command).cloned()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared_types::{ById, ErrorKind, ProfileId};

    struct Profiles;

    impl Profiles {
        async fn get(&self, id: ProfileId) -> Result<Value, CommandError> {
            Ok(json!({"id": id}))
        }
    }

    fn full_profile_registry() -> HandlerRegistry {
        let state = Arc::new(Profiles);
        let mut registry = HandlerRegistry::new(ServiceName::Profile);
        for command in ServiceName::Profile.commands() {
            registry.route(command, state.clone(), |s, req: ById<ProfileId>| async move {
                s.get(req.id).await
            });
        }
        registry
    }

    #[test]
    fn test_complete_registry_verifies() {
        let registry = full_profile_registry();
        assert!(registry.verify().is_ok());
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn test_missing_handlers_reported() {
        let mut registry = HandlerRegistry::new(ServiceName::Profile);
        registry.route(CommandName::GetProfile, Arc::new(Profiles), |s, req: ById<ProfileId>| async move {
            s.get(req.id).await
        });

        match registry.verify() {
            Err(RouterError::MissingHandlers { service, missing }) => {
                assert_eq!(service, ServiceName::Profile);
                assert_eq!(missing.len(), 4);
                assert!(!missing.contains(&CommandName::GetProfile));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_foreign_and_duplicate_rejected() {
        let mut registry = full_profile_registry();
        registry.route(CommandName::Login, Arc::new(Profiles), |_, _: Value| async move {
            Ok::<_, CommandError>(Value::Null)
        });
        assert_eq!(
            registry.verify(),
            Err(RouterError::ForeignCommand {
                service: ServiceName::Profile,
                command: CommandName::Login,
            })
        );

        let mut registry = full_profile_registry();
        registry.route(CommandName::GetProfile, Arc::new(Profiles), |_, _: Value| async move {
            Ok::<_, CommandError>(Value::Null)
        });
        assert_eq!(
            registry.verify(),
            Err(RouterError::DuplicateHandler(CommandName::GetProfile))
        );
    }

    #[tokio::test]
    async fn test_handler_decodes_payload() {
        let registry = full_profile_registry();
        let handler = registry.get(CommandName::GetProfile).unwrap();

        let ok = handler.call(CommandName::GetProfile, json!({"id": 3})).await;
        assert_eq!(ok.unwrap(), json!({"id": 3}));

        let err = handler
            .call(CommandName::GetProfile, json!({"identifier": 3}))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedPayload);
    }
}
