//! Gateway-side dispatcher: publish a command, await its correlated reply.

use crate::config::{ConfigError, DispatcherConfig};
use crate::listener::ReplyListener;
use crate::pending::{cleanup_task, PendingReplyStore, Reply};
use courier_telemetry::{metric_inc, metric_observe, DISPATCH_CALLS, DISPATCH_DURATION};
use serde::Serialize;
use shared_bus::{encode_request, CodecError, QueueTransport, TransportError};
use shared_types::{CommandName, ServiceName};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

/// Why a call produced no reply.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// No reply within the deadline. The command may still have run.
    #[error("no reply from {service} for '{command}' within {timeout:?}")]
    UpstreamTimeout {
        service: ServiceName,
        command: CommandName,
        timeout: Duration,
    },

    /// The command could not be published.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The payload could not be encoded.
    #[error("encode error: {0}")]
    Encode(#[from] CodecError),

    /// No queue configured for the target service.
    #[error("no route to service '{0}'")]
    NoRoute(ServiceName),

    /// The correlation entry vanished without a reply.
    #[error("reply channel closed")]
    ReplyChannelClosed,
}

/// Publishes commands on service queues and matches replies to callers.
///
/// Each call is independent: one call's timeout or failure never touches
/// another call's correlation entry.
pub struct Dispatcher {
    transport: Arc<dyn QueueTransport>,
    pending: Arc<PendingReplyStore>,
    routes: HashMap<ServiceName, String>,
    reply_queue: String,
    default_timeout: Duration,
    cleanup_interval: Duration,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn QueueTransport>, config: &DispatcherConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            transport,
            pending: Arc::new(PendingReplyStore::new(config.sweep_grace)),
            routes: config.routes.clone(),
            reply_queue: format!("{}.reply.{}", config.instance_name, Uuid::new_v4()),
            default_timeout: config.default_timeout,
            cleanup_interval: config.cleanup_interval,
        })
    }

    /// Reply queue unique to this instance.
    pub fn reply_queue(&self) -> &str {
        &self.reply_queue
    }

    /// The correlation table.
    pub fn pending(&self) -> &Arc<PendingReplyStore> {
        &self.pending
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Declare the reply queue and attach a listener to it.
    ///
    /// The listener must be running before calls can complete.
    pub async fn reply_listener(&self) -> Result<ReplyListener, DispatchError> {
        self.transport.declare(&self.reply_queue).await?;
        let consumer = self.transport.consume(&self.reply_queue).await?;
        Ok(ReplyListener::new(self.pending.clone(), consumer))
    }

    /// Start the reply listener and the correlation sweep as background tasks.
    pub async fn start(&self) -> Result<Vec<JoinHandle<()>>, DispatchError> {
        let listener = self.reply_listener().await?;
        Ok(vec![
            tokio::spawn(listener.run()),
            tokio::spawn(cleanup_task(self.pending.clone(), self.cleanup_interval)),
        ])
    }

    /// Publish `command` to `service` and wait for the correlated reply.
    ///
    /// A business error from the service is a successful call: it comes back
    /// inside [`Reply::outcome`]. The command is never retried here.
    pub async fn call<P>(
        &self,
        service: ServiceName,
        command: CommandName,
        payload: &P,
        timeout: Option<Duration>,
    ) -> Result<Reply, DispatchError>
    where
        P: Serialize + ?Sized,
    {
        let timeout = timeout.unwrap_or(self.default_timeout);
        let queue = self
            .routes
            .get(&service)
            .ok_or(DispatchError::NoRoute(service))?;

        // Register before publishing so a fast reply always finds its entry
        let (correlation_id, rx) = self.pending.register(command, timeout);

        let body = match encode_request(command, correlation_id, &self.reply_queue, payload) {
            Ok(body) => body,
            Err(e) => {
                self.pending.cancel(&correlation_id);
                return Err(e.into());
            }
        };

        if let Err(e) = self.transport.publish(queue, body).await {
            self.pending.cancel(&correlation_id);
            metric_inc!(DISPATCH_CALLS, &[service.as_str(), "transport_error"]);
            warn!(
                correlation_id = %correlation_id,
                service = %service,
                command = %command,
                error = %e,
                "Publish failed"
            );
            return Err(e.into());
        }

        debug!(
            correlation_id = %correlation_id,
            service = %service,
            queue = %queue,
            command = %command,
            "Command published"
        );

        let started = Instant::now();
        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(reply)) => {
                metric_inc!(DISPATCH_CALLS, &[service.as_str(), "reply"]);
                metric_observe!(DISPATCH_DURATION, &[service.as_str()], reply.response_time.as_secs_f64());
                Ok(reply)
            }
            Ok(Err(_)) => {
                let err = closed_without_reply(started.elapsed(), service, command, timeout);
                if matches!(err, DispatchError::UpstreamTimeout { .. }) {
                    metric_inc!(DISPATCH_CALLS, &[service.as_str(), "timeout"]);
                }
                Err(err)
            }
            Err(_) => {
                self.pending.expire(&correlation_id);
                metric_inc!(DISPATCH_CALLS, &[service.as_str(), "timeout"]);
                warn!(
                    correlation_id = %correlation_id,
                    service = %service,
                    command = %command,
                    timeout_ms = timeout.as_millis(),
                    "Call timed out; outcome of the command is unknown"
                );
                Err(DispatchError::UpstreamTimeout {
                    service,
                    command,
                    timeout,
                })
            }
        }
    }

    /// Dispatch to the service that owns `command`.
    pub async fn send<P>(&self, command: CommandName, payload: &P) -> Result<Reply, DispatchError>
    where
        P: Serialize + ?Sized,
    {
        self.call(command.service(), command, payload, None).await
    }

    /// Get number of calls awaiting a reply
    pub fn pending_count(&self) -> usize {
        self.pending.pending_count()
    }
}

/// Error for a correlation entry dropped before its reply arrived. Past the
/// deadline the sweep got there first, which is still a timeout.
fn closed_without_reply(
    waited: Duration,
    service: ServiceName,
    command: CommandName,
    timeout: Duration,
) -> DispatchError {
    if waited >= timeout {
        DispatchError::UpstreamTimeout {
            service,
            command,
            timeout,
        }
    } else {
        DispatchError::ReplyChannelClosed
    }
}
