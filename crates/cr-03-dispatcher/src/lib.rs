//! # Dispatcher
//!
//! Turns a call into a queued command and suspends the caller until the
//! correlated reply arrives or the deadline passes.
//!
//! ## Call Flow
//!
//! ```text
//! caller ──call()──► register(id) ──► publish(service_queue, {cmd, id, reply_to})
//!    ▲                                              │
//!    │                                              ▼
//!    └──── oneshot ◄── complete(id) ◄── ReplyListener ◄── reply_to queue
//! ```
//!
//! ## Guarantees
//!
//! - Every call gets a fresh correlation id; concurrent calls never share an
//!   entry, and replies arriving in any order reach their own caller.
//! - On timeout the entry is removed and `UpstreamTimeout` returned. The
//!   command is not retried; the service may still complete it
//!   (at-least-once, reply-may-be-lost).
//! - A late reply finds no entry and is acknowledged and dropped.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod client;
pub mod config;
pub mod dispatcher;
pub mod listener;
pub mod pending;

pub use client::{ServiceCallError, ServiceClient};
pub use config::{ConfigError, DispatcherConfig};
pub use dispatcher::{DispatchError, Dispatcher};
pub use listener::ReplyListener;
pub use pending::{cleanup_task, PendingReplyStore, PendingStats, Reply};

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use serde_json::Value;
    use shared_bus::{decode_request, encode_reply, InMemoryBroker, QueueTransport};
    use shared_types::{CommandError, CommandName};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::task::JoinHandle;

    /// Dispatcher on `broker` with its listener running.
    pub async fn test_dispatcher(broker: &Arc<InMemoryBroker>, name: &str) -> Arc<Dispatcher> {
        let config = DispatcherConfig::new(name).with_default_timeout(Duration::from_millis(500));
        let transport: Arc<dyn QueueTransport> = broker.clone();
        let dispatcher = Arc::new(Dispatcher::new(transport, &config).unwrap());
        dispatcher.start().await.unwrap();
        dispatcher
    }

    /// Minimal service: answers every command on `queue` with `respond`.
    pub async fn spawn_responder<F>(broker: &Arc<InMemoryBroker>, queue: &str, respond: F) -> JoinHandle<()>
    where
        F: Fn(CommandName, Value) -> Result<Value, CommandError> + Send + 'static,
    {
        let mut consumer = broker.consume(queue).await.unwrap();
        let broker = broker.clone();
        tokio::spawn(async move {
            while let Some(delivery) = consumer.next().await {
                let frame = decode_request(delivery.body()).unwrap();
                let command = frame.command().unwrap();
                let (id, reply_to) = frame.reply_address().unwrap();
                let reply_to = reply_to.to_string();
                let outcome = respond(command, frame.data.clone());
                delivery.ack();
                broker
                    .publish(&reply_to, encode_reply(id, &outcome).unwrap())
                    .await
                    .unwrap();
            }
        })
    }
}
