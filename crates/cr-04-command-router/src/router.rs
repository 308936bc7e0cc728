//! Service-side delivery loop.

use crate::error::RouterError;
use crate::registry::HandlerRegistry;
use courier_telemetry::ROUTER_DELIVERIES;
use futures::FutureExt;
use serde_json::Value;
use shared_bus::{decode_request, encode_reply, Consumer, Delivery, QueueTransport, TransportError};
use shared_types::{CommandError, CorrelationId, ErrorKind, ServiceName};
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Router tuning.
#[derive(Debug, Clone, Copy)]
pub struct RouterConfig {
    /// Deliveries handled concurrently.
    pub concurrency: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self { concurrency: 64 }
    }
}

impl RouterConfig {
    /// Largest concurrency a router accepts: the drain acquires every permit
    /// in one `u32` request.
    pub const MAX_CONCURRENCY: usize = if (u32::MAX as usize) < Semaphore::MAX_PERMITS {
        u32::MAX as usize
    } else {
        Semaphore::MAX_PERMITS
    };

    pub fn validate(&self) -> Result<(), RouterError> {
        if self.concurrency == 0 {
            return Err(RouterError::ZeroConcurrency);
        }
        if self.concurrency > Self::MAX_CONCURRENCY {
            return Err(RouterError::ConcurrencyTooHigh {
                requested: self.concurrency,
                max: Self::MAX_CONCURRENCY,
            });
        }
        Ok(())
    }
}

/// Delivery counters.
#[derive(Debug, Default)]
pub struct RouterStats {
    /// Deliveries taken off the queue
    pub received: AtomicU64,
    /// Deliveries acknowledged
    pub acked: AtomicU64,
    /// Replies published
    pub replied: AtomicU64,
    /// Unreadable frames and payloads of the wrong shape
    pub malformed: AtomicU64,
    /// Commands with no handler here
    pub unknown: AtomicU64,
    /// Handlers that panicked
    pub panicked: AtomicU64,
}

/// How one delivery ended, for metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Ok,
    Rejected,
    Malformed,
    UnknownCommand,
    Panicked,
}

impl Outcome {
    fn label(&self) -> &'static str {
        match self {
            Outcome::Ok => "ok",
            Outcome::Rejected => "rejected",
            Outcome::Malformed => "malformed",
            Outcome::UnknownCommand => "unknown_command",
            Outcome::Panicked => "panicked",
        }
    }
}

/// Receives commands from a service queue and runs their handlers.
///
/// Per delivery: decode, look up the handler, run it to completion,
/// acknowledge exactly once, then publish the reply. Deliveries are handled
/// concurrently up to the configured limit.
#[derive(Clone)]
pub struct CommandRouter {
    service: ServiceName,
    registry: Arc<HandlerRegistry>,
    transport: Arc<dyn QueueTransport>,
    permits: Arc<Semaphore>,
    drain_permits: u32,
    stats: Arc<RouterStats>,
}

impl CommandRouter {
    /// Build a router. Fails if the registry does not cover the service's
    /// command surface.
    pub fn new(
        registry: HandlerRegistry,
        transport: Arc<dyn QueueTransport>,
        config: RouterConfig,
    ) -> Result<Self, RouterError> {
        registry.verify()?;
        config.validate()?;
        let drain_permits = u32::try_from(config.concurrency).map_err(|_| RouterError::ConcurrencyTooHigh {
            requested: config.concurrency,
            max: RouterConfig::MAX_CONCURRENCY,
        })?;
        Ok(Self {
            service: registry.service(),
            registry: Arc::new(registry),
            transport,
            permits: Arc::new(Semaphore::new(config.concurrency)),
            drain_permits,
            stats: Arc::new(RouterStats::default()),
        })
    }

    pub fn stats(&self) -> &Arc<RouterStats> {
        &self.stats
    }

    /// Declare `queue`, attach a consumer and run the router in the background.
    pub async fn spawn(self, queue: &str) -> Result<JoinHandle<()>, TransportError> {
        self.transport.declare(queue).await?;
        let consumer = self.transport.consume(queue).await?;
        Ok(tokio::spawn(self.run(consumer)))
    }

    /// Process deliveries until the consumer closes, then wait for
    /// in-flight handlers to finish.
    pub async fn run(self, mut consumer: Consumer) {
        info!(service = %self.service, queue = %consumer.queue(), "Command router started");

        loop {
            let Ok(permit) = self.permits.clone().acquire_owned().await else {
                break;
            };
            let Some(delivery) = consumer.next().await else {
                break;
            };
            let router = self.clone();
            tokio::spawn(async move {
                router.process(delivery).await;
                drop(permit);
            });
        }

        // Drain: every permit back means every handler has finished
        let _ = self.permits.acquire_many(self.drain_permits).await;
        info!(service = %self.service, queue = %consumer.queue(), "Command router stopped");
    }

    /// Handle one delivery end to end.
    pub async fn process(&self, delivery: Delivery) {
        self.stats.received.fetch_add(1, Ordering::Relaxed);

        let frame = match decode_request(delivery.body()) {
            Ok(frame) => frame,
            Err(e) => {
                // No trustworthy reply address; settle and drop
                warn!(service = %self.service, error = %e, "Discarding unreadable command frame");
                self.ack(delivery);
                self.stats.malformed.fetch_add(1, Ordering::Relaxed);
                self.record(Outcome::Malformed);
                return;
            }
        };

        let reply_address = frame
            .reply_address()
            .map(|(id, queue)| (id, queue.to_string()));
        let correlation_id = reply_address.as_ref().map(|(id, _)| *id);

        debug!(
            service = %self.service,
            command = %frame.pattern.cmd,
            correlation_id = ?correlation_id,
            redelivered = delivery.redelivered(),
            "Command received"
        );

        let (outcome, kind) = match frame.command() {
            Err(e) => (Err(e), Outcome::UnknownCommand),
            Ok(command) => match self.registry.get(command) {
                None => (
                    Err(CommandError::unknown_command(command.as_str())),
                    Outcome::UnknownCommand,
                ),
                Some(handler) => {
                    let result = AssertUnwindSafe(handler.call(command, frame.data))
                        .catch_unwind()
                        .await;
                    match result {
                        Ok(Ok(value)) => (Ok(value), Outcome::Ok),
                        Ok(Err(e)) if e.kind == ErrorKind::MalformedPayload => (Err(e), Outcome::Malformed),
                        Ok(Err(e)) => (Err(e), Outcome::Rejected),
                        Err(_) => {
                            error!(
                                service = %self.service,
                                command = %command,
                                correlation_id = ?correlation_id,
                                "Handler panicked"
                            );
                            (
                                Err(CommandError::internal(format!("handler for '{command}' failed"))),
                                Outcome::Panicked,
                            )
                        }
                    }
                }
            },
        };

        match kind {
            Outcome::Malformed => {
                self.stats.malformed.fetch_add(1, Ordering::Relaxed);
            }
            Outcome::UnknownCommand => {
                self.stats.unknown.fetch_add(1, Ordering::Relaxed);
            }
            Outcome::Panicked => {
                self.stats.panicked.fetch_add(1, Ordering::Relaxed);
            }
            Outcome::Ok | Outcome::Rejected => {}
        }

        // Handler has completed; this is the only ack for the delivery
        self.ack(delivery);
        self.record(kind);

        match reply_address {
            Some((id, reply_to)) => self.reply(id, &reply_to, &outcome).await,
            None => debug!(service = %self.service, "No reply address, reply dropped"),
        }
    }

    fn ack(&self, delivery: Delivery) {
        delivery.ack();
        self.stats.acked.fetch_add(1, Ordering::Relaxed);
    }

    fn record(&self, outcome: Outcome) {
        ROUTER_DELIVERIES
            .with_label_values(&[self.service.as_str(), outcome.label()])
            .inc();
    }

    async fn reply(&self, correlation_id: CorrelationId, reply_to: &str, outcome: &Result<Value, CommandError>) {
        let body = match encode_reply(correlation_id, outcome) {
            Ok(body) => body,
            Err(e) => {
                error!(correlation_id = %correlation_id, error = %e, "Failed to encode reply");
                return;
            }
        };
        match self.transport.publish(reply_to, body).await {
            Ok(()) => {
                self.stats.replied.fetch_add(1, Ordering::Relaxed);
                debug!(correlation_id = %correlation_id, reply_to, "Reply published");
            }
            Err(e) => {
                error!(
                    correlation_id = %correlation_id,
                    reply_to,
                    error = %e,
                    "Failed to publish reply"
                );
            }
        }
    }
}
