//! # Queue Transport Contract
//!
//! The interface the gateway and services use to talk to a durable broker.
//! Any broker with named queues and manual acknowledgement can sit behind it.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors from transport operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The broker connection was closed.
    #[error("Transport closed")]
    Closed,

    /// The broker refused the operation.
    #[error("Broker rejected operation on queue '{queue}': {reason}")]
    Rejected { queue: String, reason: String },
}

/// A durable broker exposing named queues.
#[async_trait]
pub trait QueueTransport: Send + Sync {
    /// Declare a durable queue. Declaring an existing queue is a no-op.
    async fn declare(&self, queue: &str) -> Result<(), TransportError>;

    /// Publish a message body to a queue.
    async fn publish(&self, queue: &str, body: Vec<u8>) -> Result<(), TransportError>;

    /// Start consuming a queue with manual acknowledgement.
    async fn consume(&self, queue: &str) -> Result<Consumer, TransportError>;
}

/// Settles deliveries on behalf of the broker.
pub trait Acknowledger: Send + Sync {
    /// Mark the delivery as processed. The broker forgets the message.
    fn ack(&self, delivery_tag: u64);

    /// Return the delivery to its queue for redelivery.
    fn requeue(&self, delivery_tag: u64);
}

/// One delivered message awaiting acknowledgement.
///
/// `ack` and `requeue` consume the delivery, so it is settled at most once.
/// Dropping it unsettled requeues it, which is how a crashed handler looks to
/// the broker.
pub struct Delivery {
    body: Vec<u8>,
    delivery_tag: u64,
    redelivered: bool,
    acker: Option<Arc<dyn Acknowledger>>,
}

impl Delivery {
    pub fn new(
        body: Vec<u8>,
        delivery_tag: u64,
        redelivered: bool,
        acker: Arc<dyn Acknowledger>,
    ) -> Self {
        Self {
            body,
            delivery_tag,
            redelivered,
            acker: Some(acker),
        }
    }

    /// Message body.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Broker-assigned tag, unique among unsettled deliveries of a queue.
    #[must_use]
    pub fn delivery_tag(&self) -> u64 {
        self.delivery_tag
    }

    /// Whether this message was delivered before and not acknowledged.
    #[must_use]
    pub fn redelivered(&self) -> bool {
        self.redelivered
    }

    /// Acknowledge the delivery.
    pub fn ack(mut self) {
        if let Some(acker) = self.acker.take() {
            acker.ack(self.delivery_tag);
        }
    }

    /// Hand the delivery back to the broker for redelivery.
    pub fn requeue(mut self) {
        if let Some(acker) = self.acker.take() {
            acker.requeue(self.delivery_tag);
        }
    }
}

impl Drop for Delivery {
    fn drop(&mut self) {
        if let Some(acker) = self.acker.take() {
            debug!(delivery_tag = self.delivery_tag, "Delivery dropped unacknowledged, requeueing");
            acker.requeue(self.delivery_tag);
        }
    }
}

impl fmt::Debug for Delivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delivery")
            .field("delivery_tag", &self.delivery_tag)
            .field("redelivered", &self.redelivered)
            .field("len", &self.body.len())
            .finish()
    }
}

/// Broker-specific source of deliveries behind a [`Consumer`].
#[async_trait]
pub trait DeliverySource: Send {
    /// Wait for the next delivery. `None` once the transport is closed.
    async fn next_delivery(&mut self) -> Option<Delivery>;
}

/// A consumer bound to one queue.
pub struct Consumer {
    queue: String,
    source: Box<dyn DeliverySource>,
}

impl Consumer {
    pub fn new(queue: impl Into<String>, source: Box<dyn DeliverySource>) -> Self {
        Self {
            queue: queue.into(),
            source,
        }
    }

    /// Queue this consumer is bound to.
    #[must_use]
    pub fn queue(&self) -> &str {
        &self.queue
    }

    /// Receive the next delivery.
    ///
    /// # Returns
    ///
    /// - `Some(delivery)` - The next message, unacknowledged
    /// - `None` - The transport was closed
    pub async fn next(&mut self) -> Option<Delivery> {
        self.source.next_delivery().await
    }
}

impl fmt::Debug for Consumer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Consumer").field("queue", &self.queue).finish()
    }
}
