//! # In-Memory Broker
//!
//! Single-process implementation of [`QueueTransport`]. Queues keep their
//! messages until a consumer acknowledges them; deliveries that are dropped
//! unsettled go back to the head of their queue.
//!
//! Distributed deployments put an AMQP broker behind the same trait.

use crate::transport::{Acknowledger, Consumer, Delivery, DeliverySource, QueueTransport, TransportError};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{debug, warn};

/// Broker-wide counters.
#[derive(Debug, Default)]
pub struct BrokerStats {
    published: AtomicU64,
    acked: AtomicU64,
    requeued: AtomicU64,
}

impl BrokerStats {
    /// Total messages accepted by `publish`.
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    /// Total deliveries acknowledged.
    pub fn acked(&self) -> u64 {
        self.acked.load(Ordering::Relaxed)
    }

    /// Total deliveries returned to their queue.
    pub fn requeued(&self) -> u64 {
        self.requeued.load(Ordering::Relaxed)
    }
}

#[derive(Debug)]
struct Message {
    body: Vec<u8>,
    redelivered: bool,
}

#[derive(Debug, Default)]
struct QueueBuffers {
    ready: VecDeque<Message>,
    unacked: HashMap<u64, Message>,
    next_tag: u64,
}

struct QueueState {
    name: String,
    buffers: Mutex<QueueBuffers>,
    notify: Notify,
    closed: Arc<AtomicBool>,
    stats: Arc<BrokerStats>,
}

impl QueueState {
    fn push(&self, body: Vec<u8>) {
        self.buffers.lock().ready.push_back(Message {
            body,
            redelivered: false,
        });
        self.notify.notify_one();
    }

    fn take_ready(self: &Arc<Self>) -> Option<Delivery> {
        let mut buffers = self.buffers.lock();
        let message = buffers.ready.pop_front()?;

        buffers.next_tag += 1;
        let tag = buffers.next_tag;
        let body = message.body.clone();
        let redelivered = message.redelivered;
        buffers.unacked.insert(tag, message);
        let more_ready = !buffers.ready.is_empty();
        drop(buffers);

        // Pass the wakeup on so a backlog never waits behind one consumer.
        if more_ready {
            self.notify.notify_one();
        }

        let acker: Arc<dyn Acknowledger> = self.clone();
        Some(Delivery::new(body, tag, redelivered, acker))
    }
}

impl Acknowledger for QueueState {
    fn ack(&self, delivery_tag: u64) {
        if self.buffers.lock().unacked.remove(&delivery_tag).is_some() {
            self.stats.acked.fetch_add(1, Ordering::Relaxed);
        } else {
            warn!(queue = %self.name, delivery_tag, "Ack for unknown delivery tag");
        }
    }

    fn requeue(&self, delivery_tag: u64) {
        let mut buffers = self.buffers.lock();
        let Some(mut message) = buffers.unacked.remove(&delivery_tag) else {
            warn!(queue = %self.name, delivery_tag, "Requeue for unknown delivery tag");
            return;
        };
        message.redelivered = true;
        buffers.ready.push_front(message);
        drop(buffers);

        self.stats.requeued.fetch_add(1, Ordering::Relaxed);
        debug!(queue = %self.name, delivery_tag, "Message requeued");
        self.notify.notify_one();
    }
}

struct BrokerConsumer {
    state: Arc<QueueState>,
}

#[async_trait]
impl DeliverySource for BrokerConsumer {
    async fn next_delivery(&mut self) -> Option<Delivery> {
        loop {
            let notified = self.state.notify.notified();
            tokio::pin!(notified);
            // Register before checking so a publish between the check and
            // the await is not missed.
            notified.as_mut().enable();

            if self.state.closed.load(Ordering::Acquire) {
                return None;
            }
            if let Some(delivery) = self.state.take_ready() {
                return Some(delivery);
            }

            notified.await;
        }
    }
}

/// In-process durable broker.
pub struct InMemoryBroker {
    queues: RwLock<HashMap<String, Arc<QueueState>>>,
    closed: Arc<AtomicBool>,
    stats: Arc<BrokerStats>,
}

impl InMemoryBroker {
    #[must_use]
    pub fn new() -> Self {
        Self {
            queues: RwLock::new(HashMap::new()),
            closed: Arc::new(AtomicBool::new(false)),
            stats: Arc::new(BrokerStats::default()),
        }
    }

    fn queue(&self, name: &str) -> Arc<QueueState> {
        if let Some(state) = self.queues.read().get(name) {
            return state.clone();
        }
        self.queues
            .write()
            .entry(name.to_string())
            .or_insert_with(|| {
                debug!(queue = name, "Queue declared");
                Arc::new(QueueState {
                    name: name.to_string(),
                    buffers: Mutex::new(QueueBuffers::default()),
                    notify: Notify::new(),
                    closed: self.closed.clone(),
                    stats: self.stats.clone(),
                })
            })
            .clone()
    }

    fn ensure_open(&self) -> Result<(), TransportError> {
        if self.closed.load(Ordering::Acquire) {
            Err(TransportError::Closed)
        } else {
            Ok(())
        }
    }

    /// Broker-wide counters.
    #[must_use]
    pub fn stats(&self) -> &BrokerStats {
        &self.stats
    }

    /// Messages waiting for a consumer on `queue`.
    #[must_use]
    pub fn ready_count(&self, queue: &str) -> usize {
        self.queues
            .read()
            .get(queue)
            .map_or(0, |q| q.buffers.lock().ready.len())
    }

    /// Messages delivered on `queue` but not yet acknowledged.
    #[must_use]
    pub fn unacked_count(&self, queue: &str) -> usize {
        self.queues
            .read()
            .get(queue)
            .map_or(0, |q| q.buffers.lock().unacked.len())
    }

    /// Close the broker. Every consumer's `next` returns `None` and further
    /// publishes fail. Settling outstanding deliveries still works.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        for state in self.queues.read().values() {
            state.notify.notify_waiters();
        }
        debug!("Broker closed");
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl Default for InMemoryBroker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QueueTransport for InMemoryBroker {
    async fn declare(&self, queue: &str) -> Result<(), TransportError> {
        self.ensure_open()?;
        self.queue(queue);
        Ok(())
    }

    async fn publish(&self, queue: &str, body: Vec<u8>) -> Result<(), TransportError> {
        self.ensure_open()?;
        self.queue(queue).push(body);
        self.stats.published.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn consume(&self, queue: &str) -> Result<Consumer, TransportError> {
        self.ensure_open()?;
        let state = self.queue(queue);
        debug!(queue, "Consumer attached");
        Ok(Consumer::new(queue, Box::new(BrokerConsumer { state })))
    }
}
