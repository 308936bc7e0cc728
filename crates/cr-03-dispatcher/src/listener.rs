//! Reply listener: completes pending calls from the instance's reply queue.

use crate::pending::PendingReplyStore;
use shared_bus::{decode_reply, Consumer};
use std::sync::Arc;
use tracing::{debug, warn};

/// Consumes the reply queue and hands each reply to its waiting caller.
pub struct ReplyListener {
    pending: Arc<PendingReplyStore>,
    consumer: Consumer,
}

impl ReplyListener {
    pub fn new(pending: Arc<PendingReplyStore>, consumer: Consumer) -> Self {
        Self { pending, consumer }
    }

    /// Run until the transport closes.
    ///
    /// Every reply is acknowledged, including late and unreadable ones:
    /// nobody will ever wait for them again.
    pub async fn run(mut self) {
        while let Some(delivery) = self.consumer.next().await {
            match decode_reply(delivery.body()) {
                Ok(frame) => {
                    let correlation_id = frame.id;
                    self.pending.complete(correlation_id, frame.into_result());
                }
                Err(e) => {
                    warn!(
                        queue = %self.consumer.queue(),
                        error = %e,
                        "Dropping unreadable reply"
                    );
                }
            }
            delivery.ack();
        }
        debug!(queue = %self.consumer.queue(), "Reply queue closed, stopping listener");
    }
}
