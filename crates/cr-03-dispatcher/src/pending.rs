//! Pending Reply Store - the correlation table.
//!
//! Maps correlation IDs to callers suspended on a one-shot channel until the
//! reply listener completes them or their wait times out.

use courier_telemetry::PENDING_CALLS;
use dashmap::DashMap;
use serde_json::Value;
use shared_types::{CommandError, CommandName, CorrelationId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Reply delivered to a waiting caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    /// Correlation ID this reply is for
    pub correlation_id: CorrelationId,
    /// Success payload or the service's structured error, verbatim
    pub outcome: Result<Value, CommandError>,
    /// Time from registration to completion
    pub response_time: Duration,
}

/// A call waiting for its reply
struct PendingCall {
    /// Channel to send the reply
    sender: oneshot::Sender<Reply>,
    /// When the call was registered
    created_at: Instant,
    /// Command name (for logging)
    command: CommandName,
    /// Timeout for this call
    timeout: Duration,
}

/// Statistics for the pending reply store
#[derive(Debug, Default)]
pub struct PendingStats {
    /// Total calls registered
    pub total_registered: AtomicU64,
    /// Total calls completed with a reply
    pub total_completed: AtomicU64,
    /// Total calls abandoned after their timeout
    pub total_timeouts: AtomicU64,
    /// Total calls cancelled before a reply
    pub total_cancelled: AtomicU64,
    /// Replies that matched no outstanding call
    pub total_orphaned: AtomicU64,
}

/// Correlation table shared by every concurrent call of one dispatcher.
///
/// Flow:
/// 1. Dispatcher calls `register()` and gets a fresh id and a receiver
/// 2. Dispatcher publishes the command tagged with that id
/// 3. Reply listener calls `complete()` when the matching reply arrives
/// 4. Dispatcher awaits the receiver, or calls `expire()` on timeout
pub struct PendingReplyStore {
    /// Map of correlation ID to pending call
    pending: DashMap<CorrelationId, PendingCall>,
    /// Extra time an entry may outlive its timeout before the sweep removes it
    sweep_grace: Duration,
    /// Statistics
    stats: Arc<PendingStats>,
}

impl PendingReplyStore {
    pub fn new(sweep_grace: Duration) -> Self {
        Self {
            pending: DashMap::new(),
            sweep_grace,
            stats: Arc::new(PendingStats::default()),
        }
    }

    /// Register a call and get a receiver for its reply.
    ///
    /// Every registration gets a fresh correlation id, so no two calls ever
    /// share an entry.
    pub fn register(
        &self,
        command: CommandName,
        timeout: Duration,
    ) -> (CorrelationId, oneshot::Receiver<Reply>) {
        let correlation_id = CorrelationId::new();
        let (tx, rx) = oneshot::channel();

        self.pending.insert(
            correlation_id,
            PendingCall {
                sender: tx,
                created_at: Instant::now(),
                command,
                timeout,
            },
        );
        self.stats.total_registered.fetch_add(1, Ordering::Relaxed);
        PENDING_CALLS.inc();

        debug!(
            correlation_id = %correlation_id,
            command = %command,
            "Registered pending call"
        );

        (correlation_id, rx)
    }

    /// Complete a pending call with its reply.
    ///
    /// Returns true if the call was found and its caller received the reply.
    /// A reply for an unknown or already removed id is a no-op.
    pub fn complete(&self, correlation_id: CorrelationId, outcome: Result<Value, CommandError>) -> bool {
        let Some((_, pending)) = self.pending.remove(&correlation_id) else {
            self.stats.total_orphaned.fetch_add(1, Ordering::Relaxed);
            warn!(
                correlation_id = %correlation_id,
                "Reply for unknown or expired correlation ID"
            );
            return false;
        };
        PENDING_CALLS.dec();

        let response_time = pending.created_at.elapsed();
        let reply = Reply {
            correlation_id,
            outcome,
            response_time,
        };

        match pending.sender.send(reply) {
            Ok(()) => {
                self.stats.total_completed.fetch_add(1, Ordering::Relaxed);
                debug!(
                    correlation_id = %correlation_id,
                    command = %pending.command,
                    response_time_ms = response_time.as_millis(),
                    "Completed pending call"
                );
                true
            }
            Err(_) => {
                // Caller went away (request future dropped)
                self.stats.total_cancelled.fetch_add(1, Ordering::Relaxed);
                debug!(
                    correlation_id = %correlation_id,
                    command = %pending.command,
                    "Pending call receiver dropped"
                );
                false
            }
        }
    }

    /// Remove a call whose wait timed out. Returns false if the reply won the race.
    pub fn expire(&self, correlation_id: &CorrelationId) -> bool {
        if self.pending.remove(correlation_id).is_some() {
            PENDING_CALLS.dec();
            self.stats.total_timeouts.fetch_add(1, Ordering::Relaxed);
            true
        } else {
            false
        }
    }

    /// Remove a call that never made it onto the queue.
    pub fn cancel(&self, correlation_id: &CorrelationId) -> bool {
        if self.pending.remove(correlation_id).is_some() {
            PENDING_CALLS.dec();
            self.stats.total_cancelled.fetch_add(1, Ordering::Relaxed);
            true
        } else {
            false
        }
    }

    /// Remove entries that outlived their timeout plus the sweep grace.
    ///
    /// Callers normally remove their own entry on timeout; this catches
    /// entries whose caller was dropped mid-wait. Returns the number removed.
    pub fn remove_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;

        self.pending.retain(|id, call| {
            let elapsed = now.duration_since(call.created_at);
            if elapsed > call.timeout + self.sweep_grace {
                warn!(
                    correlation_id = %id,
                    command = %call.command,
                    elapsed_ms = elapsed.as_millis(),
                    timeout_ms = call.timeout.as_millis(),
                    "Removing expired pending call"
                );
                removed += 1;
                false
            } else {
                true
            }
        });

        if removed > 0 {
            PENDING_CALLS.sub(removed as i64);
            self.stats
                .total_timeouts
                .fetch_add(removed as u64, Ordering::Relaxed);
        }
        removed
    }

    /// Get number of calls currently awaiting a reply
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Check if a correlation ID is pending
    pub fn is_pending(&self, correlation_id: &CorrelationId) -> bool {
        self.pending.contains_key(correlation_id)
    }

    /// Get statistics
    pub fn stats(&self) -> &PendingStats {
        &self.stats
    }
}

/// Background task to sweep abandoned entries
pub async fn cleanup_task(store: Arc<PendingReplyStore>, interval: Duration) {
    let mut cleanup_interval = tokio::time::interval(interval);
    cleanup_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        cleanup_interval.tick().await;
        let removed = store.remove_expired();
        if removed > 0 {
            debug!(removed = removed, "Cleaned up expired pending calls");
        }
    }
}
