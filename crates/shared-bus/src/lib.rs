//! # Shared Bus - Durable Work Queues Between Gateway and Services
//!
//! Every interaction between the gateway and a backend service, and between
//! two services, is a command published on a named queue and a reply
//! published on the caller's reply queue.
//!
//! ```text
//! ┌──────────────┐   publish(auth_queue)   ┌──────────────┐
//! │   Gateway    │ ──────────────────────► │ Auth Service │
//! │              │                         │              │
//! │              │ ◄────────────────────── │              │
//! └──────────────┘  publish(reply_to)      └──────────────┘
//! ```
//!
//! ## Delivery Contract
//!
//! - **Work-queue semantics:** competing consumers on one queue each receive
//!   distinct messages.
//! - **Manual acknowledgement:** a [`Delivery`] is acknowledged by consuming
//!   it with [`Delivery::ack`]. A second ack does not type-check.
//! - **At-least-once:** a delivery dropped without ack (consumer failure) is
//!   requeued and redelivered with `redelivered = true`.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod broker;
pub mod codec;
pub mod transport;

// Re-export main types
pub use broker::{BrokerStats, InMemoryBroker};
pub use codec::{
    decode_payload, decode_reply, decode_request, encode_reply, encode_request, CodecError,
    CommandPattern, ReplyFrame, RequestFrame,
};
pub use transport::{Acknowledger, Consumer, Delivery, DeliverySource, QueueTransport, TransportError};
