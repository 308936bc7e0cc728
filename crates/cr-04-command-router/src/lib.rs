//! # Command Router
//!
//! Runs inside each backend service. Takes command deliveries off the
//! service queue, dispatches them to typed handlers and answers on the
//! caller's reply queue.
//!
//! ## Delivery Lifecycle
//!
//! ```text
//! queue ──► decode frame ──► lookup handler ──► run (panics caught)
//!                │                  │                   │
//!           unreadable        unknown command      Ok / CommandError
//!                │                  │                   │
//!                ▼                  ▼                   ▼
//!               ack            ack + error          ack + reply
//! ```
//!
//! Every delivery is acknowledged exactly once, and only after its handler
//! has finished. A payload that fails to decode is answered with
//! `MalformedPayload` and acknowledged, so a poison message is never
//! redelivered in a loop.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod error;
pub mod registry;
pub mod router;

pub use error::RouterError;
pub use registry::{DynHandler, HandlerFuture, HandlerRegistry};
pub use router::{CommandRouter, RouterConfig, RouterStats};
