//! # Courier Runtime
//!
//! Composition root. Everything is assembled explicitly in [`wiring`]:
//! there is no container and no plugin discovery.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from `COURIER_*` variables
//! 2. Reject an unset, short or placeholder signing secret
//! 3. Initialise logging and metrics
//! 4. Start the profile service router, then the auth service (its
//!    dispatcher first, for the nested profile calls), then the gateway
//!    dispatcher
//! 5. Bind the HTTP listener
//!
//! `Ctrl-C` stops the HTTP server, closes the broker and lets routers drain.

pub mod config;
pub mod wiring;

pub use config::{ConfigError, HashCosts, RuntimeConfig};
pub use wiring::{CourierRuntime, Services, WiringError};
