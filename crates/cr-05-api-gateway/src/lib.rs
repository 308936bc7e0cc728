//! # API Gateway
//!
//! The external HTTP surface. Each request is authenticated, checked against
//! its route's access policy, turned into a command, and answered with the
//! service's correlated reply.
//!
//! ## Request Pipeline
//!
//! ```text
//! HTTP ──► Authenticated (401) ──► AccessGuard (403) ──► Dispatcher ──► queue
//!                                                            │
//! HTTP ◄──────────── status from reply or error kind ◄───────┘
//! ```
//!
//! Identity and access failures are decided here and never reach a
//! backend service. A service's business errors come back verbatim with the
//! status of their kind. A timeout is 504 and means the command's outcome is
//! unknown: at-least-once, reply-may-be-lost.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod service;
pub mod state;

pub use config::{ConfigError, GatewayConfig, HttpConfig};
pub use error::{ApiError, GatewayError};
pub use extract::Authenticated;
pub use routes::build_router;
pub use service::{ApiGatewayService, RunningGateway};
pub use state::AppState;
