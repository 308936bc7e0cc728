//! # Shared Types Crate
//!
//! Domain entities, command payloads and the structured error taxonomy that
//! travel between the gateway and the backend services.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every type that crosses a queue is defined here.
//! - **Static Command Surface**: command names are an enum, not free strings;
//!   each service declares the exact set it must handle.
//! - **Errors Are Replies**: failures cross the queue as [`CommandError`]
//!   values, never as transport failures.

pub mod commands;
pub mod correlation;
pub mod entities;
pub mod errors;
pub mod identity;
pub mod ipc;

pub use commands::{CommandName, ServiceName, UnknownCommandName};
pub use correlation::CorrelationId;
pub use entities::*;
pub use errors::{CommandError, ErrorKind};
pub use identity::IdentityClaim;
pub use ipc::*;
