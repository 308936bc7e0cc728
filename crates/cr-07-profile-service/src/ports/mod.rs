//! Ports layer for the profile service.
//!
//! - Inbound (Driving): `ProfileApi`, called by the command handlers
//! - Outbound (Driven): `ProfileRepository`, profile storage

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
