//! Ports layer for the auth service.
//!
//! - Inbound (Driving): `AuthApi`, called by the command handlers
//! - Outbound (Driven): `UserRepository`, `PasswordHasher`, `ProfileDirectory`

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
