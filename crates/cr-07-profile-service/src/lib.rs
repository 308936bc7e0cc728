//! # Profile Service
//!
//! Owns user profiles. Serves `create-profile`, `get-all-profiles`,
//! `get-profile`, `edit-profile` and `delete-profile` from the profile queue.
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! handlers.rs         - command name → ProfileApi method table
//!        │
//! ports/inbound.rs    - ProfileApi
//!        │
//! domain/             - ProfileService, field validation
//!        │
//! ports/outbound.rs   - ProfileRepository
//!        │
//! adapters/memory.rs  - InMemoryProfileRepository
//! ```
//!
//! ## Redelivery
//!
//! `create-profile` with an owner is idempotent per owner: a redelivered
//! command returns the profile the first delivery created instead of a
//! second one.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod domain;
pub mod handlers;
pub mod ports;

pub use adapters::InMemoryProfileRepository;
pub use domain::ProfileService;
pub use handlers::register_handlers;
pub use ports::{ProfileApi, ProfileRepository, RepositoryError};
