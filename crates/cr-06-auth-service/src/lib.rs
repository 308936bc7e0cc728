//! # Auth Service
//!
//! Owns user accounts. Serves `login`, `registration`, `get-all-users`,
//! `get-user`, `edit-user` and `delete-user` from the auth queue, and calls
//! the profile service for the profile linked to each account.
//!
//! ## Registration
//!
//! ```text
//! uniqueness checks ──► reserve user id ──► create-profile (nested call)
//!                                                   │
//!                          insert user ◄────────────┘
//!                               │
//!                  failed? ──► delete-profile (compensation)
//!                               │
//!                           issue token
//! ```
//!
//! A conflict is reported before any side effect. A failed profile call
//! leaves no user behind, and a failed user insert removes the profile it
//! just created, so no account ever points at a profile that was not seen
//! created. The inbound delivery is acknowledged by the router only after
//! every nested call has resolved.
//!
//! ## Outbound Dependencies
//!
//! | Port | Adapter | Purpose |
//! |------|---------|---------|
//! | `UserRepository` | `InMemoryUserRepository` | account storage |
//! | `PasswordHasher` | `Argon2Hasher` | password hashing |
//! | `ProfileDirectory` | `QueueProfileDirectory` | profile service calls |

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod handlers;
pub mod ports;

pub use adapters::{Argon2Hasher, InMemoryUserRepository, QueueProfileDirectory};
pub use config::AuthSettings;
pub use domain::AuthService;
pub use handlers::register_handlers;
pub use ports::{
    AuthApi, HashError, PasswordHasher, ProfileDirectory, ProfileDirectoryError, RepositoryError, UserRecord,
    UserRepository,
};
