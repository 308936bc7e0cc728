//! Adapters layer for the auth service.

pub mod argon;
pub mod memory;
pub mod profiles;

pub use argon::Argon2Hasher;
pub use memory::InMemoryUserRepository;
pub use profiles::QueueProfileDirectory;
