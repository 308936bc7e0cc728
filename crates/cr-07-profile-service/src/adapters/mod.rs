//! Adapters layer for the profile service.

pub mod memory;

pub use memory::InMemoryProfileRepository;
