//! # Courier Test Suite
//!
//! Cross-crate flows run against the fully wired runtime: real services,
//! real routers and dispatchers, one in-process broker, and the gateway's
//! router driven in-process.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── mod.rs        # TestCourier harness
//!     ├── accounts.rs   # registration, login, account access
//!     ├── profiles.rs   # profile ownership
//!     └── delivery.rs   # queue-level guarantees
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p cr-tests
//! cargo test -p cr-tests integration::delivery::
//! ```

pub mod integration;
