//! Profile domain: field rules and the service implementing `ProfileApi`.

pub mod service;
pub mod validation;

pub use service::ProfileService;
pub use validation::{validate_fields, validate_update};
