//! Acquisitions Shared Library
//!
//! Request/response types, the account role model and payload validation
//! shared by the backend and its clients.

pub mod models;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use models::{Role, VALID_ROLES};
pub use types::*;
pub use validation::FieldError;
