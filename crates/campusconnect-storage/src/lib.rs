//! Storage abstraction layer for the CampusConnect backend.
//!
//! Defines the store traits the HTTP handlers and the notification resolver
//! depend on, decoupled from any concrete backend.

pub mod error;
pub mod traits;

pub use error::StorageError;
pub use traits::{EventStore, RegisterOutcome, RegistrationStore, UserStore};

/// Convenience result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
