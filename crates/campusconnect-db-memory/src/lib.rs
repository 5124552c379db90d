//! In-memory storage backend for the CampusConnect backend.
//!
//! Implements the `EventStore`, `UserStore`, and `RegistrationStore` traits
//! from `campusconnect-storage`, using papaya lock-free HashMaps for
//! concurrent access. Suitable for tests and single-node deployments.

pub mod store;

pub use campusconnect_storage::{
    EventStore, RegisterOutcome, RegistrationStore, StorageError, UserStore,
};
pub use store::InMemoryStore;

/// Creates a new shared in-memory store.
pub fn create_store() -> std::sync::Arc<InMemoryStore> {
    std::sync::Arc::new(InMemoryStore::new())
}
