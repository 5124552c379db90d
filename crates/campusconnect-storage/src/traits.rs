//! Store traits all storage backends must implement.
//!
//! Implementations must be thread-safe (`Send + Sync`); handlers and the
//! notification resolver hold them as `Arc<dyn …Store>`.

use async_trait::async_trait;
use serde::Serialize;

use campusconnect_core::{Event, EventChanges, NewRegistration, Registration, User};

use crate::error::StorageError;

/// Store for campus events.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Persists a new event.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::AlreadyExists` if an event with the same id
    /// exists (only possible when ids are supplied by the backend itself).
    async fn create(&self, event: Event) -> Result<Event, StorageError>;

    /// Reads an event by id. Returns `None` if it does not exist.
    async fn get(&self, id: &str) -> Result<Option<Event>, StorageError>;

    /// Lists all events.
    async fn list(&self) -> Result<Vec<Event>, StorageError>;

    /// Applies a partial update to an event and returns the updated record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the event does not exist.
    async fn update(&self, id: &str, changes: &EventChanges) -> Result<Event, StorageError>;

    /// Deletes an event by id. Deleting a missing event is a no-op
    /// (idempotent delete); registration cascade is the caller's concern via
    /// `RegistrationStore::delete_for_event`.
    async fn delete(&self, id: &str) -> Result<(), StorageError>;
}

/// Store for user accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persists a new user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::AlreadyExists` if a user with the same
    /// (normalized) email already exists.
    async fn create(&self, user: User) -> Result<User, StorageError>;

    /// Looks up a user by normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StorageError>;

    /// Lists every known user's email address. Used by the recipient
    /// resolver for new-event broadcasts.
    async fn list_emails(&self) -> Result<Vec<String>, StorageError>;
}

/// Result of a registration attempt.
///
/// A duplicate attempt is not an error; it is reported as `AlreadyRegistered`
/// and the caller turns it into a normal "already registered" response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "status", content = "registration")]
pub enum RegisterOutcome {
    Created(Registration),
    AlreadyRegistered,
}

impl RegisterOutcome {
    /// Returns `true` if a new registration row was created.
    #[must_use]
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// Store for event registrations.
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    /// Registers a user for an event.
    ///
    /// Enforces the at-most-one registration per `(event_id, user_email)`
    /// invariant atomically: concurrent attempts for the same pair yield one
    /// `Created` and the rest `AlreadyRegistered`.
    async fn register(
        &self,
        registration: NewRegistration,
        event_title: &str,
    ) -> Result<RegisterOutcome, StorageError>;

    /// Lists all registrations for an event. An event without registrants
    /// yields an empty list, not an error.
    async fn list_for_event(&self, event_id: &str) -> Result<Vec<Registration>, StorageError>;

    /// Removes all registrations for an event (cascade on event deletion).
    /// Returns the number of registrations removed.
    async fn delete_for_event(&self, event_id: &str) -> Result<usize, StorageError>;
}

// Ensure traits are object-safe by using them as trait objects
#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time tests that the store traits are object-safe
    fn _assert_event_store_object_safe(_: &dyn EventStore) {}
    fn _assert_user_store_object_safe(_: &dyn UserStore) {}
    fn _assert_registration_store_object_safe(_: &dyn RegistrationStore) {}

    #[test]
    fn test_register_outcome_predicate() {
        assert!(!RegisterOutcome::AlreadyRegistered.is_created());
    }
}
