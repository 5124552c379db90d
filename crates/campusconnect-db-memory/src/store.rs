use async_trait::async_trait;
use papaya::HashMap as PapayaHashMap;

use campusconnect_core::{
    Event, EventChanges, NewRegistration, Registration, User, normalize_email,
};
use campusconnect_storage::{
    EventStore, RegisterOutcome, RegistrationStore, StorageError, UserStore,
};

/// Key for a registration row: one row per `(event_id, user_email)` pair.
pub(crate) fn make_registration_key(event_id: &str, email: &str) -> String {
    format!("{event_id}/{email}")
}

/// In-memory backend using papaya lock-free HashMaps.
///
/// - events are keyed by id
/// - users are keyed by normalized email (emails are unique)
/// - registrations are keyed by `(event_id, email)`, which makes the
///   uniqueness invariant an atomic `try_insert` rather than a
///   check-then-insert
#[derive(Debug, Default)]
pub struct InMemoryStore {
    events: PapayaHashMap<String, Event>,
    users: PapayaHashMap<String, User>,
    registrations: PapayaHashMap<String, Registration>,
}

impl InMemoryStore {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored events.
    pub fn event_count(&self) -> usize {
        self.events.pin().len()
    }

    /// Number of stored registrations across all events.
    pub fn registration_count(&self) -> usize {
        self.registrations.pin().len()
    }
}

#[async_trait]
impl EventStore for InMemoryStore {
    async fn create(&self, event: Event) -> Result<Event, StorageError> {
        let guard = self.events.pin();
        match guard.try_insert(event.id.clone(), event.clone()) {
            Ok(_) => Ok(event),
            Err(_) => Err(StorageError::already_exists("event", event.id)),
        }
    }

    async fn get(&self, id: &str) -> Result<Option<Event>, StorageError> {
        let guard = self.events.pin();
        Ok(guard.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Event>, StorageError> {
        let guard = self.events.pin();
        let mut events: Vec<Event> = guard.values().cloned().collect();
        // Stable listing order for clients
        events.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(events)
    }

    async fn update(&self, id: &str, changes: &EventChanges) -> Result<Event, StorageError> {
        let guard = self.events.pin();
        let mut event = guard
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::not_found("event", id))?;
        changes.apply(&mut event);
        guard.insert(id.to_string(), event.clone());
        Ok(event)
    }

    async fn delete(&self, id: &str) -> Result<(), StorageError> {
        // Idempotent: deleting a missing event succeeds
        let guard = self.events.pin();
        guard.remove(id);
        Ok(())
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn create(&self, user: User) -> Result<User, StorageError> {
        let guard = self.users.pin();
        match guard.try_insert(user.email.clone(), user.clone()) {
            Ok(_) => Ok(user),
            Err(_) => Err(StorageError::already_exists("user", user.email)),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        let guard = self.users.pin();
        Ok(guard.get(&normalize_email(email)).cloned())
    }

    async fn list_emails(&self) -> Result<Vec<String>, StorageError> {
        let guard = self.users.pin();
        Ok(guard.values().map(|u| u.email.clone()).collect())
    }
}

#[async_trait]
impl RegistrationStore for InMemoryStore {
    async fn register(
        &self,
        registration: NewRegistration,
        event_title: &str,
    ) -> Result<RegisterOutcome, StorageError> {
        let row = registration.into_registration(event_title.to_string());
        let key = make_registration_key(&row.event_id, &row.user_email);
        let guard = self.registrations.pin();
        match guard.try_insert(key, row.clone()) {
            Ok(_) => Ok(RegisterOutcome::Created(row)),
            Err(_) => Ok(RegisterOutcome::AlreadyRegistered),
        }
    }

    async fn list_for_event(&self, event_id: &str) -> Result<Vec<Registration>, StorageError> {
        let guard = self.registrations.pin();
        let mut rows: Vec<Registration> = guard
            .values()
            .filter(|r| r.event_id == event_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn delete_for_event(&self, event_id: &str) -> Result<usize, StorageError> {
        let guard = self.registrations.pin();
        let keys: Vec<String> = guard
            .iter()
            .filter(|(_, r)| r.event_id == event_id)
            .map(|(k, _)| k.clone())
            .collect();
        let removed = keys.len();
        for key in keys {
            guard.remove(&key);
        }
        Ok(removed)
    }
}
