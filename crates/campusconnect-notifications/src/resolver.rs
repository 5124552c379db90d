//! Recipient resolution for notification dispatch.

use std::collections::BTreeSet;
use std::sync::Arc;

use campusconnect_core::normalize_email;
use campusconnect_storage::{RegistrationStore, StorageError, UserStore};

/// The rule determining which users receive a given notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipientScope {
    /// Every known user. Used for new-event broadcasts.
    AllUsers,
    /// Only users registered for the given event. Used for update
    /// notifications.
    EventRegistrants(String),
}

/// Computes the set of recipient addresses for a scope.
///
/// Addresses are normalized and deduplicated; a user registered twice, or
/// present under differing case, is notified once. An empty result means
/// "nothing to send", never a failure.
#[derive(Clone)]
pub struct RecipientResolver {
    users: Arc<dyn UserStore>,
    registrations: Arc<dyn RegistrationStore>,
}

impl RecipientResolver {
    pub fn new(users: Arc<dyn UserStore>, registrations: Arc<dyn RegistrationStore>) -> Self {
        Self {
            users,
            registrations,
        }
    }

    pub async fn resolve(&self, scope: &RecipientScope) -> Result<BTreeSet<String>, StorageError> {
        let addresses: Vec<String> = match scope {
            RecipientScope::AllUsers => self.users.list_emails().await?,
            RecipientScope::EventRegistrants(event_id) => self
                .registrations
                .list_for_event(event_id)
                .await?
                .into_iter()
                .map(|r| r.user_email)
                .collect(),
        };

        Ok(addresses
            .iter()
            .map(|a| normalize_email(a))
            .filter(|a| !a.is_empty())
            .collect())
    }
}

impl std::fmt::Debug for RecipientResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecipientResolver").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campusconnect_core::{NewRegistration, NewUser};
    use campusconnect_db_memory::InMemoryStore;

    async fn seeded_store() -> Arc<InMemoryStore> {
        let store = Arc::new(InMemoryStore::new());
        for (name, email) in [("Alice", "a@x.com"), ("Bob", "B@x.com")] {
            UserStore::create(
                store.as_ref(),
                NewUser {
                    name: name.into(),
                    email: email.into(),
                    password: "pw".into(),
                }
                .into_user("hash".into()),
            )
            .await
            .unwrap();
        }
        store
    }

    fn resolver(store: &Arc<InMemoryStore>) -> RecipientResolver {
        RecipientResolver::new(store.clone(), store.clone())
    }

    #[tokio::test]
    async fn test_all_users_scope_is_deduplicated_and_normalized() {
        let store = seeded_store().await;
        let recipients = resolver(&store)
            .resolve(&RecipientScope::AllUsers)
            .await
            .unwrap();

        let expected: BTreeSet<String> = ["a@x.com", "b@x.com"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(recipients, expected);
    }

    #[tokio::test]
    async fn test_event_registrants_scope() {
        let store = seeded_store().await;
        for email in ["a@x.com", "A@X.COM", "c@x.com"] {
            store
                .register(
                    NewRegistration {
                        event_id: "ev-1".into(),
                        user_email: email.into(),
                        user_name: "Someone".into(),
                    },
                    "Hack Night",
                )
                .await
                .unwrap();
        }

        let recipients = resolver(&store)
            .resolve(&RecipientScope::EventRegistrants("ev-1".into()))
            .await
            .unwrap();

        let expected: BTreeSet<String> = ["a@x.com", "c@x.com"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(recipients, expected);
    }

    #[tokio::test]
    async fn test_empty_scopes_are_empty_not_errors() {
        let store = Arc::new(InMemoryStore::new());
        let resolver = resolver(&store);

        assert!(resolver
            .resolve(&RecipientScope::AllUsers)
            .await
            .unwrap()
            .is_empty());
        assert!(resolver
            .resolve(&RecipientScope::EventRegistrants("ev-404".into()))
            .await
            .unwrap()
            .is_empty());
    }
}
