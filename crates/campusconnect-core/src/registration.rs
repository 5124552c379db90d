use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::email::{normalize_email, validate_email};
use crate::error::{CoreError, Result};
use crate::id::generate_id;

/// Links a user (by email) to an event, with a denormalized snapshot of the
/// name and event title taken at registration time.
///
/// Invariant: at most one registration per `(event_id, user_email)` pair,
/// enforced by the registration store. Registrations are destroyed in cascade
/// when their event is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub id: String,
    pub event_id: String,
    pub event_title: String,
    pub user_email: String,
    pub user_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Payload for registering a user for an event.
#[derive(Debug, Clone, Deserialize)]
pub struct NewRegistration {
    pub event_id: String,
    pub user_email: String,
    pub user_name: String,
}

impl NewRegistration {
    pub fn validate(&self) -> Result<()> {
        if self.event_id.trim().is_empty() {
            return Err(CoreError::invalid_registration("event_id must not be empty"));
        }
        validate_email(&self.user_email)?;
        Ok(())
    }

    /// Builds the stored registration, snapshotting the event title.
    pub fn into_registration(self, event_title: String) -> Registration {
        Registration {
            id: generate_id(),
            event_id: self.event_id,
            event_title,
            user_email: normalize_email(&self.user_email),
            user_name: self.user_name,
            created_at: crate::now_utc(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation() {
        let reg = NewRegistration {
            event_id: "ev-1".into(),
            user_email: "a@x.com".into(),
            user_name: "Alice".into(),
        };
        assert!(reg.validate().is_ok());

        let bad = NewRegistration {
            event_id: "".into(),
            user_email: "a@x.com".into(),
            user_name: "Alice".into(),
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_into_registration_snapshots_title() {
        let reg = NewRegistration {
            event_id: "ev-1".into(),
            user_email: "A@X.com".into(),
            user_name: "Alice".into(),
        }
        .into_registration("Hack Night".into());

        assert_eq!(reg.event_title, "Hack Night");
        assert_eq!(reg.user_email, "a@x.com");
        assert!(!reg.id.is_empty());
    }
}
