use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::{CoreError, Result};
use crate::id::generate_id;

/// A campus event as stored and served by the backend.
///
/// Dates and times are kept as opaque display strings; the backend never
/// schedules anything from them, it only echoes them into notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub date: String,
    pub time: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    /// Reference to an uploaded image (URL or path); the file itself is
    /// handled outside this backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Payload for creating an event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub date: String,
    pub time: String,
    pub location: String,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

impl NewEvent {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(CoreError::invalid_event("title must not be empty"));
        }
        if self.date.trim().is_empty() {
            return Err(CoreError::invalid_event("date must not be empty"));
        }
        Ok(())
    }

    /// Materializes the draft into an `Event` with a fresh id.
    pub fn into_event(self) -> Event {
        let now = crate::now_utc();
        Event {
            id: generate_id(),
            title: self.title,
            date: self.date,
            time: self.time,
            location: self.location,
            instructions: self.instructions,
            image: self.image,
            link: self.link,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update for an event; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventChanges {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

impl EventChanges {
    pub fn validate(&self) -> Result<()> {
        if let Some(ref title) = self.title {
            if title.trim().is_empty() {
                return Err(CoreError::invalid_event("title must not be empty"));
            }
        }
        Ok(())
    }

    /// Applies the changes to an event and bumps its `updated_at`.
    pub fn apply(&self, event: &mut Event) {
        if let Some(ref title) = self.title {
            event.title = title.clone();
        }
        if let Some(ref date) = self.date {
            event.date = date.clone();
        }
        if let Some(ref time) = self.time {
            event.time = time.clone();
        }
        if let Some(ref location) = self.location {
            event.location = location.clone();
        }
        if let Some(ref instructions) = self.instructions {
            event.instructions = Some(instructions.clone());
        }
        if let Some(ref image) = self.image {
            event.image = Some(image.clone());
        }
        if let Some(ref link) = self.link {
            event.link = Some(link.clone());
        }
        event.updated_at = crate::now_utc();
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.date.is_none()
            && self.time.is_none()
            && self.location.is_none()
            && self.instructions.is_none()
            && self.image.is_none()
            && self.link.is_none()
    }
}

/// The kind of committed event mutation a dispatch reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationKind {
    Created,
    Updated,
    Deleted,
}

impl MutationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
        }
    }
}

impl std::fmt::Display for MutationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> NewEvent {
        NewEvent {
            title: "Hack Night".into(),
            date: "2024-05-01".into(),
            time: "18:00".into(),
            location: "Lab 3".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_event_validation() {
        assert!(draft().validate().is_ok());

        let mut bad = draft();
        bad.title = "   ".into();
        assert!(bad.validate().is_err());

        let mut bad = draft();
        bad.date = "".into();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_into_event_assigns_id_and_timestamps() {
        let event = draft().into_event();
        assert!(!event.id.is_empty());
        assert_eq!(event.title, "Hack Night");
        assert_eq!(event.created_at, event.updated_at);
    }

    #[test]
    fn test_changes_apply_only_set_fields() {
        let mut event = draft().into_event();
        let before = event.created_at;

        let changes = EventChanges {
            location: Some("Auditorium".into()),
            ..Default::default()
        };
        changes.apply(&mut event);

        assert_eq!(event.title, "Hack Night");
        assert_eq!(event.location, "Auditorium");
        assert_eq!(event.created_at, before);
        assert!(event.updated_at >= before);
    }

    #[test]
    fn test_changes_reject_blank_title() {
        let changes = EventChanges {
            title: Some("  ".into()),
            ..Default::default()
        };
        assert!(changes.validate().is_err());
    }

    #[test]
    fn test_changes_is_empty() {
        assert!(EventChanges::default().is_empty());
        let changes = EventChanges {
            date: Some("2024-06-01".into()),
            ..Default::default()
        };
        assert!(!changes.is_empty());
    }

    #[test]
    fn test_mutation_kind_display() {
        assert_eq!(MutationKind::Created.to_string(), "created");
        assert_eq!(MutationKind::Updated.as_str(), "updated");
        assert_eq!(MutationKind::Deleted.as_str(), "deleted");
    }
}
