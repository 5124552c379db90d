use serde::Serialize;

use campusconnect_core::Event;

use crate::error::DeliveryError;

/// One outbound email, addressed to a single recipient.
///
/// Fan-out always sends one message per recipient so that one bad address
/// cannot block the rest of the batch.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub html_body: Option<String>,
}

/// A realtime announcement broadcast to every connected client.
#[derive(Debug, Clone, Serialize)]
pub struct Announcement {
    /// Client-facing event name.
    pub name: String,
    pub payload: serde_json::Value,
}

impl Announcement {
    /// Announcement for a newly added event.
    pub fn event_added(event: &Event) -> Self {
        Self {
            name: "event-added".to_string(),
            payload: serde_json::json!({
                "message": format!("New event: {}", event.title),
                "event": {
                    "id": event.id,
                    "title": event.title,
                    "date": event.date,
                    "time": event.time,
                    "location": event.location,
                },
            }),
        }
    }
}

/// Per-recipient failure detail, kept for logging only.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryFailure {
    pub recipient: String,
    pub reason: String,
}

impl From<DeliveryError> for DeliveryFailure {
    fn from(err: DeliveryError) -> Self {
        Self {
            recipient: err.recipient,
            reason: err.reason,
        }
    }
}

/// Aggregated result of one dispatch.
///
/// Ephemeral: held for the duration of the request/response cycle and for
/// logging, never persisted. HTTP callers only see the counts, not the
/// per-recipient failure reasons.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NotificationOutcome {
    /// Recipients for which a send was attempted.
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Realtime broadcasts triggered (0 or 1).
    pub broadcasts: usize,
    #[serde(skip)]
    pub failures: Vec<DeliveryFailure>,
}

impl NotificationOutcome {
    /// Outcome of a dispatch that had nothing to send.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Records the result of one per-recipient send attempt.
    pub fn record(&mut self, result: Result<(), DeliveryError>) {
        self.attempted += 1;
        match result {
            Ok(()) => self.succeeded += 1,
            Err(err) => {
                self.failed += 1;
                self.failures.push(err.into());
            }
        }
    }

    /// Marks that a realtime broadcast was triggered.
    pub fn record_broadcast(&mut self) {
        self.broadcasts += 1;
    }

    /// `true` when every attempted send succeeded (vacuously true for an
    /// empty dispatch).
    pub fn is_complete_success(&self) -> bool {
        self.failed == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campusconnect_core::NewEvent;

    #[test]
    fn test_outcome_counts() {
        let mut outcome = NotificationOutcome::empty();
        outcome.record(Ok(()));
        outcome.record(Err(DeliveryError::new("a@x.com", "boom")));
        outcome.record(Ok(()));

        assert_eq!(outcome.attempted, 3);
        assert_eq!(outcome.succeeded, 2);
        assert_eq!(outcome.failed, 1);
        assert_eq!(outcome.failures[0].recipient, "a@x.com");
        assert!(!outcome.is_complete_success());
    }

    #[test]
    fn test_empty_outcome_is_success() {
        assert!(NotificationOutcome::empty().is_complete_success());
    }

    #[test]
    fn test_failures_not_serialized() {
        let mut outcome = NotificationOutcome::empty();
        outcome.record(Err(DeliveryError::new("a@x.com", "boom")));
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(!json.contains("a@x.com"));
        assert!(json.contains("\"failed\":1"));
    }

    #[test]
    fn test_event_added_announcement_carries_title() {
        let event = NewEvent {
            title: "Hack Night".into(),
            date: "2024-05-01".into(),
            time: "18:00".into(),
            location: "Lab 3".into(),
            ..Default::default()
        }
        .into_event();

        let announcement = Announcement::event_added(&event);
        assert_eq!(announcement.name, "event-added");
        assert_eq!(announcement.payload["message"], "New event: Hack Night");
        assert_eq!(announcement.payload["event"]["id"], event.id.as_str());
    }
}
