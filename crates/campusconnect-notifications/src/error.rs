use thiserror::Error;

/// Errors internal to the notification subsystem.
///
/// None of these ever propagate into an HTTP response; the dispatcher logs
/// and aggregates them.
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Send failed: {0}")]
    SendFailed(String),
}

/// A failed delivery attempt to a single recipient.
#[derive(Debug, Clone, Error)]
#[error("Delivery to {recipient} failed: {reason}")]
pub struct DeliveryError {
    pub recipient: String,
    pub reason: String,
}

impl DeliveryError {
    pub fn new(recipient: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            reason: reason.into(),
        }
    }

    /// A per-recipient send that exceeded the dispatcher's bounded timeout.
    pub fn timed_out(recipient: impl Into<String>, after: std::time::Duration) -> Self {
        Self {
            recipient: recipient.into(),
            reason: format!("timed out after {}ms", after.as_millis()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_error_message() {
        let err = DeliveryError::new("a@x.com", "connection refused");
        assert_eq!(
            err.to_string(),
            "Delivery to a@x.com failed: connection refused"
        );
    }

    #[test]
    fn test_timeout_reason() {
        let err = DeliveryError::timed_out("a@x.com", std::time::Duration::from_secs(10));
        assert_eq!(err.reason, "timed out after 10000ms");
    }
}
