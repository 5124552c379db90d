use thiserror::Error;

/// Core error types for CampusConnect domain validation.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Invalid user: {0}")]
    InvalidUser(String),

    #[error("Invalid registration: {0}")]
    InvalidRegistration(String),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl CoreError {
    /// Create a new InvalidEvent error
    pub fn invalid_event(message: impl Into<String>) -> Self {
        Self::InvalidEvent(message.into())
    }

    /// Create a new InvalidEmail error
    pub fn invalid_email(address: impl Into<String>) -> Self {
        Self::InvalidEmail(address.into())
    }

    /// Create a new InvalidUser error
    pub fn invalid_user(message: impl Into<String>) -> Self {
        Self::InvalidUser(message.into())
    }

    /// Create a new InvalidRegistration error
    pub fn invalid_registration(message: impl Into<String>) -> Self {
        Self::InvalidRegistration(message.into())
    }
}

/// Convenience result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::invalid_event("title must not be empty");
        assert_eq!(err.to_string(), "Invalid event: title must not be empty");

        let err = CoreError::invalid_email("not-an-address");
        assert_eq!(err.to_string(), "Invalid email address: not-an-address");
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{ bad }").unwrap_err();
        let core_err: CoreError = json_err.into();
        assert!(matches!(core_err, CoreError::JsonError(_)));
    }
}
