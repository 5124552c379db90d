//! Storage error types for the CampusConnect storage abstraction layer.

/// Errors that can occur during storage operations.
///
/// These are the only failures that may turn into a non-2xx HTTP response;
/// notification-side failures never come through here.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The requested record was not found.
    #[error("Not found: {kind}/{id}")]
    NotFound {
        /// The kind of record that was not found (event, user, registration).
        kind: String,
        /// The id or key that was looked up.
        id: String,
    },

    /// Attempted to create a record that already exists.
    #[error("Already exists: {kind}/{id}")]
    AlreadyExists {
        /// The kind of record that already exists.
        kind: String,
        /// The conflicting id or key.
        id: String,
    },

    /// The record data is invalid.
    #[error("Invalid record: {message}")]
    InvalidRecord {
        /// Description of why the record is invalid.
        message: String,
    },

    /// Failed to reach the storage backend.
    #[error("Connection error: {message}")]
    ConnectionError {
        /// Description of the connection error.
        message: String,
    },

    /// An internal storage error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl StorageError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Creates a new `AlreadyExists` error.
    #[must_use]
    pub fn already_exists(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self::AlreadyExists {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Creates a new `InvalidRecord` error.
    #[must_use]
    pub fn invalid_record(message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            message: message.into(),
        }
    }

    /// Creates a new `ConnectionError` error.
    #[must_use]
    pub fn connection_error(message: impl Into<String>) -> Self {
        Self::ConnectionError {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if this is an already exists error.
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = StorageError::not_found("event", "ev-1");
        assert_eq!(err.to_string(), "Not found: event/ev-1");
        assert!(err.is_not_found());
        assert!(!err.is_already_exists());
    }

    #[test]
    fn test_already_exists_message() {
        let err = StorageError::already_exists("user", "a@x.com");
        assert_eq!(err.to_string(), "Already exists: user/a@x.com");
        assert!(err.is_already_exists());
    }

    #[test]
    fn test_invalid_record_message() {
        let err = StorageError::invalid_record("missing title");
        assert_eq!(err.to_string(), "Invalid record: missing title");
    }
}
