use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::email::{normalize_email, validate_email};
use crate::error::{CoreError, Result};
use crate::id::generate_id;

/// A signed-up user. The email doubles as login handle and notification
/// address. Users are never mutated after signup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Argon2 hash of the password, never the password itself.
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Signup payload. The password arrives in clear and must be hashed before
/// the `User` is built.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl NewUser {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::invalid_user("name must not be empty"));
        }
        validate_email(&self.email)?;
        if self.password.is_empty() {
            return Err(CoreError::invalid_user("password must not be empty"));
        }
        Ok(())
    }

    /// Builds the stored user from this payload and an already-computed
    /// password hash.
    pub fn into_user(self, password_hash: String) -> User {
        User {
            id: generate_id(),
            name: self.name,
            email: normalize_email(&self.email),
            password_hash,
            created_at: crate::now_utc(),
        }
    }
}
