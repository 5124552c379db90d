pub mod email;
pub mod error;
pub mod event;
pub mod id;
pub mod registration;
pub mod user;

pub use email::{normalize_email, validate_email};
pub use error::{CoreError, Result};
pub use event::{Event, EventChanges, MutationKind, NewEvent};
pub use id::generate_id;
pub use registration::{NewRegistration, Registration};
pub use user::{NewUser, User};

/// Current UTC timestamp, used for all persisted `created_at`/`updated_at` fields.
pub fn now_utc() -> time::OffsetDateTime {
    time::OffsetDateTime::now_utc()
}
