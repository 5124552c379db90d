//! Notification fan-out for the CampusConnect backend.
//!
//! Given a committed event mutation, this crate resolves the affected
//! recipients, delivers one email per recipient through an unreliable
//! transport, triggers the realtime broadcast, and aggregates the
//! per-recipient outcomes without ever failing the CRUD operation that
//! triggered it.

pub mod channel;
pub mod dispatcher;
pub mod error;
pub mod realtime;
pub mod resolver;
pub mod templates;
pub mod types;

pub use channel::{EmailChannel, EmailTransport};
pub use dispatcher::NotificationDispatcher;
pub use error::{DeliveryError, NotificationError};
pub use realtime::{NullBroadcast, RealtimeBroadcast};
pub use resolver::{RecipientResolver, RecipientScope};
pub use templates::{RenderedContent, Template, TemplateRenderer};
pub use types::{Announcement, DeliveryFailure, EmailMessage, NotificationOutcome};
