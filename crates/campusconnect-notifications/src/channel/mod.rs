//! Delivery channel abstraction.
//!
//! All email sends go through the `EmailTransport` trait so the dispatcher
//! stays transport-agnostic; `EmailChannel` is the production implementation.

pub mod email;

use async_trait::async_trait;

use crate::error::DeliveryError;
use crate::types::EmailMessage;

/// Sends one email to one recipient through an external transport.
///
/// Implementations report failure per message; the dispatcher catches each
/// failure individually and never aborts the remaining sends.
#[async_trait]
pub trait EmailTransport: Send + Sync {
    /// Transport name for logging.
    fn name(&self) -> &str;

    /// Attempt delivery of a single message.
    async fn send(&self, message: &EmailMessage) -> Result<(), DeliveryError>;
}

pub use email::EmailChannel;
