//! Realtime broadcast seam.
//!
//! The concrete implementation (a WebSocket registry) lives in the server
//! crate; the dispatcher only depends on this trait.

use crate::types::Announcement;

/// Broadcasts an announcement to every currently-connected client.
///
/// Fire-and-forget: the call must not suspend, there is no delivery
/// confirmation and no retry, and clients that connect later never see
/// missed broadcasts. The return value is the number of receivers at the
/// moment of the call, purely informational.
pub trait RealtimeBroadcast: Send + Sync {
    fn broadcast(&self, announcement: &Announcement) -> usize;
}

/// No-op broadcast for deployments without a realtime endpoint and for tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBroadcast;

impl RealtimeBroadcast for NullBroadcast {
    fn broadcast(&self, _announcement: &Announcement) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time test that the trait is object-safe
    fn _assert_object_safe(_: &dyn RealtimeBroadcast) {}

    #[test]
    fn test_null_broadcast_reaches_nobody() {
        let announcement = Announcement {
            name: "event-added".into(),
            payload: serde_json::json!({}),
        };
        assert_eq!(NullBroadcast.broadcast(&announcement), 0);
    }
}
