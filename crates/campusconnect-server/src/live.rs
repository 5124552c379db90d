//! Realtime announcement feed over WebSocket.
//!
//! A single broadcast channel fans announcements out to every connected
//! client. Clients are read-only; inbound messages other than close are
//! ignored. Slow clients skip announcements instead of blocking dispatch.

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use tokio::sync::broadcast;

use campusconnect_notifications::{Announcement, RealtimeBroadcast};

use crate::server::AppState;

/// Buffered announcements per subscriber before lagging clients skip ahead.
const DEFAULT_BUFFER_SIZE: usize = 256;

/// Broadcast hub for live announcements.
///
/// Cloneable and shared across the application; `broadcast` never blocks and
/// never fails, zero connected clients is a normal state.
#[derive(Clone)]
pub struct LiveFeed {
    sender: broadcast::Sender<String>,
}

impl LiveFeed {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_SIZE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.sender.subscribe()
    }

    pub fn connection_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for LiveFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl RealtimeBroadcast for LiveFeed {
    fn broadcast(&self, announcement: &Announcement) -> usize {
        match serde_json::to_string(announcement) {
            Ok(text) => self.sender.send(text).unwrap_or_default(),
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize announcement");
                0
            }
        }
    }
}

/// `GET /live` upgrade handler.
pub async fn live_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let receiver = state.live.subscribe();
    ws.on_upgrade(move |socket| handle_socket(socket, receiver))
}

async fn handle_socket(mut socket: WebSocket, mut receiver: broadcast::Receiver<String>) {
    tracing::debug!("live feed client connected");
    loop {
        tokio::select! {
            announcement = receiver.recv() => match announcement {
                Ok(text) => {
                    if socket.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "live feed client lagged, announcements skipped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                // Clients are read-only
                Some(Ok(_)) => {}
            },
        }
    }
    tracing::debug!("live feed client disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;
    use campusconnect_core::NewEvent;

    fn announcement() -> Announcement {
        let event = NewEvent {
            title: "Hack Night".into(),
            date: "2024-05-01".into(),
            time: "18:00".into(),
            location: "Lab 3".into(),
            ..Default::default()
        }
        .into_event();
        Announcement::event_added(&event)
    }

    #[tokio::test]
    async fn test_broadcast_without_subscribers_reaches_zero() {
        let feed = LiveFeed::new();
        assert_eq!(feed.broadcast(&announcement()), 0);
    }

    #[tokio::test]
    async fn test_subscriber_receives_serialized_announcement() {
        let feed = LiveFeed::new();
        let mut rx = feed.subscribe();

        assert_eq!(feed.broadcast(&announcement()), 1);

        let text = rx.recv().await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["name"], "event-added");
        assert!(
            value["payload"]["message"]
                .as_str()
                .unwrap()
                .contains("Hack Night")
        );
    }

    #[tokio::test]
    async fn test_connection_count_tracks_receivers() {
        let feed = LiveFeed::new();
        assert_eq!(feed.connection_count(), 0);
        let _rx = feed.subscribe();
        assert_eq!(feed.connection_count(), 1);
    }
}
