use barbershop_domain::{Notification, ID};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

/// A `Notification` that was just created, addressed to `user_id`.
/// This is what gets pushed to the connected clients of that user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEvent {
    pub user_id: ID,
    pub notification: Notification,
}

impl NotificationEvent {
    pub fn new(notification: Notification) -> Self {
        Self {
            user_id: notification.user_id.clone(),
            notification,
        }
    }

    /// Wire payload for realtime subscribers
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Realtime channel for pushing `Notification`s to users
#[async_trait::async_trait]
pub trait INotifier: Send + Sync {
    async fn publish(&self, event: NotificationEvent) -> anyhow::Result<()>;
}

/// In-process pub/sub on top of a broadcast channel. The websocket layer
/// subscribes and forwards the events addressed to its connected user.
pub struct BroadcastNotifier {
    sender: broadcast::Sender<NotificationEvent>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait::async_trait]
impl INotifier for BroadcastNotifier {
    async fn publish(&self, event: NotificationEvent) -> anyhow::Result<()> {
        // Sending only fails when nobody is listening, which is fine
        match self.sender.send(event) {
            Ok(receivers) => debug!("Notification published to {} subscribers", receivers),
            Err(_) => debug!("Notification published without any subscribers"),
        }
        Ok(())
    }
}
