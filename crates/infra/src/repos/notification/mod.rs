mod inmemory;
mod postgres;

use barbershop_domain::{Notification, NotificationType, ID};
pub use inmemory::InMemoryNotificationRepo;
pub use postgres::PostgresNotificationRepo;

#[async_trait::async_trait]
pub trait INotificationRepo: Send + Sync {
    async fn insert(&self, notification: &Notification) -> anyhow::Result<()>;
    async fn find(&self, notification_id: &ID) -> Option<Notification>;
    async fn find_all(&self) -> anyhow::Result<Vec<Notification>>;
    /// Every `Notification` addressed to `user_id`, newest first
    async fn find_by_user(&self, user_id: &ID) -> anyhow::Result<Vec<Notification>>;
    /// Whether a `Notification` of the given type about `related_id` exists
    async fn exists_for(
        &self,
        notification_type: NotificationType,
        related_id: &ID,
    ) -> anyhow::Result<bool>;
}
