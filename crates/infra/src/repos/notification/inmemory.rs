use super::INotificationRepo;
use crate::repos::shared::inmemory_repo::*;
use barbershop_domain::{Notification, NotificationType, ID};

pub struct InMemoryNotificationRepo {
    notifications: std::sync::Mutex<Vec<Notification>>,
}

impl InMemoryNotificationRepo {
    pub fn new() -> Self {
        Self {
            notifications: std::sync::Mutex::new(vec![]),
        }
    }
}

#[async_trait::async_trait]
impl INotificationRepo for InMemoryNotificationRepo {
    async fn insert(&self, notification: &Notification) -> anyhow::Result<()> {
        insert(notification, &self.notifications);
        Ok(())
    }

    async fn find(&self, notification_id: &ID) -> Option<Notification> {
        find(notification_id, &self.notifications)
    }

    async fn find_all(&self) -> anyhow::Result<Vec<Notification>> {
        Ok(find_by(&self.notifications, |_| true))
    }

    async fn find_by_user(&self, user_id: &ID) -> anyhow::Result<Vec<Notification>> {
        let mut notifications = find_by(&self.notifications, |n| &n.user_id == user_id);
        notifications.sort_by(|a, b| b.created.cmp(&a.created));
        Ok(notifications)
    }

    async fn exists_for(
        &self,
        notification_type: NotificationType,
        related_id: &ID,
    ) -> anyhow::Result<bool> {
        Ok(any(&self.notifications, |n| {
            n.r#type == notification_type && n.related_id.as_ref() == Some(related_id)
        }))
    }
}
