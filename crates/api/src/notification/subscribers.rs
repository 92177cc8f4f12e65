use super::{create_reminder_notification::CreateReminderNotificationUseCase, NOTIFICATIONS_CACHE_TAG};
use crate::shared::usecase::Subscriber;
use barbershop_domain::Notification;
use barbershop_infra::{BarbershopContext, NotificationEvent};
use tracing::error;

/// Drops every cached view of the notifications table, e.g. the sets of
/// appointments that already got a reminder, now that it changed.
pub struct InvalidateNotificationsCache;

#[async_trait::async_trait]
impl Subscriber<CreateReminderNotificationUseCase> for InvalidateNotificationsCache {
    async fn notify(&self, _e: &Notification, ctx: &BarbershopContext) {
        ctx.cache.invalidate_by_tag(NOTIFICATIONS_CACHE_TAG);
    }
}

/// Pushes the new `Notification` to the recipient over the realtime channel.
/// The notification is already stored, so a failed push is only logged.
pub struct PublishNotification;

#[async_trait::async_trait]
impl Subscriber<CreateReminderNotificationUseCase> for PublishNotification {
    async fn notify(&self, notification: &Notification, ctx: &BarbershopContext) {
        if let Err(e) = ctx
            .notifier
            .publish(NotificationEvent::new(notification.clone()))
            .await
        {
            error!(
                "Unable to publish notification {} to user {}. Err: {:?}",
                notification.id, notification.user_id, e
            );
        }
    }
}
