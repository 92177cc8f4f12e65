use super::subscribers::{InvalidateNotificationsCache, PublishNotification};
use crate::shared::usecase::{Subscriber, UseCase};
use barbershop_domain::{Appointment, Notification, ReminderKind, ID};
use barbershop_infra::BarbershopContext;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use thiserror::Error;

/// Creates the reminder `Notification` of `kind` for an upcoming `Appointment`.
///
/// Always creates a new notification, making sure the same reminder is not
/// created twice is up to the caller.
#[derive(Debug)]
pub struct CreateReminderNotificationUseCase {
    /// The recipient
    pub user_id: ID,
    pub appointment: Appointment,
    pub kind: ReminderKind,
}

#[derive(Debug, Error)]
pub enum UseCaseError {
    #[error("Unable to store notification")]
    StorageError,
}

fn format_start(start_ts: i64, tz: &Tz, format: &str) -> String {
    match DateTime::<Utc>::from_timestamp_millis(start_ts) {
        Some(start) => start.with_timezone(tz).format(format).to_string(),
        None => start_ts.to_string(),
    }
}

/// Title and message of a reminder, times are shown in the barbershop timezone
fn render_reminder(kind: ReminderKind, appointment: &Appointment, tz: &Tz) -> (String, String) {
    let time = format_start(appointment.start_ts, tz, "%H:%M");
    match kind {
        ReminderKind::DayBefore => (
            "Appointment reminder".into(),
            format!(
                "You have an appointment on {} at {}. See you soon!",
                format_start(appointment.start_ts, tz, "%A %d %B"),
                time
            ),
        ),
        ReminderKind::SameDay => (
            "Your appointment is coming up".into(),
            format!("Your appointment today starts at {}.", time),
        ),
    }
}

#[async_trait::async_trait]
impl UseCase for CreateReminderNotificationUseCase {
    type Response = Notification;

    type Error = UseCaseError;

    const NAME: &'static str = "CreateReminderNotification";

    async fn execute(&mut self, ctx: &BarbershopContext) -> Result<Self::Response, Self::Error> {
        let (title, message) = render_reminder(self.kind, &self.appointment, &ctx.config.timezone);
        let notification = Notification::new(
            self.user_id.clone(),
            self.kind.notification_type(),
            title,
            message,
            Some(self.appointment.id.clone()),
            ctx.sys.get_timestamp_millis(),
        );

        ctx.repos
            .notifications
            .insert(&notification)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        Ok(notification)
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![
            Box::new(InvalidateNotificationsCache),
            Box::new(PublishNotification),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::usecase::execute;
    use barbershop_domain::{AppointmentStatus, NotificationType};
    use barbershop_infra::{BroadcastNotifier, ManualSys};
    use std::{sync::Arc, time::Duration};

    // Sun Feb 21 2021 00:00:00 UTC
    const NOW: i64 = 1613865600000;
    const HOUR: i64 = 1000 * 60 * 60;

    fn confirmed_appointment(start_ts: i64) -> Appointment {
        let mut appointment = Appointment::new(ID::new(), ID::new(), ID::new(), start_ts);
        appointment.status = AppointmentStatus::Confirmed;
        appointment
    }

    #[test]
    fn renders_reminders_in_the_barbershop_timezone() {
        let appointment = confirmed_appointment(NOW + 23 * HOUR);
        let (title, message) =
            render_reminder(ReminderKind::DayBefore, &appointment, &chrono_tz::Europe::Oslo);
        assert_eq!(title, "Appointment reminder");
        assert_eq!(
            message,
            "You have an appointment on Monday 22 February at 00:00. See you soon!"
        );

        let appointment = confirmed_appointment(NOW + HOUR + 30 * 60 * 1000);
        let (_, message) = render_reminder(ReminderKind::SameDay, &appointment, &Tz::UTC);
        assert_eq!(message, "Your appointment today starts at 01:30.");
    }

    #[tokio::test]
    async fn stores_publishes_and_invalidates_notification_caches() {
        let mut ctx = BarbershopContext::create_inmemory_with_sys(Arc::new(ManualSys::new(NOW)));
        let notifier = Arc::new(BroadcastNotifier::default());
        ctx.notifier = notifier.clone();
        let mut receiver = notifier.subscribe();
        ctx.cache
            .set("notifications:sent:appointment_reminder", 1_u32, Duration::from_secs(60), &["notifications"]);

        let appointment = confirmed_appointment(NOW + 23 * HOUR);
        let usecase = CreateReminderNotificationUseCase {
            user_id: appointment.client_id.clone(),
            appointment: appointment.clone(),
            kind: ReminderKind::DayBefore,
        };
        let notification = execute(usecase, &ctx).await.expect("To create notification");

        assert_eq!(notification.user_id, appointment.client_id);
        assert_eq!(notification.r#type, NotificationType::AppointmentReminder);
        assert_eq!(notification.related_id, Some(appointment.id.clone()));
        assert_eq!(notification.created, NOW);
        assert!(!notification.read);

        assert!(ctx
            .repos
            .notifications
            .exists_for(NotificationType::AppointmentReminder, &appointment.id)
            .await
            .unwrap());
        assert!(ctx
            .cache
            .get::<u32>("notifications:sent:appointment_reminder")
            .is_none());
        let event = receiver.recv().await.expect("To receive published notification");
        assert_eq!(event.notification, notification);
    }
}
