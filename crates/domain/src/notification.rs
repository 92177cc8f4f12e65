use crate::shared::entity::{Entity, ID};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    AppointmentCreated,
    AppointmentConfirmed,
    AppointmentCancelled,
    AppointmentCompleted,
    AppointmentReminder,
    AppointmentReminderSameDay,
    NewMessage,
    System,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AppointmentCreated => "appointment_created",
            Self::AppointmentConfirmed => "appointment_confirmed",
            Self::AppointmentCancelled => "appointment_cancelled",
            Self::AppointmentCompleted => "appointment_completed",
            Self::AppointmentReminder => "appointment_reminder",
            Self::AppointmentReminderSameDay => "appointment_reminder_same_day",
            Self::NewMessage => "new_message",
            Self::System => "system",
        }
    }
}

impl Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "appointment_created" => Ok(Self::AppointmentCreated),
            "appointment_confirmed" => Ok(Self::AppointmentConfirmed),
            "appointment_cancelled" => Ok(Self::AppointmentCancelled),
            "appointment_completed" => Ok(Self::AppointmentCompleted),
            "appointment_reminder" => Ok(Self::AppointmentReminder),
            "appointment_reminder_same_day" => Ok(Self::AppointmentReminderSameDay),
            "new_message" => Ok(Self::NewMessage),
            "system" => Ok(Self::System),
            _ => Err(format!("Unknown notification type: {}", s)),
        }
    }
}

/// A `Notification` shown to a `User` in the app and pushed over
/// the realtime channel when it is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: ID,
    /// The recipient
    pub user_id: ID,
    #[serde(rename = "type")]
    pub r#type: NotificationType,
    pub title: String,
    pub message: String,
    pub read: bool,
    /// The entity that triggered this `Notification`. For reminders this
    /// is the `Appointment` the reminder is about.
    pub related_id: Option<ID>,
    pub created: i64,
}

impl Notification {
    pub fn new(
        user_id: ID,
        r#type: NotificationType,
        title: String,
        message: String,
        related_id: Option<ID>,
        created: i64,
    ) -> Self {
        Self {
            id: Default::default(),
            user_id,
            r#type,
            title,
            message,
            read: false,
            related_id,
            created,
        }
    }
}

impl Entity for Notification {
    fn id(&self) -> &ID {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reminder_types_use_their_column_values() {
        assert_eq!(
            NotificationType::AppointmentReminder.as_str(),
            "appointment_reminder"
        );
        assert_eq!(
            "appointment_reminder_same_day".parse::<NotificationType>(),
            Ok(NotificationType::AppointmentReminderSameDay)
        );
    }

    #[test]
    fn new_notifications_are_unread() {
        let notification = Notification::new(
            ID::new(),
            NotificationType::System,
            "Welcome".into(),
            "Hello".into(),
            None,
            0,
        );
        assert!(!notification.read);
    }
}
