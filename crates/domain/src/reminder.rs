use crate::{appointment::Appointment, notification::NotificationType};
use serde::{Deserialize, Serialize};

pub const MILLIS_PER_HOUR: i64 = 1000 * 60 * 60;

/// The kinds of reminders a client receives before a confirmed `Appointment`.
///
/// Every kind owns a window of hours before the appointment. A periodic scan
/// selects an appointment for a kind while the time left until it starts is
/// inside that window, i.e. `lower < hours <= upper`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    /// Sent when the appointment is between 22 and 24 hours away
    DayBefore,
    /// Sent when the appointment is at most 2 hours away
    SameDay,
}

impl ReminderKind {
    pub const ALL: [ReminderKind; 2] = [ReminderKind::DayBefore, ReminderKind::SameDay];

    pub fn notification_type(&self) -> NotificationType {
        match self {
            Self::DayBefore => NotificationType::AppointmentReminder,
            Self::SameDay => NotificationType::AppointmentReminderSameDay,
        }
    }

    /// Exclusive lower and inclusive upper bound in hours
    pub fn window_hours(&self) -> (f64, f64) {
        match self {
            Self::DayBefore => (22.0, 24.0),
            Self::SameDay => (0.0, 2.0),
        }
    }

    /// Whether `appointment` is inside this reminder window at `now`.
    /// Appointments that already started never match.
    pub fn matches(&self, appointment: &Appointment, now: i64) -> bool {
        let millis_until = appointment.millis_until(now);
        if millis_until <= 0 {
            return false;
        }
        let hours_until = millis_until as f64 / MILLIS_PER_HOUR as f64;
        let (lower, upper) = self.window_hours();
        hours_until > lower && hours_until <= upper
    }

    /// All reminder kinds `appointment` currently qualifies for
    pub fn classify(appointment: &Appointment, now: i64) -> Vec<ReminderKind> {
        Self::ALL
            .iter()
            .copied()
            .filter(|kind| kind.matches(appointment, now))
            .collect()
    }
}
