use crate::shared::entity::{Entity, ID};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }
}

impl Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            "completed" => Ok(Self::Completed),
            _ => Err(format!("Unknown appointment status: {}", s)),
        }
    }
}

/// An `Appointment` a client booked with a barber for one of the
/// barbershop services.
#[derive(Debug, Clone, PartialEq)]
pub struct Appointment {
    pub id: ID,
    /// The `User` who booked the appointment and who receives reminders
    pub client_id: ID,
    pub barber_id: ID,
    pub service_id: ID,
    /// Scheduled start of the appointment in millis
    pub start_ts: i64,
    pub status: AppointmentStatus,
}

impl Appointment {
    pub fn new(client_id: ID, barber_id: ID, service_id: ID, start_ts: i64) -> Self {
        Self {
            id: Default::default(),
            client_id,
            barber_id,
            service_id,
            start_ts,
            status: AppointmentStatus::Pending,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == AppointmentStatus::Confirmed
    }

    /// Millis left until the appointment starts, negative if it already started
    pub fn millis_until(&self, now: i64) -> i64 {
        self.start_ts - now
    }
}

impl Entity for Appointment {
    fn id(&self) -> &ID {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_its_column_value() {
        for status in [
            AppointmentStatus::Pending,
            AppointmentStatus::Confirmed,
            AppointmentStatus::Cancelled,
            AppointmentStatus::Completed,
        ] {
            assert_eq!(status.as_str().parse::<AppointmentStatus>(), Ok(status));
        }
        assert!("rescheduled".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn new_appointments_are_pending() {
        let appointment = Appointment::new(ID::new(), ID::new(), ID::new(), 0);
        assert!(!appointment.is_confirmed());
        assert_eq!(appointment.millis_until(-100), 100);
    }
}
