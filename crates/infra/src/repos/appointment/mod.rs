mod inmemory;
mod postgres;

use barbershop_domain::{Appointment, ID};
pub use inmemory::InMemoryAppointmentRepo;
pub use postgres::PostgresAppointmentRepo;

#[async_trait::async_trait]
pub trait IAppointmentRepo: Send + Sync {
    async fn insert(&self, appointment: &Appointment) -> anyhow::Result<()>;
    async fn save(&self, appointment: &Appointment) -> anyhow::Result<()>;
    async fn find(&self, appointment_id: &ID) -> Option<Appointment>;
    /// Confirmed `Appointment`s of all barbers and clients starting
    /// within `[start, end]`
    async fn find_confirmed_in_range(&self, start: i64, end: i64)
        -> anyhow::Result<Vec<Appointment>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use barbershop_domain::AppointmentStatus;

    fn appointment(start_ts: i64, status: AppointmentStatus) -> Appointment {
        let mut appointment = Appointment::new(ID::new(), ID::new(), ID::new(), start_ts);
        appointment.status = status;
        appointment
    }

    #[tokio::test]
    async fn finds_only_confirmed_appointments_within_range() {
        let repo = InMemoryAppointmentRepo::new();
        let inside = appointment(100, AppointmentStatus::Confirmed);
        let lower_bound = appointment(0, AppointmentStatus::Confirmed);
        let upper_bound = appointment(1000, AppointmentStatus::Confirmed);
        let outside = appointment(1001, AppointmentStatus::Confirmed);
        let pending = appointment(100, AppointmentStatus::Pending);
        let cancelled = appointment(100, AppointmentStatus::Cancelled);
        for a in &[&inside, &lower_bound, &upper_bound, &outside, &pending, &cancelled] {
            repo.insert(a).await.unwrap();
        }

        let mut found = repo
            .find_confirmed_in_range(0, 1000)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.id)
            .collect::<Vec<_>>();
        found.sort();
        let mut expected = vec![inside.id, lower_bound.id, upper_bound.id];
        expected.sort();
        assert_eq!(found, expected);
    }

    #[tokio::test]
    async fn save_updates_the_stored_appointment() {
        let repo = InMemoryAppointmentRepo::new();
        let mut appointment = appointment(100, AppointmentStatus::Pending);
        repo.insert(&appointment).await.unwrap();

        appointment.status = AppointmentStatus::Confirmed;
        repo.save(&appointment).await.unwrap();
        let stored = repo.find(&appointment.id).await.expect("To find appointment");
        assert!(stored.is_confirmed());

        let unknown = Appointment::new(ID::new(), ID::new(), ID::new(), 0);
        assert!(repo.save(&unknown).await.is_err());
    }
}
