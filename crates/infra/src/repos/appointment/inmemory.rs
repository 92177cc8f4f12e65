use super::IAppointmentRepo;
use crate::repos::shared::inmemory_repo::*;
use barbershop_domain::{Appointment, ID};

pub struct InMemoryAppointmentRepo {
    appointments: std::sync::Mutex<Vec<Appointment>>,
}

impl InMemoryAppointmentRepo {
    pub fn new() -> Self {
        Self {
            appointments: std::sync::Mutex::new(vec![]),
        }
    }
}

#[async_trait::async_trait]
impl IAppointmentRepo for InMemoryAppointmentRepo {
    async fn insert(&self, appointment: &Appointment) -> anyhow::Result<()> {
        insert(appointment, &self.appointments);
        Ok(())
    }

    async fn save(&self, appointment: &Appointment) -> anyhow::Result<()> {
        if save(appointment, &self.appointments) {
            Ok(())
        } else {
            Err(anyhow::anyhow!("Appointment {} not found", appointment.id))
        }
    }

    async fn find(&self, appointment_id: &ID) -> Option<Appointment> {
        find(appointment_id, &self.appointments)
    }

    async fn find_confirmed_in_range(
        &self,
        start: i64,
        end: i64,
    ) -> anyhow::Result<Vec<Appointment>> {
        Ok(find_by(&self.appointments, |a| {
            a.is_confirmed() && a.start_ts >= start && a.start_ts <= end
        }))
    }
}
