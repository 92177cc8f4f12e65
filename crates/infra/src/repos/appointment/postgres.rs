use super::IAppointmentRepo;
use barbershop_domain::{Appointment, AppointmentStatus, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use std::convert::{TryFrom, TryInto};
use tracing::error;

pub struct PostgresAppointmentRepo {
    pool: PgPool,
}

impl PostgresAppointmentRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AppointmentRaw {
    appointment_uid: Uuid,
    client_uid: Uuid,
    barber_uid: Uuid,
    service_uid: Uuid,
    start_ts: i64,
    status: String,
}

impl TryFrom<AppointmentRaw> for Appointment {
    type Error = anyhow::Error;

    fn try_from(raw: AppointmentRaw) -> anyhow::Result<Self> {
        Ok(Self {
            id: raw.appointment_uid.into(),
            client_id: raw.client_uid.into(),
            barber_id: raw.barber_uid.into(),
            service_id: raw.service_uid.into(),
            start_ts: raw.start_ts,
            status: raw
                .status
                .parse::<AppointmentStatus>()
                .map_err(anyhow::Error::msg)?,
        })
    }
}

#[async_trait::async_trait]
impl IAppointmentRepo for PostgresAppointmentRepo {
    async fn insert(&self, appointment: &Appointment) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO appointments
            (appointment_uid, client_uid, barber_uid, service_uid, start_ts, status)
            VALUES($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(appointment.id.inner_ref())
        .bind(appointment.client_id.inner_ref())
        .bind(appointment.barber_id.inner_ref())
        .bind(appointment.service_id.inner_ref())
        .bind(appointment.start_ts)
        .bind(appointment.status.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn save(&self, appointment: &Appointment) -> anyhow::Result<()> {
        let res = sqlx::query(
            r#"
            UPDATE appointments
            SET client_uid = $2, barber_uid = $3, service_uid = $4, start_ts = $5, status = $6
            WHERE appointment_uid = $1
            "#,
        )
        .bind(appointment.id.inner_ref())
        .bind(appointment.client_id.inner_ref())
        .bind(appointment.barber_id.inner_ref())
        .bind(appointment.service_id.inner_ref())
        .bind(appointment.start_ts)
        .bind(appointment.status.as_str())
        .execute(&self.pool)
        .await?;
        if res.rows_affected() == 0 {
            return Err(anyhow::anyhow!("Appointment {} not found", appointment.id));
        }
        Ok(())
    }

    async fn find(&self, appointment_id: &ID) -> Option<Appointment> {
        let raw = sqlx::query_as::<_, AppointmentRaw>(
            r#"
            SELECT * FROM appointments AS a
            WHERE a.appointment_uid = $1
            "#,
        )
        .bind(appointment_id.inner_ref())
        .fetch_optional(&self.pool)
        .await;

        match raw {
            Ok(Some(raw)) => match raw.try_into() {
                Ok(appointment) => Some(appointment),
                Err(e) => {
                    error!("Stored appointment {} is invalid: {:?}", appointment_id, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                error!("Unable to find appointment {}: {:?}", appointment_id, e);
                None
            }
        }
    }

    async fn find_confirmed_in_range(
        &self,
        start: i64,
        end: i64,
    ) -> anyhow::Result<Vec<Appointment>> {
        sqlx::query_as::<_, AppointmentRaw>(
            r#"
            SELECT * FROM appointments AS a
            WHERE a.status = $1 AND a.start_ts >= $2 AND a.start_ts <= $3
            "#,
        )
        .bind(AppointmentStatus::Confirmed.as_str())
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Appointment::try_from)
        .collect()
    }
}
