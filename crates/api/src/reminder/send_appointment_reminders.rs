use super::APPOINTMENTS_CACHE_TAG;
use crate::{
    notification::{
        create_reminder_notification::CreateReminderNotificationUseCase, NOTIFICATIONS_CACHE_TAG,
    },
    shared::usecase::{execute, UseCase},
};
use barbershop_domain::{Appointment, NotificationType, ReminderKind, ID};
use barbershop_infra::BarbershopContext;
use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use futures::{stream, StreamExt};
use std::{
    collections::{HashMap, HashSet},
    time::Duration,
};
use thiserror::Error;
use tracing::error;

const MILLIS_PER_DAY: i64 = 1000 * 60 * 60 * 24;
/// Number of days ahead, starting today, that are scanned for upcoming appointments
const SCAN_WINDOW_DAYS: i64 = 7;
const APPOINTMENTS_CACHE_TTL: Duration = Duration::from_secs(2 * 60);
const SENT_REMINDERS_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Scans the confirmed `Appointment`s of the coming days and creates the
/// reminders whose window was entered and that were not sent before.
///
/// Each reminder is dispatched on its own, a failure for one appointment is
/// logged and counted without affecting the others.
#[derive(Debug)]
pub struct SendAppointmentRemindersUseCase {}

#[derive(Debug, Error)]
pub enum UseCaseError {
    #[error("Unable to read the appointments or notifications storage")]
    StorageError,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReminderBucketReport {
    /// Appointments inside the reminder window
    pub candidates: usize,
    /// Candidates that already had this reminder
    pub already_sent: usize,
    pub sent: usize,
    pub failed: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RemindersReport {
    pub day_before: ReminderBucketReport,
    pub same_day: ReminderBucketReport,
}

impl RemindersReport {
    pub fn bucket(&self, kind: ReminderKind) -> &ReminderBucketReport {
        match kind {
            ReminderKind::DayBefore => &self.day_before,
            ReminderKind::SameDay => &self.same_day,
        }
    }

    fn bucket_mut(&mut self, kind: ReminderKind) -> &mut ReminderBucketReport {
        match kind {
            ReminderKind::DayBefore => &mut self.day_before,
            ReminderKind::SameDay => &mut self.same_day,
        }
    }

    pub fn total_sent(&self) -> usize {
        self.day_before.sent + self.same_day.sent
    }

    pub fn total_failed(&self) -> usize {
        self.day_before.failed + self.same_day.failed
    }
}

/// Start of today in `tz` and the end of the scan window, both in millis
pub fn scan_window(now: i64, tz: &Tz) -> (i64, i64) {
    let start = DateTime::<Utc>::from_timestamp_millis(now)
        .and_then(|now| now.with_timezone(tz).date_naive().and_hms_opt(0, 0, 0))
        .and_then(|midnight| tz.from_local_datetime(&midnight).earliest())
        .map(|start| start.timestamp_millis())
        // Midnight can fall into a DST gap, use the UTC day then
        .unwrap_or_else(|| now - now.rem_euclid(MILLIS_PER_DAY));
    (start, start + SCAN_WINDOW_DAYS * MILLIS_PER_DAY)
}

async fn get_confirmed_appointments(
    start: i64,
    end: i64,
    ctx: &BarbershopContext,
) -> Result<Vec<Appointment>, UseCaseError> {
    let key = format!("appointments:confirmed:{}:{}", start, end);
    ctx.cache
        .get_or_set(
            &key,
            move || ctx.repos.appointments.find_confirmed_in_range(start, end),
            APPOINTMENTS_CACHE_TTL,
            &[APPOINTMENTS_CACHE_TAG],
        )
        .await
        .map_err(|e| {
            error!("Unable to fetch confirmed appointments. Err: {:?}", e);
            UseCaseError::StorageError
        })
}

/// Ids of the appointments that already have a notification of `notification_type`
async fn get_reminded_appointment_ids(
    notification_type: NotificationType,
    ctx: &BarbershopContext,
) -> Result<HashSet<ID>, UseCaseError> {
    let key = format!("notifications:sent:{}", notification_type);
    ctx.cache
        .get_or_set(
            &key,
            move || async move {
                let notifications = ctx.repos.notifications.find_all().await?;
                Ok::<_, anyhow::Error>(
                    notifications
                        .into_iter()
                        .filter(|n| n.r#type == notification_type)
                        .filter_map(|n| n.related_id)
                        .collect::<HashSet<_>>(),
                )
            },
            SENT_REMINDERS_CACHE_TTL,
            &[NOTIFICATIONS_CACHE_TAG],
        )
        .await
        .map_err(|e| {
            error!("Unable to fetch sent notifications. Err: {:?}", e);
            UseCaseError::StorageError
        })
}

#[derive(Debug, PartialEq)]
enum DispatchOutcome {
    Sent,
    AlreadySent,
    Failed,
}

async fn send_reminder(
    kind: ReminderKind,
    appointment: Appointment,
    ctx: &BarbershopContext,
) -> DispatchOutcome {
    // The cached view of sent reminders might be stale, the store decides
    match ctx
        .repos
        .notifications
        .exists_for(kind.notification_type(), &appointment.id)
        .await
    {
        Ok(true) => return DispatchOutcome::AlreadySent,
        Ok(false) => (),
        Err(e) => {
            error!(
                "Unable to check {:?} reminder for appointment {}. Err: {:?}",
                kind, appointment.id, e
            );
            return DispatchOutcome::Failed;
        }
    }

    let appointment_id = appointment.id.clone();
    let usecase = CreateReminderNotificationUseCase {
        user_id: appointment.client_id.clone(),
        appointment,
        kind,
    };
    match execute(usecase, ctx).await {
        Ok(_) => DispatchOutcome::Sent,
        Err(e) => {
            error!(
                "Unable to send {:?} reminder for appointment {}. Err: {:?}",
                kind, appointment_id, e
            );
            DispatchOutcome::Failed
        }
    }
}

#[async_trait::async_trait]
impl UseCase for SendAppointmentRemindersUseCase {
    type Response = RemindersReport;

    type Error = UseCaseError;

    const NAME: &'static str = "SendAppointmentReminders";

    async fn execute(&mut self, ctx: &BarbershopContext) -> Result<Self::Response, Self::Error> {
        let now = ctx.sys.get_timestamp_millis();
        let (start, end) = scan_window(now, &ctx.config.timezone);
        let appointments = get_confirmed_appointments(start, end, ctx).await?;

        let mut buckets: HashMap<ReminderKind, Vec<&Appointment>> = HashMap::new();
        for appointment in appointments.iter().filter(|a| a.is_confirmed()) {
            for kind in ReminderKind::classify(appointment, now) {
                buckets.entry(kind).or_default().push(appointment);
            }
        }

        let mut report = RemindersReport::default();
        let mut dispatches = Vec::new();
        for kind in ReminderKind::ALL.iter().copied() {
            let candidates = match buckets.remove(&kind) {
                Some(candidates) => candidates,
                None => continue,
            };

            let reminded = get_reminded_appointment_ids(kind.notification_type(), ctx).await?;
            let bucket = report.bucket_mut(kind);
            bucket.candidates = candidates.len();
            for appointment in candidates {
                if reminded.contains(&appointment.id) {
                    bucket.already_sent += 1;
                } else {
                    dispatches.push((kind, appointment.clone()));
                }
            }
        }

        let outcomes = stream::iter(dispatches)
            .map(|(kind, appointment)| async move {
                (kind, send_reminder(kind, appointment, ctx).await)
            })
            .buffer_unordered(ctx.config.reminder_dispatch_concurrency.max(1))
            .collect::<Vec<_>>()
            .await;

        for (kind, outcome) in outcomes {
            let bucket = report.bucket_mut(kind);
            match outcome {
                DispatchOutcome::Sent => bucket.sent += 1,
                DispatchOutcome::AlreadySent => bucket.already_sent += 1,
                DispatchOutcome::Failed => bucket.failed += 1,
            }
        }

        Ok(report)
    }
}
