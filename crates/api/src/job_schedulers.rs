use crate::{
    reminder::send_appointment_reminders::{RemindersReport, SendAppointmentRemindersUseCase},
    shared::usecase::execute,
};
use barbershop_infra::BarbershopContext;
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};
use tokio::time::{interval_at, timeout, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Result of a finished reminders run
#[derive(Debug, Clone, Copy)]
pub struct ReminderRun {
    /// Timestamp in millis at which the run finished
    pub finished_at: i64,
    pub report: RemindersReport,
}

/// Clears the in flight flag also when a run is dropped halfway
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Periodically sends the reminders for upcoming appointments.
///
/// Runs never overlap: a run that is due while the previous one is still
/// executing is skipped. Stopping the scheduler lets an in flight run finish
/// but no new run is started.
pub struct ReminderScheduler {
    ctx: BarbershopContext,
    job: Mutex<Option<CancellationToken>>,
    in_flight: AtomicBool,
    last_run: Mutex<Option<ReminderRun>>,
}

impl ReminderScheduler {
    pub fn new(ctx: BarbershopContext) -> Self {
        Self {
            ctx,
            job: Mutex::new(None),
            in_flight: AtomicBool::new(false),
            last_run: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.ctx.config.reminder_interval
    }

    pub fn is_running(&self) -> bool {
        self.job.lock().unwrap().is_some()
    }

    pub fn last_run(&self) -> Option<ReminderRun> {
        *self.last_run.lock().unwrap()
    }

    /// Runs once right away and then every `interval`. Starting an already
    /// running scheduler restarts its timer, a `stop` during the first run
    /// keeps the timer from being registered.
    pub async fn start(self: &Arc<Self>) {
        let cancel = CancellationToken::new();
        if let Some(previous) = self.job.lock().unwrap().replace(cancel.clone()) {
            previous.cancel();
        }

        self.run_once().await;
        // Stopped, or replaced by another start, while running
        if cancel.is_cancelled() {
            return;
        }

        let period = self.interval();
        let scheduler = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => {
                        scheduler.run_once().await;
                    }
                }
            }
            info!("Appointment reminders job stopped");
        });
        info!(
            "Appointment reminders job started, running every {:?}",
            period
        );
    }

    /// Returns whether the scheduler was running
    pub fn stop(&self) -> bool {
        match self.job.lock().unwrap().take() {
            Some(cancel) => {
                cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Executes a single reminders run. Errors are logged and never
    /// propagated, `None` is returned when the run failed or was skipped.
    pub async fn run_once(&self) -> Option<RemindersReport> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            warn!("Previous appointment reminders run is still in flight, skipping this one");
            return None;
        }
        let _in_flight = InFlight(&self.in_flight);

        let started = Instant::now();
        let run_timeout = self.ctx.config.reminder_run_timeout;
        let usecase = SendAppointmentRemindersUseCase {};
        let report = match timeout(run_timeout, execute(usecase, &self.ctx)).await {
            Ok(Ok(report)) => report,
            Ok(Err(e)) => {
                error!("Appointment reminders run failed. Err: {:?}", e);
                return None;
            }
            Err(_) => {
                error!("Appointment reminders run timed out after {:?}", run_timeout);
                return None;
            }
        };

        if report.total_sent() > 0 {
            info!(
                day_before_sent = report.day_before.sent,
                same_day_sent = report.same_day.sent,
                failed = report.total_failed(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Appointment reminders sent"
            );
        }

        *self.last_run.lock().unwrap() = Some(ReminderRun {
            finished_at: self.ctx.sys.get_timestamp_millis(),
            report,
        });
        Some(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reminder::APPOINTMENTS_CACHE_TAG;
    use barbershop_domain::{Appointment, AppointmentStatus, ID, MILLIS_PER_HOUR};
    use barbershop_infra::{IAppointmentRepo, ManualSys};
    use std::sync::atomic::AtomicUsize;

    const NOW: i64 = 1613865600000;

    fn setup() -> BarbershopContext {
        let mut ctx = BarbershopContext::create_inmemory_with_sys(Arc::new(ManualSys::new(NOW)));
        ctx.config.reminder_interval = Duration::from_millis(50);
        ctx
    }

    async fn insert_confirmed_appointment(ctx: &BarbershopContext, millis_from_now: i64) {
        let mut appointment =
            Appointment::new(ID::new(), ID::new(), ID::new(), NOW + millis_from_now);
        appointment.status = AppointmentStatus::Confirmed;
        ctx.repos.appointments.insert(&appointment).await.unwrap();
        ctx.cache.invalidate_by_tag(APPOINTMENTS_CACHE_TAG);
    }

    async fn notifications_count(ctx: &BarbershopContext) -> usize {
        ctx.repos.notifications.find_all().await.unwrap().len()
    }

    #[tokio::test]
    async fn runs_immediately_then_periodically_until_stopped() {
        let ctx = setup();
        insert_confirmed_appointment(&ctx, 23 * MILLIS_PER_HOUR).await;
        let scheduler = Arc::new(ReminderScheduler::new(ctx.clone()));
        assert!(!scheduler.is_running());

        scheduler.start().await;
        assert!(scheduler.is_running());
        assert_eq!(notifications_count(&ctx).await, 1);
        let first_run = scheduler.last_run().expect("To have run on start");
        assert_eq!(first_run.report.day_before.sent, 1);

        insert_confirmed_appointment(&ctx, MILLIS_PER_HOUR).await;
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(notifications_count(&ctx).await, 2);

        assert!(scheduler.stop());
        assert!(!scheduler.is_running());
        // Let a tick that was already executing finish
        tokio::time::sleep(Duration::from_millis(100)).await;
        insert_confirmed_appointment(&ctx, MILLIS_PER_HOUR).await;
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(notifications_count(&ctx).await, 2);
        assert!(!scheduler.stop());
    }

    #[tokio::test]
    async fn starting_twice_keeps_a_single_job() {
        let ctx = setup();
        let scheduler = Arc::new(ReminderScheduler::new(ctx));
        scheduler.start().await;
        scheduler.start().await;
        assert!(scheduler.is_running());
        assert!(scheduler.stop());
        assert!(!scheduler.is_running());
    }

    #[tokio::test]
    async fn skips_a_run_while_another_is_in_flight() {
        let ctx = setup();
        insert_confirmed_appointment(&ctx, 23 * MILLIS_PER_HOUR).await;
        let scheduler = ReminderScheduler::new(ctx.clone());

        scheduler.in_flight.store(true, Ordering::SeqCst);
        assert!(scheduler.run_once().await.is_none());
        assert_eq!(notifications_count(&ctx).await, 0);

        scheduler.in_flight.store(false, Ordering::SeqCst);
        let report = scheduler.run_once().await.expect("To run");
        assert_eq!(report.total_sent(), 1);
        assert!(!scheduler.in_flight.load(Ordering::SeqCst));
    }

    struct SlowAppointmentRepo {
        delay: Duration,
        scans: AtomicUsize,
    }

    impl SlowAppointmentRepo {
        fn new(delay: Duration) -> Self {
            Self {
                delay,
                scans: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl IAppointmentRepo for SlowAppointmentRepo {
        async fn insert(&self, _appointment: &Appointment) -> anyhow::Result<()> {
            Ok(())
        }

        async fn save(&self, _appointment: &Appointment) -> anyhow::Result<()> {
            Ok(())
        }

        async fn find(&self, _appointment_id: &ID) -> Option<Appointment> {
            None
        }

        async fn find_confirmed_in_range(
            &self,
            _start: i64,
            _end: i64,
        ) -> anyhow::Result<Vec<Appointment>> {
            self.scans.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn abandons_runs_that_take_too_long() {
        let mut ctx = setup();
        ctx.config.reminder_run_timeout = Duration::from_millis(50);
        ctx.repos.appointments = Arc::new(SlowAppointmentRepo::new(Duration::from_secs(5)));
        let scheduler = ReminderScheduler::new(ctx);

        assert!(scheduler.run_once().await.is_none());
        assert!(scheduler.last_run().is_none());
        // The next run is not blocked by the abandoned one
        assert!(!scheduler.in_flight.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn stop_during_the_first_run_keeps_the_scheduler_stopped() {
        let mut ctx = setup();
        let repo = Arc::new(SlowAppointmentRepo::new(Duration::from_millis(200)));
        ctx.repos.appointments = repo.clone();
        let scheduler = Arc::new(ReminderScheduler::new(ctx));

        let starting = {
            let scheduler = scheduler.clone();
            tokio::spawn(async move { scheduler.start().await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(scheduler.is_running());
        assert!(scheduler.stop());

        starting.await.unwrap();
        assert!(!scheduler.is_running());
        // Ticks every 50ms would have scanned again by now
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(repo.scans.load(Ordering::SeqCst), 1);
    }
}
