use crate::job_schedulers::ReminderScheduler;
use actix_web::{web, HttpResponse};
use barbershop_api_structs::{dtos::ReminderRunDTO, get_reminders_status::APIResponse};

pub async fn get_reminders_status_controller(
    scheduler: web::Data<ReminderScheduler>,
) -> HttpResponse {
    let last_run = scheduler.last_run().map(|run| ReminderRunDTO {
        finished_at: run.finished_at,
        day_before_sent: run.report.day_before.sent,
        same_day_sent: run.report.same_day.sent,
        failed: run.report.total_failed(),
    });

    HttpResponse::Ok().json(APIResponse {
        running: scheduler.is_running(),
        interval_secs: scheduler.interval().as_secs(),
        last_run,
    })
}
