mod get_reminders_status;
pub mod send_appointment_reminders;

use actix_web::web;
use get_reminders_status::get_reminders_status_controller;

/// Tag of every cache entry derived from the appointments table
pub const APPOINTMENTS_CACHE_TAG: &str = "appointments";

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/reminders/status",
        web::get().to(get_reminders_status_controller),
    );
}
