mod helpers;

use barbershop_api_structs::{get_health, get_reminders_status};
use barbershop_domain::{Appointment, AppointmentStatus, NotificationType, ID};
use barbershop_infra::BarbershopContext;
use helpers::setup::{spawn_app, spawn_app_with_context};

const HOUR: i64 = 1000 * 60 * 60;

fn confirmed_appointment(start_ts: i64) -> Appointment {
    let mut appointment = Appointment::new(ID::new(), ID::new(), ID::new(), start_ts);
    appointment.status = AppointmentStatus::Confirmed;
    appointment
}

#[actix_web::main]
#[test]
async fn test_status_ok() {
    let app = spawn_app().await;
    let res = reqwest::get(format!("{}/", app.address))
        .await
        .expect("Expected status request to succeed");
    assert!(res.status().is_success());

    let body = res
        .json::<get_health::APIResponse>()
        .await
        .expect("Expected health response");
    assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
}

#[actix_web::main]
#[test]
async fn test_reminders_status_after_start() {
    let app = spawn_app().await;
    let res = reqwest::get(format!("{}/reminders/status", app.address))
        .await
        .expect("Expected reminders status request to succeed");
    assert!(res.status().is_success());

    let body = res
        .json::<get_reminders_status::APIResponse>()
        .await
        .expect("Expected reminders status response");
    assert!(body.running);
    assert_eq!(body.interval_secs, app.ctx.config.reminder_interval.as_secs());
    // The first scan runs while the application is built
    let last_run = body.last_run.expect("Expected a finished reminders run");
    assert_eq!(last_run.day_before_sent, 0);
    assert_eq!(last_run.same_day_sent, 0);
    assert_eq!(last_run.failed, 0);
}

#[actix_web::main]
#[test]
async fn test_reminders_are_sent_on_startup() {
    let ctx = BarbershopContext::create_inmemory();
    let now = ctx.sys.get_timestamp_millis();
    let tomorrow = confirmed_appointment(now + 23 * HOUR);
    let soon = confirmed_appointment(now + HOUR);
    let mut not_confirmed = confirmed_appointment(now + HOUR);
    not_confirmed.status = AppointmentStatus::Pending;
    for appointment in &[&tomorrow, &soon, &not_confirmed] {
        ctx.repos.appointments.insert(appointment).await.unwrap();
    }

    let app = spawn_app_with_context(ctx).await;

    let notifications = app.ctx.repos.notifications.find_all().await.unwrap();
    assert_eq!(notifications.len(), 2);
    let day_before = notifications
        .iter()
        .find(|n| n.r#type == NotificationType::AppointmentReminder)
        .expect("Expected a day before reminder");
    assert_eq!(day_before.related_id, Some(tomorrow.id.clone()));
    assert_eq!(day_before.user_id, tomorrow.client_id);
    let same_day = notifications
        .iter()
        .find(|n| n.r#type == NotificationType::AppointmentReminderSameDay)
        .expect("Expected a same day reminder");
    assert_eq!(same_day.related_id, Some(soon.id.clone()));

    let body = reqwest::get(format!("{}/reminders/status", app.address))
        .await
        .unwrap()
        .json::<get_reminders_status::APIResponse>()
        .await
        .unwrap();
    let last_run = body.last_run.expect("Expected a finished reminders run");
    assert_eq!(last_run.day_before_sent, 1);
    assert_eq!(last_run.same_day_sent, 1);
}
