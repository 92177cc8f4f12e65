mod job_schedulers;
mod notification;
mod reminder;
mod shared;
mod status;

use actix_cors::Cors;
use actix_web::{dev::Server, middleware, web, App, HttpServer};
use barbershop_infra::BarbershopContext;
pub use job_schedulers::{ReminderRun, ReminderScheduler};
pub use reminder::send_appointment_reminders::{ReminderBucketReport, RemindersReport};
use std::{net::TcpListener, sync::Arc};
use tokio::task::JoinHandle;
use tracing_actix_web::TracingLogger;

pub fn configure_server_api(cfg: &mut web::ServiceConfig) {
    reminder::configure_routes(cfg);
    status::configure_routes(cfg);
}

pub struct Application {
    server: Server,
    port: u16,
    reminder_scheduler: Arc<ReminderScheduler>,
    cache_sweeper: JoinHandle<()>,
}

impl Application {
    pub async fn new(context: BarbershopContext) -> Result<Self, std::io::Error> {
        let reminder_scheduler = Arc::new(ReminderScheduler::new(context.clone()));
        let (server, port) =
            Application::configure_server(context.config.port, reminder_scheduler.clone())?;
        let cache_sweeper =
            Application::start_job_schedulers(&context, &reminder_scheduler).await;

        Ok(Self {
            server,
            port,
            reminder_scheduler,
            cache_sweeper,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn reminder_scheduler(&self) -> Arc<ReminderScheduler> {
        self.reminder_scheduler.clone()
    }

    async fn start_job_schedulers(
        context: &BarbershopContext,
        reminder_scheduler: &Arc<ReminderScheduler>,
    ) -> JoinHandle<()> {
        let cache_sweeper = context
            .cache
            .spawn_sweeper(context.config.cache_sweep_interval);
        reminder_scheduler.start().await;
        cache_sweeper
    }

    fn configure_server(
        port: usize,
        reminder_scheduler: Arc<ReminderScheduler>,
    ) -> Result<(Server, u16), std::io::Error> {
        let address = format!("0.0.0.0:{}", port);
        let listener = TcpListener::bind(&address)?;
        let port = listener.local_addr()?.port();

        let server = HttpServer::new(move || {
            App::new()
                .wrap(Cors::permissive())
                .wrap(middleware::Compress::default())
                .wrap(TracingLogger::default())
                .app_data(web::Data::from(reminder_scheduler.clone()))
                .service(web::scope("/api/v1").configure(configure_server_api))
        })
        .listen(listener)?
        .workers(4)
        .run();

        Ok((server, port))
    }

    /// Serves until the server is shut down, the background jobs are
    /// stopped afterwards.
    pub async fn start(mut self) -> Result<(), std::io::Error> {
        let res = (&mut self.server).await;
        self.shutdown_job_schedulers();
        res
    }

    fn shutdown_job_schedulers(&self) {
        self.reminder_scheduler.stop();
        self.cache_sweeper.abort();
    }
}
