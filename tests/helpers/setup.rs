use barbershop_api::Application;
use barbershop_infra::BarbershopContext;

pub struct TestApp {
    pub ctx: BarbershopContext,
    pub address: String,
}

// Launch the application as a background task
pub async fn spawn_app() -> TestApp {
    spawn_app_with_context(BarbershopContext::create_inmemory()).await
}

pub async fn spawn_app_with_context(mut ctx: BarbershopContext) -> TestApp {
    ctx.config.port = 0; // Random port

    let application = Application::new(ctx.clone())
        .await
        .expect("Failed to build application.");

    let address = format!("http://localhost:{}/api/v1", application.port());
    let _ = actix_web::rt::spawn(async move {
        application
            .start()
            .await
            .expect("Expected application to start");
    });

    TestApp { ctx, address }
}
