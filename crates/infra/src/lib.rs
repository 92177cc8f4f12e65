mod cache;
mod config;
mod notifier;
mod repos;
mod system;

pub use cache::Cache;
pub use config::Config;
pub use notifier::{BroadcastNotifier, INotifier, NotificationEvent};
pub use repos::{IAppointmentRepo, INotificationRepo, Repos};
use std::sync::Arc;
pub use system::{ISys, ManualSys, RealSys};

#[derive(Clone)]
pub struct BarbershopContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    /// Shared by every component of the process, reads are measured with `sys`
    pub cache: Arc<Cache>,
    pub notifier: Arc<dyn INotifier>,
}

struct ContextParams {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
}

impl BarbershopContext {
    fn create(params: ContextParams) -> Self {
        let cache = Arc::new(Cache::new(params.sys.clone()));
        Self {
            repos: params.repos,
            config: params.config,
            sys: params.sys,
            cache,
            notifier: Arc::new(BroadcastNotifier::default()),
        }
    }

    pub fn create_inmemory() -> Self {
        Self::create_inmemory_with_sys(Arc::new(RealSys {}))
    }

    /// Inmemory context where time is read from `sys`, used for testing
    pub fn create_inmemory_with_sys(sys: Arc<dyn ISys>) -> Self {
        Self::create(ContextParams {
            repos: Repos::create_inmemory(),
            config: Config::new(),
            sys,
        })
    }
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> anyhow::Result<BarbershopContext> {
    let config = Config::new();
    let repos = match &config.database_url {
        Some(connection_string) => Repos::create_postgres(connection_string).await?,
        None => Repos::create_inmemory(),
    };
    Ok(BarbershopContext::create(ContextParams {
        repos,
        config,
        sys: Arc::new(RealSys {}),
    }))
}
