use chrono_tz::Tz;
use std::{fmt::Display, str::FromStr, time::Duration};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the application to run on
    pub port: usize,
    /// Postgres connection string. The in-memory repositories are used
    /// when this is not set.
    pub database_url: Option<String>,
    /// How often the reminder scheduler scans for upcoming appointments
    pub reminder_interval: Duration,
    /// Maximum number of reminder notifications dispatched at the same time
    /// within a single scan.
    pub reminder_dispatch_concurrency: usize,
    /// A scan that takes longer than this is abandoned and logged
    pub reminder_run_timeout: Duration,
    /// How often expired cache entries are removed
    pub cache_sweep_interval: Duration,
    /// Timezone of the barbershop. Decides where "today" starts for the
    /// reminder scan window and how times are rendered in reminders.
    pub timezone: Tz,
}

fn parse_env_or<T>(name: &str, default: T) -> T
where
    T: FromStr + Display,
{
    match std::env::var(name) {
        Ok(value) => match value.parse::<T>() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(
                    "The given {}: {} is not valid, falling back to the default: {}.",
                    name, value, default
                );
                default
            }
        },
        Err(_) => default,
    }
}

impl Config {
    pub fn new() -> Self {
        let port = parse_env_or("PORT", 5000);
        let database_url = std::env::var("DATABASE_URL").ok();
        if database_url.is_none() {
            info!("Did not find DATABASE_URL environment variable. Going to use inmemory repositories.");
        }
        let reminder_interval_secs = parse_env_or("REMINDER_INTERVAL_SECS", 5 * 60_u64);
        let reminder_dispatch_concurrency =
            parse_env_or("REMINDER_DISPATCH_CONCURRENCY", 4_usize).max(1);
        let reminder_run_timeout_secs = parse_env_or("REMINDER_RUN_TIMEOUT_SECS", 60_u64);
        let cache_sweep_interval_secs = parse_env_or("CACHE_SWEEP_INTERVAL_SECS", 60_u64);
        let timezone = parse_env_or("SCHEDULER_TIMEZONE", Tz::UTC);

        Self {
            port,
            database_url,
            reminder_interval: Duration::from_secs(reminder_interval_secs.max(1)),
            reminder_dispatch_concurrency,
            reminder_run_timeout: Duration::from_secs(reminder_run_timeout_secs.max(1)),
            cache_sweep_interval: Duration::from_secs(cache_sweep_interval_secs.max(1)),
            timezone,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
