use crate::dtos::ReminderRunDTO;
use serde::{Deserialize, Serialize};

pub mod get_reminders_status {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub running: bool,
        pub interval_secs: u64,
        pub last_run: Option<ReminderRunDTO>,
    }
}
