use serde::{Deserialize, Serialize};

/// Outcome of the latest reminder scan
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderRunDTO {
    /// Timestamp in millis at which the scan finished
    pub finished_at: i64,
    pub day_before_sent: usize,
    pub same_day_sent: usize,
    pub failed: usize,
}
