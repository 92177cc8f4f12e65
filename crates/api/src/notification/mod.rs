pub mod create_reminder_notification;
mod subscribers;

/// Tag of every cache entry derived from the notifications table
pub const NOTIFICATIONS_CACHE_TAG: &str = "notifications";
