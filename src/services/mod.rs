//! External collaborator module
//!
//! This module contains the notification scheduler used for background alerts
//! and the local completion alert.

pub mod alert;
pub mod notifications;

// Re-export main types
pub use alert::CompletionAlert;
pub use notifications::{
    send_desktop_notification, NoopScheduler, NotificationScheduler, ScheduleHandle,
    TokioNotificationScheduler,
};
