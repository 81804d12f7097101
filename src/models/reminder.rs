use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A quick free-text reminder tied to a vehicle, backed by a best-effort
/// push notification.
#[derive(Serialize, Deserialize, Default, Clone, Debug)]
pub struct Reminder {
    /// UUID to identify the reminder
    pub id: Uuid,
    /// The vehicle this reminder is about
    pub vehicle_id: Uuid,
    /// What to be reminded of
    pub text: String,
    /// When the reminder fires
    pub due_at: Timestamp,
    /// One-time reminders fire once at `due_at`; recurring ones repeat
    /// every `trigger_seconds`
    pub kind: ReminderKind,
    /// Handle returned by the notification scheduler, if scheduling
    /// succeeded
    pub notification_handle: Option<String>,
    /// Recurrence period in seconds, for recurring reminders
    pub trigger_seconds: Option<u64>,
    /// When the reminder was created
    pub created_at: Timestamp,
}

#[derive(Serialize, Deserialize, Default, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ReminderKind {
    #[default]
    OneTime,
    Recurring,
}
