use colored::*;
use jiff::Timestamp;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    models::reminder::{Reminder, ReminderKind},
    notify::{NotificationScheduler, Trigger},
    repository::Repository,
    state::App,
    storage::{KvStore, StorageError},
};

#[derive(Debug, Error)]
pub enum AddReminderError {
    #[error("Vehicle '{0}' not found")]
    VehicleNotFound(Uuid),

    #[error("Recurring reminders need a recurrence period")]
    MissingTriggerSeconds,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct AddReminderParameters {
    pub vehicle_id: Uuid,
    pub text: String,
    pub due_at: Timestamp,
    pub kind: ReminderKind,
    pub trigger_seconds: Option<u64>,
}

/// Add a quick reminder and schedule its notification. Scheduling is
/// best-effort: a scheduler failure is warned and swallowed, and the
/// reminder is kept without a handle.
pub fn add_reminder<S: KvStore>(
    app: &mut App,
    repo: &Repository<S>,
    scheduler: &mut impl NotificationScheduler,
    parameters: AddReminderParameters,
) -> Result<Reminder, AddReminderError> {
    let vehicle = app
        .store
        .vehicle(parameters.vehicle_id)
        .ok_or(AddReminderError::VehicleNotFound(parameters.vehicle_id))?;
    if parameters.kind == ReminderKind::Recurring && parameters.trigger_seconds.is_none() {
        return Err(AddReminderError::MissingTriggerSeconds);
    }
    let title = vehicle.display_name();

    app.take_snapshot(repo)?;

    let trigger = match parameters.kind {
        ReminderKind::OneTime => Trigger::At(parameters.due_at),
        ReminderKind::Recurring => Trigger::Every(
            parameters
                .trigger_seconds
                .expect("presence checked above"),
        ),
    };
    let notification_handle = match scheduler.schedule(&title, &parameters.text, trigger) {
        Ok(handle) => Some(handle),
        Err(e) => {
            eprintln!(
                "{} could not schedule notification: {}",
                "Warning:".yellow().bold(),
                e
            );
            None
        }
    };

    let reminder = Reminder {
        id: Uuid::new_v4(),
        vehicle_id: parameters.vehicle_id,
        text: parameters.text,
        due_at: parameters.due_at,
        kind: parameters.kind,
        notification_handle,
        trigger_seconds: parameters.trigger_seconds,
        created_at: Timestamp::now(),
    };

    let mut reminders = app.store.reminders.clone();
    reminders.push(reminder.clone());

    repo.save_reminders(&reminders)?;
    app.store.reminders = reminders;

    Ok(reminder)
}

#[derive(Debug, Error)]
pub enum DeleteReminderError {
    #[error("Reminder '{0}' not found")]
    ReminderNotFound(String),

    #[error("Reminder text is ambiguous. Multiple reminders found: {}", .0.join(", "))]
    AmbiguousText(Vec<String>),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Delete a reminder by fuzzy text match, cancelling its pending
/// notification best-effort.
pub fn delete_reminder<S: KvStore>(
    app: &mut App,
    repo: &Repository<S>,
    scheduler: &mut impl NotificationScheduler,
    text_query: &str,
) -> Result<Reminder, DeleteReminderError> {
    let needle = text_query.to_lowercase();
    let matching: Vec<&Reminder> = app
        .store
        .reminders
        .iter()
        .filter(|r| r.text.to_lowercase().contains(&needle))
        .collect();
    let reminder = match matching.len() {
        0 => return Err(DeleteReminderError::ReminderNotFound(text_query.to_string())),
        1 => matching[0].clone(),
        _ => {
            let texts: Vec<String> = matching.iter().map(|r| r.text.clone()).collect();
            return Err(DeleteReminderError::AmbiguousText(texts));
        }
    };

    if let Some(handle) = &reminder.notification_handle
        && let Err(e) = scheduler.cancel(handle)
    {
        eprintln!(
            "{} could not cancel notification: {}",
            "Warning:".yellow().bold(),
            e
        );
    }

    app.take_snapshot(repo)?;

    let reminders: Vec<_> = app
        .store
        .reminders
        .iter()
        .filter(|r| r.id != reminder.id)
        .cloned()
        .collect();

    repo.save_reminders(&reminders)?;
    app.store.reminders = reminders;

    Ok(reminder)
}
