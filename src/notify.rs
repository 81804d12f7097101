use colored::*;
use jiff::Timestamp;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification trigger is in the past")]
    TriggerInPast,

    #[error("Unknown notification handle '{0}'")]
    UnknownHandle(String),
}

#[derive(Clone, Copy, Debug)]
pub enum Trigger {
    /// Fire once at a point in time
    At(Timestamp),
    /// Fire repeatedly with a period in seconds
    Every(u64),
}

/// Push-notification scheduling as the OS exposes it: hand over a payload
/// and a trigger, get back a cancellation handle. Delivery is the OS's
/// problem; callers treat the whole thing as best-effort.
pub trait NotificationScheduler {
    fn schedule(&mut self, title: &str, body: &str, trigger: Trigger)
    -> Result<String, NotifyError>;

    fn cancel(&mut self, handle: &str) -> Result<(), NotifyError>;
}

/// Terminal stand-in for a real OS scheduler: prints what it would
/// schedule and mints handles.
pub struct ConsoleScheduler;

impl NotificationScheduler for ConsoleScheduler {
    fn schedule(
        &mut self,
        title: &str,
        _body: &str,
        trigger: Trigger,
    ) -> Result<String, NotifyError> {
        match trigger {
            Trigger::At(at) => {
                if at < Timestamp::now() {
                    return Err(NotifyError::TriggerInPast);
                }
                eprintln!(
                    "{}",
                    format!("(notification '{title}' scheduled for {at})").dimmed()
                );
            }
            Trigger::Every(seconds) => {
                eprintln!(
                    "{}",
                    format!("(notification '{title}' scheduled every {seconds}s)").dimmed()
                );
            }
        }
        Ok(Uuid::new_v4().to_string())
    }

    fn cancel(&mut self, handle: &str) -> Result<(), NotifyError> {
        // Handles minted by `schedule` are uuids; anything else was never ours.
        if handle.parse::<Uuid>().is_err() {
            return Err(NotifyError::UnknownHandle(handle.to_string()));
        }
        eprintln!("{}", format!("(notification {handle} cancelled)").dimmed());
        Ok(())
    }
}
