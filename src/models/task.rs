use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Default, Clone, Debug)]
pub struct MaintenanceTask {
    /// UUID to identify the task
    pub id: Uuid,
    /// The vehicle this task belongs to
    pub vehicle_id: Uuid,
    /// What kind of maintenance this is
    pub kind: TaskType,
    /// When the task comes due, by odometer distance or by calendar time
    #[serde(flatten)]
    pub schedule: Schedule,
    /// Recurring tasks advance their due point when completed; one-off
    /// tasks are marked completed instead
    pub is_recurring: bool,
    /// Completed one-off tasks are kept but never come due again
    pub is_completed: bool,
    /// When the task was created
    pub created_at: Timestamp,
}

/// Due schedule for a maintenance task. Exactly one of the mileage/date
/// shapes exists per task; the tag mirrors the persisted `interval_type`
/// field.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(tag = "interval_type", rename_all = "snake_case")]
pub enum Schedule {
    Mileage {
        /// Distance between occurrences
        interval_value: u32,
        /// Odometer reading at the last completion, if any
        last_completed_mileage: Option<u32>,
        /// Odometer reading at which the task next comes due
        next_due_mileage: u32,
    },
    Date {
        /// Days between occurrences
        interval_value: u32,
        /// When the task was last completed, if ever
        last_completed_date: Option<Timestamp>,
        /// When the task next comes due
        next_due_date: Timestamp,
    },
}

impl Default for Schedule {
    fn default() -> Self {
        Schedule::Mileage {
            interval_value: 0,
            last_completed_mileage: None,
            next_due_mileage: 0,
        }
    }
}

#[derive(Serialize, Deserialize, Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    OilChange,
    TireRotation,
    BrakeService,
    AirFilter,
    Battery,
    Inspection,
    #[default]
    Other,
}

impl TaskType {
    pub fn label(&self) -> &'static str {
        match self {
            TaskType::OilChange => "Oil change",
            TaskType::TireRotation => "Tire rotation",
            TaskType::BrakeService => "Brake service",
            TaskType::AirFilter => "Air filter",
            TaskType::Battery => "Battery",
            TaskType::Inspection => "Inspection",
            TaskType::Other => "Other",
        }
    }
}

#[derive(Debug, Error)]
#[error(
    "Unknown maintenance type '{0}'. Expected one of: oil-change, tire-rotation, brake-service, air-filter, battery, inspection, other"
)]
pub struct ParseTaskTypeError(String);

impl std::str::FromStr for TaskType {
    type Err = ParseTaskTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "oil_change" | "oil" => Ok(TaskType::OilChange),
            "tire_rotation" | "tires" => Ok(TaskType::TireRotation),
            "brake_service" | "brakes" => Ok(TaskType::BrakeService),
            "air_filter" => Ok(TaskType::AirFilter),
            "battery" => Ok(TaskType::Battery),
            "inspection" => Ok(TaskType::Inspection),
            "other" => Ok(TaskType::Other),
            _ => Err(ParseTaskTypeError(s.to_string())),
        }
    }
}
