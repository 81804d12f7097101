use jiff::{SignedDuration, Timestamp};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    models::{
        record::MaintenanceRecord,
        task::{MaintenanceTask, Schedule, TaskType},
    },
    repository::Repository,
    state::App,
    storage::{KvStore, StorageError},
};

#[derive(Debug, Error)]
pub enum AddRecordError {
    #[error("Vehicle '{0}' not found")]
    VehicleNotFound(Uuid),

    #[error("Task '{0}' not found")]
    TaskNotFound(Uuid),

    #[error("Computed due date is out of range")]
    DueDateOutOfRange,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct AddRecordParameters {
    pub vehicle_id: Uuid,
    /// Scheduled task this work completes, if any
    pub task_id: Option<Uuid>,
    pub kind: TaskType,
    pub date: Timestamp,
    pub mileage: u32,
    pub cost: Option<f64>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

/// Add a maintenance record. One snapshot covers the record itself plus
/// both side effects: a referenced task advances (recurring) or completes
/// (one-off), and the vehicle's odometer is raised when the record
/// reports a higher reading.
pub fn add_record<S: KvStore>(
    app: &mut App,
    repo: &Repository<S>,
    parameters: AddRecordParameters,
) -> Result<MaintenanceRecord, AddRecordError> {
    if app.store.vehicle(parameters.vehicle_id).is_none() {
        return Err(AddRecordError::VehicleNotFound(parameters.vehicle_id));
    }
    if let Some(task_id) = parameters.task_id
        && app.store.task(task_id).is_none()
    {
        return Err(AddRecordError::TaskNotFound(task_id));
    }

    app.take_snapshot(repo)?;

    let record = MaintenanceRecord {
        id: Uuid::new_v4(),
        vehicle_id: parameters.vehicle_id,
        task_id: parameters.task_id,
        kind: parameters.kind,
        date: parameters.date,
        mileage: parameters.mileage,
        cost: parameters.cost,
        location: parameters.location,
        notes: parameters.notes,
        created_at: Timestamp::now(),
    };

    let mut records = app.store.records.clone();
    records.push(record.clone());

    let tasks = match parameters.task_id {
        Some(task_id) => {
            let mut tasks = app.store.tasks.clone();
            let task = tasks
                .iter_mut()
                .find(|t| t.id == task_id)
                .expect("presence checked above");
            complete_against(task, &record)?;
            Some(tasks)
        }
        None => None,
    };

    let vehicle = app
        .store
        .vehicle(parameters.vehicle_id)
        .expect("presence checked above");
    let vehicles = if record.mileage > vehicle.current_mileage {
        let mut vehicles = app.store.vehicles.clone();
        let vehicle = vehicles
            .iter_mut()
            .find(|v| v.id == parameters.vehicle_id)
            .expect("presence checked above");
        vehicle.current_mileage = record.mileage;
        vehicle.updated_at = record.created_at;
        Some(vehicles)
    } else {
        None
    };

    repo.save_records(&records)?;
    if let Some(tasks) = &tasks {
        repo.save_tasks(tasks)?;
    }
    if let Some(vehicles) = &vehicles {
        repo.save_vehicles(vehicles)?;
    }

    app.store.records = records;
    if let Some(tasks) = tasks {
        app.store.tasks = tasks;
    }
    if let Some(vehicles) = vehicles {
        app.store.vehicles = vehicles;
    }

    Ok(record)
}

/// Apply the record-completion side effect to the referenced task: a
/// recurring task advances its due point from the record, a one-off task
/// is marked completed with its schedule untouched.
fn complete_against(
    task: &mut MaintenanceTask,
    record: &MaintenanceRecord,
) -> Result<(), AddRecordError> {
    if !task.is_recurring {
        task.is_completed = true;
        return Ok(());
    }

    match &mut task.schedule {
        Schedule::Mileage {
            interval_value,
            last_completed_mileage,
            next_due_mileage,
        } => {
            *last_completed_mileage = Some(record.mileage);
            *next_due_mileage = record.mileage + *interval_value;
        }
        Schedule::Date {
            interval_value,
            last_completed_date,
            next_due_date,
        } => {
            *last_completed_date = Some(record.date);
            *next_due_date = record
                .date
                .checked_add(SignedDuration::from_hours(i64::from(*interval_value) * 24))
                .map_err(|_| AddRecordError::DueDateOutOfRange)?;
        }
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum UpdateRecordError {
    #[error("Record '{0}' not found")]
    RecordNotFound(Uuid),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Default)]
pub struct UpdateRecordParameters {
    pub kind: Option<TaskType>,
    pub date: Option<Timestamp>,
    pub mileage: Option<u32>,
    pub cost: Option<f64>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

/// Explicit update of an otherwise-immutable record. No task or mileage
/// side effects re-run here; those belong to record creation only.
pub fn update_record<S: KvStore>(
    app: &mut App,
    repo: &Repository<S>,
    id: Uuid,
    parameters: UpdateRecordParameters,
) -> Result<MaintenanceRecord, UpdateRecordError> {
    if app.store.record(id).is_none() {
        return Err(UpdateRecordError::RecordNotFound(id));
    }

    app.take_snapshot(repo)?;

    let mut records = app.store.records.clone();
    let record = records
        .iter_mut()
        .find(|r| r.id == id)
        .expect("presence checked above");
    if let Some(kind) = parameters.kind {
        record.kind = kind;
    }
    if let Some(date) = parameters.date {
        record.date = date;
    }
    if let Some(mileage) = parameters.mileage {
        record.mileage = mileage;
    }
    if let Some(cost) = parameters.cost {
        record.cost = Some(cost);
    }
    if let Some(location) = parameters.location {
        record.location = Some(location);
    }
    if let Some(notes) = parameters.notes {
        record.notes = Some(notes);
    }
    let updated = record.clone();

    repo.save_records(&records)?;
    app.store.records = records;

    Ok(updated)
}

#[derive(Debug, Error)]
pub enum DeleteRecordError {
    #[error("Record '{0}' not found")]
    RecordNotFound(Uuid),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub fn delete_record<S: KvStore>(
    app: &mut App,
    repo: &Repository<S>,
    id: Uuid,
) -> Result<(), DeleteRecordError> {
    if app.store.record(id).is_none() {
        return Err(DeleteRecordError::RecordNotFound(id));
    }

    app.take_snapshot(repo)?;

    let records: Vec<_> = app
        .store
        .records
        .iter()
        .filter(|r| r.id != id)
        .cloned()
        .collect();

    repo.save_records(&records)?;
    app.store.records = records;

    Ok(())
}
