use jiff::Timestamp;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    models::task::{MaintenanceTask, Schedule, TaskType},
    repository::Repository,
    state::App,
    storage::{KvStore, StorageError},
};

#[derive(Debug, Error)]
pub enum AddTaskError {
    #[error("Vehicle '{0}' not found")]
    VehicleNotFound(Uuid),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct AddTaskParameters {
    pub vehicle_id: Uuid,
    pub kind: TaskType,
    pub schedule: Schedule,
    pub is_recurring: bool,
}

pub fn add_task<S: KvStore>(
    app: &mut App,
    repo: &Repository<S>,
    parameters: AddTaskParameters,
) -> Result<MaintenanceTask, AddTaskError> {
    if app.store.vehicle(parameters.vehicle_id).is_none() {
        return Err(AddTaskError::VehicleNotFound(parameters.vehicle_id));
    }

    app.take_snapshot(repo)?;

    let task = MaintenanceTask {
        id: Uuid::new_v4(),
        vehicle_id: parameters.vehicle_id,
        kind: parameters.kind,
        schedule: parameters.schedule,
        is_recurring: parameters.is_recurring,
        is_completed: false,
        created_at: Timestamp::now(),
    };

    let mut tasks = app.store.tasks.clone();
    tasks.push(task.clone());

    repo.save_tasks(&tasks)?;
    app.store.tasks = tasks;

    Ok(task)
}

#[derive(Debug, Error)]
pub enum UpdateTaskError {
    #[error("Task '{0}' not found")]
    TaskNotFound(Uuid),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Default)]
pub struct UpdateTaskParameters {
    pub kind: Option<TaskType>,
    pub schedule: Option<Schedule>,
    pub is_recurring: Option<bool>,
    pub is_completed: Option<bool>,
}

pub fn update_task<S: KvStore>(
    app: &mut App,
    repo: &Repository<S>,
    id: Uuid,
    parameters: UpdateTaskParameters,
) -> Result<MaintenanceTask, UpdateTaskError> {
    if app.store.task(id).is_none() {
        return Err(UpdateTaskError::TaskNotFound(id));
    }

    app.take_snapshot(repo)?;

    let mut tasks = app.store.tasks.clone();
    let task = tasks
        .iter_mut()
        .find(|t| t.id == id)
        .expect("presence checked above");
    if let Some(kind) = parameters.kind {
        task.kind = kind;
    }
    if let Some(schedule) = parameters.schedule {
        task.schedule = schedule;
    }
    if let Some(is_recurring) = parameters.is_recurring {
        task.is_recurring = is_recurring;
    }
    if let Some(is_completed) = parameters.is_completed {
        task.is_completed = is_completed;
    }
    let updated = task.clone();

    repo.save_tasks(&tasks)?;
    app.store.tasks = tasks;

    Ok(updated)
}

#[derive(Debug, Error)]
pub enum DeleteTaskError {
    #[error("Task '{0}' not found")]
    TaskNotFound(Uuid),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub fn delete_task<S: KvStore>(
    app: &mut App,
    repo: &Repository<S>,
    id: Uuid,
) -> Result<(), DeleteTaskError> {
    if app.store.task(id).is_none() {
        return Err(DeleteTaskError::TaskNotFound(id));
    }

    app.take_snapshot(repo)?;

    let tasks: Vec<_> = app
        .store
        .tasks
        .iter()
        .filter(|t| t.id != id)
        .cloned()
        .collect();

    repo.save_tasks(&tasks)?;
    app.store.tasks = tasks;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{store::Store, vehicle::Vehicle},
        storage::memory::MemoryStore,
    };

    fn setup_with_vehicle() -> (App, Repository<MemoryStore>, Uuid) {
        let vehicle = Vehicle {
            id: Uuid::new_v4(),
            make: String::from("Honda"),
            model: String::from("Civic"),
            current_mileage: 40000,
            ..Vehicle::default()
        };
        let vehicle_id = vehicle.id;
        let app = App::new(Store {
            vehicles: vec![vehicle],
            ..Store::default()
        });
        (app, Repository::new(MemoryStore::new()), vehicle_id)
    }

    #[test]
    fn test_add_task_rejects_unknown_vehicle() {
        let (mut app, repo, _) = setup_with_vehicle();

        let result = add_task(
            &mut app,
            &repo,
            AddTaskParameters {
                vehicle_id: Uuid::new_v4(),
                kind: TaskType::OilChange,
                schedule: Schedule::default(),
                is_recurring: true,
            },
        );

        assert!(matches!(result, Err(AddTaskError::VehicleNotFound(_))));
        assert!(app.snapshot().is_none(), "Validation failures must not snapshot");
    }

    #[test]
    fn test_add_task_persists_and_updates_state() {
        let (mut app, repo, vehicle_id) = setup_with_vehicle();

        let task = add_task(
            &mut app,
            &repo,
            AddTaskParameters {
                vehicle_id,
                kind: TaskType::OilChange,
                schedule: Schedule::Mileage {
                    interval_value: 5000,
                    last_completed_mileage: None,
                    next_due_mileage: 45000,
                },
                is_recurring: true,
            },
        )
        .unwrap();

        assert_eq!(app.store.tasks.len(), 1);
        assert_eq!(repo.load_all().tasks[0].id, task.id);
    }

    #[test]
    fn test_update_task_replaces_schedule() {
        let (mut app, repo, vehicle_id) = setup_with_vehicle();
        let task = add_task(
            &mut app,
            &repo,
            AddTaskParameters {
                vehicle_id,
                kind: TaskType::Inspection,
                schedule: Schedule::Date {
                    interval_value: 365,
                    last_completed_date: None,
                    next_due_date: Timestamp::now(),
                },
                is_recurring: true,
            },
        )
        .unwrap();

        let updated = update_task(
            &mut app,
            &repo,
            task.id,
            UpdateTaskParameters {
                is_recurring: Some(false),
                ..UpdateTaskParameters::default()
            },
        )
        .unwrap();

        assert!(!updated.is_recurring);
        assert!(matches!(updated.schedule, Schedule::Date { .. }));
    }

    #[test]
    fn test_delete_task_filters_it_out() {
        let (mut app, repo, vehicle_id) = setup_with_vehicle();
        let task = add_task(
            &mut app,
            &repo,
            AddTaskParameters {
                vehicle_id,
                kind: TaskType::Battery,
                schedule: Schedule::default(),
                is_recurring: false,
            },
        )
        .unwrap();

        delete_task(&mut app, &repo, task.id).unwrap();

        assert!(app.store.tasks.is_empty());
        assert!(repo.load_all().tasks.is_empty());
    }
}
