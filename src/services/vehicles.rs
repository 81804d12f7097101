use jiff::Timestamp;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    models::{
        store::Store,
        vehicle::{Vehicle, VehicleCategory},
    },
    repository::Repository,
    state::App,
    storage::{KvStore, StorageError},
};

#[derive(Debug, Error)]
pub enum ResolveVehicleError {
    #[error("Vehicle '{0}' not found")]
    NotFound(String),

    #[error("Vehicle name is ambiguous. Multiple vehicles found: {}", .0.join(", "))]
    AmbiguousName(Vec<String>),
}

/// Resolve a vehicle by fuzzy name match over "make model", active
/// vehicles only. Zero matches and multiple matches are both errors.
pub fn resolve_vehicle<'a>(store: &'a Store, query: &str) -> Result<&'a Vehicle, ResolveVehicleError> {
    let needle = query.to_lowercase();
    let matching: Vec<&Vehicle> = store
        .active_vehicles()
        .filter(|v| v.display_name().to_lowercase().contains(&needle))
        .collect();

    match matching.len() {
        0 => Err(ResolveVehicleError::NotFound(query.to_string())),
        1 => Ok(matching[0]),
        _ => {
            let names: Vec<String> = matching.iter().map(|v| v.display_name()).collect();
            Err(ResolveVehicleError::AmbiguousName(names))
        }
    }
}

#[derive(Debug, Error)]
pub enum AddVehicleError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct AddVehicleParameters {
    pub make: String,
    pub model: String,
    pub year: u16,
    pub current_mileage: u32,
    pub category: VehicleCategory,
}

pub fn add_vehicle<S: KvStore>(
    app: &mut App,
    repo: &Repository<S>,
    parameters: AddVehicleParameters,
) -> Result<Vehicle, AddVehicleError> {
    app.take_snapshot(repo)?;

    let now = Timestamp::now();
    let vehicle = Vehicle {
        id: Uuid::new_v4(),
        make: parameters.make,
        model: parameters.model,
        year: parameters.year,
        current_mileage: parameters.current_mileage,
        category: parameters.category,
        archived: false,
        created_at: now,
        updated_at: now,
    };

    let mut vehicles = app.store.vehicles.clone();
    vehicles.push(vehicle.clone());

    repo.save_vehicles(&vehicles)?;
    app.store.vehicles = vehicles;

    Ok(vehicle)
}

#[derive(Debug, Error)]
pub enum UpdateVehicleError {
    #[error("Vehicle '{0}' not found")]
    VehicleNotFound(Uuid),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Default)]
pub struct UpdateVehicleParameters {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<u16>,
    pub current_mileage: Option<u32>,
    pub category: Option<VehicleCategory>,
}

/// Merge a partial field set into one vehicle and refresh `updated_at`.
pub fn update_vehicle<S: KvStore>(
    app: &mut App,
    repo: &Repository<S>,
    id: Uuid,
    parameters: UpdateVehicleParameters,
) -> Result<Vehicle, UpdateVehicleError> {
    if app.store.vehicle(id).is_none() {
        return Err(UpdateVehicleError::VehicleNotFound(id));
    }

    app.take_snapshot(repo)?;

    let mut vehicles = app.store.vehicles.clone();
    let vehicle = vehicles
        .iter_mut()
        .find(|v| v.id == id)
        .expect("presence checked above");
    if let Some(make) = parameters.make {
        vehicle.make = make;
    }
    if let Some(model) = parameters.model {
        vehicle.model = model;
    }
    if let Some(year) = parameters.year {
        vehicle.year = year;
    }
    if let Some(mileage) = parameters.current_mileage {
        vehicle.current_mileage = mileage;
    }
    if let Some(category) = parameters.category {
        vehicle.category = category;
    }
    vehicle.updated_at = Timestamp::now();
    let updated = vehicle.clone();

    repo.save_vehicles(&vehicles)?;
    app.store.vehicles = vehicles;

    Ok(updated)
}

#[derive(Debug, Error)]
pub enum ArchiveVehiclesError {
    #[error("Vehicle '{0}' not found")]
    VehicleNotFound(Uuid),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Archive several vehicles as one undoable step.
pub fn archive_vehicles<S: KvStore>(
    app: &mut App,
    repo: &Repository<S>,
    ids: &[Uuid],
) -> Result<usize, ArchiveVehiclesError> {
    set_archived(app, repo, ids, true)
}

/// Bring archived vehicles back, one undoable step.
pub fn unarchive_vehicles<S: KvStore>(
    app: &mut App,
    repo: &Repository<S>,
    ids: &[Uuid],
) -> Result<usize, ArchiveVehiclesError> {
    set_archived(app, repo, ids, false)
}

fn set_archived<S: KvStore>(
    app: &mut App,
    repo: &Repository<S>,
    ids: &[Uuid],
    archived: bool,
) -> Result<usize, ArchiveVehiclesError> {
    for id in ids {
        if app.store.vehicle(*id).is_none() {
            return Err(ArchiveVehiclesError::VehicleNotFound(*id));
        }
    }

    // One snapshot for the whole batch; undo restores the pre-batch state.
    app.take_snapshot(repo)?;

    let now = Timestamp::now();
    let mut vehicles = app.store.vehicles.clone();
    for vehicle in vehicles.iter_mut().filter(|v| ids.contains(&v.id)) {
        vehicle.archived = archived;
        vehicle.updated_at = now;
    }

    repo.save_vehicles(&vehicles)?;
    app.store.vehicles = vehicles;

    Ok(ids.len())
}

#[derive(Debug, Error)]
pub enum DeleteVehiclesError {
    #[error("Vehicle '{0}' not found")]
    VehicleNotFound(Uuid),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// What a cascading delete removed alongside the vehicles themselves
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CascadeCounts {
    pub tasks: usize,
    pub records: usize,
    pub fuel_logs: usize,
}

/// Delete vehicles and cascade to their tasks, records, and fuel logs.
/// The whole batch is one snapshot, so a single undo brings everything
/// back.
pub fn delete_vehicles<S: KvStore>(
    app: &mut App,
    repo: &Repository<S>,
    ids: &[Uuid],
) -> Result<CascadeCounts, DeleteVehiclesError> {
    for id in ids {
        if app.store.vehicle(*id).is_none() {
            return Err(DeleteVehiclesError::VehicleNotFound(*id));
        }
    }

    app.take_snapshot(repo)?;

    let vehicles: Vec<_> = app
        .store
        .vehicles
        .iter()
        .filter(|v| !ids.contains(&v.id))
        .cloned()
        .collect();
    let tasks: Vec<_> = app
        .store
        .tasks
        .iter()
        .filter(|t| !ids.contains(&t.vehicle_id))
        .cloned()
        .collect();
    let records: Vec<_> = app
        .store
        .records
        .iter()
        .filter(|r| !ids.contains(&r.vehicle_id))
        .cloned()
        .collect();
    let fuel_logs: Vec<_> = app
        .store
        .fuel_logs
        .iter()
        .filter(|f| !ids.contains(&f.vehicle_id))
        .cloned()
        .collect();

    let counts = CascadeCounts {
        tasks: app.store.tasks.len() - tasks.len(),
        records: app.store.records.len() - records.len(),
        fuel_logs: app.store.fuel_logs.len() - fuel_logs.len(),
    };

    repo.save_vehicles(&vehicles)?;
    repo.save_tasks(&tasks)?;
    repo.save_records(&records)?;
    repo.save_fuel_logs(&fuel_logs)?;

    app.store.vehicles = vehicles;
    app.store.tasks = tasks;
    app.store.records = records;
    app.store.fuel_logs = fuel_logs;

    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStore;

    fn setup() -> (App, Repository<MemoryStore>) {
        (App::new(Store::default()), Repository::new(MemoryStore::new()))
    }

    fn add(app: &mut App, repo: &Repository<MemoryStore>, make: &str, model: &str) -> Vehicle {
        add_vehicle(
            app,
            repo,
            AddVehicleParameters {
                make: make.to_string(),
                model: model.to_string(),
                year: 2019,
                current_mileage: 42000,
                category: VehicleCategory::Car,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_add_vehicle_persists_and_updates_state() {
        let (mut app, repo) = setup();

        let vehicle = add(&mut app, &repo, "Honda", "Civic");

        assert_eq!(app.store.vehicles.len(), 1);
        assert_eq!(repo.load_all().vehicles[0].id, vehicle.id);
        assert!(app.snapshot().is_some());
    }

    #[test]
    fn test_update_vehicle_merges_partial_fields() {
        let (mut app, repo) = setup();
        let vehicle = add(&mut app, &repo, "Honda", "Civic");

        let updated = update_vehicle(
            &mut app,
            &repo,
            vehicle.id,
            UpdateVehicleParameters {
                current_mileage: Some(43500),
                ..UpdateVehicleParameters::default()
            },
        )
        .unwrap();

        assert_eq!(updated.current_mileage, 43500);
        assert_eq!(updated.make, "Honda");
        assert!(updated.updated_at >= vehicle.updated_at);
    }

    #[test]
    fn test_resolve_vehicle_fuzzy_match() {
        let (mut app, repo) = setup();
        add(&mut app, &repo, "Honda", "Civic");
        add(&mut app, &repo, "Ford", "F-150");

        assert_eq!(resolve_vehicle(&app.store, "civ").unwrap().model, "Civic");
        assert!(matches!(
            resolve_vehicle(&app.store, "porsche"),
            Err(ResolveVehicleError::NotFound(_))
        ));
    }

    #[test]
    fn test_resolve_vehicle_ambiguity_is_an_error() {
        let (mut app, repo) = setup();
        add(&mut app, &repo, "Honda", "Civic");
        add(&mut app, &repo, "Honda", "Accord");

        assert!(matches!(
            resolve_vehicle(&app.store, "honda"),
            Err(ResolveVehicleError::AmbiguousName(names)) if names.len() == 2
        ));
    }

    #[test]
    fn test_resolve_vehicle_skips_archived() {
        let (mut app, repo) = setup();
        let vehicle = add(&mut app, &repo, "Honda", "Civic");
        archive_vehicles(&mut app, &repo, &[vehicle.id]).unwrap();

        assert!(matches!(
            resolve_vehicle(&app.store, "civic"),
            Err(ResolveVehicleError::NotFound(_))
        ));
    }

    #[test]
    fn test_archive_batch_is_one_snapshot() {
        let (mut app, repo) = setup();
        let a = add(&mut app, &repo, "Honda", "Civic");
        let b = add(&mut app, &repo, "Ford", "F-150");

        archive_vehicles(&mut app, &repo, &[a.id, b.id]).unwrap();

        // The retained snapshot predates the whole batch: both vehicles
        // unarchived in it.
        let snapshot = app.snapshot().unwrap();
        assert!(snapshot.vehicles.iter().all(|v| !v.archived));
        assert!(app.store.vehicles.iter().all(|v| v.archived));
    }

    #[test]
    fn test_delete_unknown_vehicle_leaves_state_untouched() {
        let (mut app, repo) = setup();
        add(&mut app, &repo, "Honda", "Civic");
        let before = app.store.vehicles.len();

        let result = delete_vehicles(&mut app, &repo, &[Uuid::new_v4()]);

        assert!(matches!(result, Err(DeleteVehiclesError::VehicleNotFound(_))));
        assert_eq!(app.store.vehicles.len(), before);
    }
}
