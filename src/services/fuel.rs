use jiff::Timestamp;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    models::fuel_log::{FuelLog, FuelType},
    repository::Repository,
    state::App,
    storage::{KvStore, StorageError},
};

#[derive(Debug, Error)]
pub enum AddFuelLogError {
    #[error("Vehicle '{0}' not found")]
    VehicleNotFound(Uuid),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct AddFuelLogParameters {
    pub vehicle_id: Uuid,
    pub date: Timestamp,
    pub fuel_type: FuelType,
    /// Liters, or kWh for electric
    pub volume: f64,
    pub total_cost: f64,
    pub station: Option<String>,
    pub notes: Option<String>,
}

pub fn add_fuel_log<S: KvStore>(
    app: &mut App,
    repo: &Repository<S>,
    parameters: AddFuelLogParameters,
) -> Result<FuelLog, AddFuelLogError> {
    if app.store.vehicle(parameters.vehicle_id).is_none() {
        return Err(AddFuelLogError::VehicleNotFound(parameters.vehicle_id));
    }

    app.take_snapshot(repo)?;

    let price_per_unit = if parameters.volume > 0.0 {
        parameters.total_cost / parameters.volume
    } else {
        0.0
    };
    let log = FuelLog {
        id: Uuid::new_v4(),
        vehicle_id: parameters.vehicle_id,
        date: parameters.date,
        fuel_type: parameters.fuel_type,
        volume: parameters.volume,
        total_cost: parameters.total_cost,
        price_per_unit,
        station: parameters.station,
        notes: parameters.notes,
        created_at: Timestamp::now(),
    };

    let mut fuel_logs = app.store.fuel_logs.clone();
    fuel_logs.push(log.clone());

    repo.save_fuel_logs(&fuel_logs)?;
    app.store.fuel_logs = fuel_logs;

    Ok(log)
}

#[derive(Debug, Error)]
pub enum UpdateFuelLogError {
    #[error("Fuel log '{0}' not found")]
    FuelLogNotFound(Uuid),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Default)]
pub struct UpdateFuelLogParameters {
    pub date: Option<Timestamp>,
    pub fuel_type: Option<FuelType>,
    pub volume: Option<f64>,
    pub total_cost: Option<f64>,
    pub station: Option<String>,
    pub notes: Option<String>,
}

pub fn update_fuel_log<S: KvStore>(
    app: &mut App,
    repo: &Repository<S>,
    id: Uuid,
    parameters: UpdateFuelLogParameters,
) -> Result<FuelLog, UpdateFuelLogError> {
    if app.store.fuel_log(id).is_none() {
        return Err(UpdateFuelLogError::FuelLogNotFound(id));
    }

    app.take_snapshot(repo)?;

    let mut fuel_logs = app.store.fuel_logs.clone();
    let log = fuel_logs
        .iter_mut()
        .find(|f| f.id == id)
        .expect("presence checked above");
    if let Some(date) = parameters.date {
        log.date = date;
    }
    if let Some(fuel_type) = parameters.fuel_type {
        log.fuel_type = fuel_type;
    }
    if let Some(volume) = parameters.volume {
        log.volume = volume;
    }
    if let Some(total_cost) = parameters.total_cost {
        log.total_cost = total_cost;
    }
    if let Some(station) = parameters.station {
        log.station = Some(station);
    }
    if let Some(notes) = parameters.notes {
        log.notes = Some(notes);
    }
    // Derived field follows whatever volume/cost ended up as
    log.price_per_unit = if log.volume > 0.0 {
        log.total_cost / log.volume
    } else {
        0.0
    };
    let updated = log.clone();

    repo.save_fuel_logs(&fuel_logs)?;
    app.store.fuel_logs = fuel_logs;

    Ok(updated)
}

#[derive(Debug, Error)]
pub enum DeleteFuelLogError {
    #[error("Fuel log '{0}' not found")]
    FuelLogNotFound(Uuid),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub fn delete_fuel_log<S: KvStore>(
    app: &mut App,
    repo: &Repository<S>,
    id: Uuid,
) -> Result<(), DeleteFuelLogError> {
    if app.store.fuel_log(id).is_none() {
        return Err(DeleteFuelLogError::FuelLogNotFound(id));
    }

    app.take_snapshot(repo)?;

    let fuel_logs: Vec<_> = app
        .store
        .fuel_logs
        .iter()
        .filter(|f| f.id != id)
        .cloned()
        .collect();

    repo.save_fuel_logs(&fuel_logs)?;
    app.store.fuel_logs = fuel_logs;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{store::Store, vehicle::Vehicle},
        storage::memory::MemoryStore,
    };

    fn setup() -> (App, Repository<MemoryStore>, Uuid) {
        let vehicle = Vehicle {
            id: Uuid::new_v4(),
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
    fn test_price_per_unit_is_derived_at_creation() {
        let (mut app, repo, vehicle_id) = setup();

        let log = add_fuel_log(
            &mut app,
            &repo,
            AddFuelLogParameters {
                vehicle_id,
                date: Timestamp::now(),
                fuel_type: FuelType::Gasoline,
                volume: 40.0,
                total_cost: 64.0,
                station: None,
                notes: None,
            },
        )
        .unwrap();

        assert_eq!(log.price_per_unit, 1.6);
    }

    #[test]
    fn test_zero_volume_yields_zero_price_per_unit() {
        let (mut app, repo, vehicle_id) = setup();

        let log = add_fuel_log(
            &mut app,
            &repo,
            AddFuelLogParameters {
                vehicle_id,
                date: Timestamp::now(),
                fuel_type: FuelType::Electric,
                volume: 0.0,
                total_cost: 10.0,
                station: None,
                notes: None,
            },
        )
        .unwrap();

        assert_eq!(log.price_per_unit, 0.0);
    }

    #[test]
    fn test_update_recomputes_price_per_unit() {
        let (mut app, repo, vehicle_id) = setup();
        let log = add_fuel_log(
            &mut app,
            &repo,
            AddFuelLogParameters {
                vehicle_id,
                date: Timestamp::now(),
                fuel_type: FuelType::Gasoline,
                volume: 40.0,
                total_cost: 64.0,
                station: None,
                notes: None,
            },
        )
        .unwrap();

        let updated = update_fuel_log(
            &mut app,
            &repo,
            log.id,
            UpdateFuelLogParameters {
                total_cost: Some(80.0),
                ..UpdateFuelLogParameters::default()
            },
        )
        .unwrap();

        assert_eq!(updated.price_per_unit, 2.0);
    }
}
