use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    fuel_log::FuelLog, record::MaintenanceRecord, reminder::Reminder, task::MaintenanceTask,
    vehicle::Vehicle,
};

/// The five entity collections held in memory. Cloning a `Store` is the
/// snapshot operation: entities are value objects, so a collection-level
/// copy is a full pre-mutation image. A `Store` also serializes whole,
/// which is how the pre-mutation snapshot is persisted between runs.
#[derive(Default, Clone, Debug, Serialize, Deserialize)]
pub struct Store {
    pub vehicles: Vec<Vehicle>,
    pub tasks: Vec<MaintenanceTask>,
    pub records: Vec<MaintenanceRecord>,
    pub fuel_logs: Vec<FuelLog>,
    pub reminders: Vec<Reminder>,
}

impl Store {
    pub fn vehicle(&self, id: Uuid) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id == id)
    }

    pub fn task(&self, id: Uuid) -> Option<&MaintenanceTask> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn record(&self, id: Uuid) -> Option<&MaintenanceRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn fuel_log(&self, id: Uuid) -> Option<&FuelLog> {
        self.fuel_logs.iter().find(|f| f.id == id)
    }

    /// Vehicles that have not been archived
    pub fn active_vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.iter().filter(|v| !v.archived)
    }
}
