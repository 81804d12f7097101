use colored::*;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
    models::{
        fuel_log::FuelLog, record::MaintenanceRecord, reminder::Reminder, store::Store,
        task::MaintenanceTask, vehicle::Vehicle,
    },
    storage::{KvStore, StorageError},
};

/// Persistence keys. One key per collection, plus the opaque
/// preference-family blobs carried through backup untouched.
pub mod keys {
    use uuid::Uuid;

    pub const VEHICLES: &str = "vehicles";
    pub const TASKS: &str = "maintenance_tasks";
    pub const RECORDS: &str = "maintenance_records";
    pub const FUEL_LOGS: &str = "fuel_logs";
    pub const REMINDERS: &str = "quick_reminders";

    /// The whole-store pre-mutation snapshot, kept so an undo still works
    /// from a later process.
    pub const SNAPSHOT: &str = "undo_snapshot";

    pub const PREFERENCES: &str = "preferences";
    pub const THEME: &str = "theme";
    pub const LANGUAGE: &str = "language";
    pub const NOTIFICATIONS_ENABLED: &str = "notifications_enabled";

    /// Key format used before reminders were unified into one collection
    pub fn legacy_reminders(vehicle_id: Uuid) -> String {
        format!("reminders_{vehicle_id}")
    }
}

/// Loads and saves the typed entity collections over a raw key-value
/// store. Reads degrade per collection: a missing, unreadable, or
/// unparseable blob becomes an empty collection with a warning, never a
/// failed load.
pub struct Repository<S: KvStore> {
    store: S,
}

impl<S: KvStore> Repository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Read all five collections, applying the legacy reminder migration
    /// when the unified reminders key has not been written yet.
    pub fn load_all(&self) -> Store {
        let vehicles: Vec<Vehicle> = self.load_collection(keys::VEHICLES);
        let tasks: Vec<MaintenanceTask> = self.load_collection(keys::TASKS);
        let records: Vec<MaintenanceRecord> = self.load_collection(keys::RECORDS);
        let fuel_logs: Vec<FuelLog> = self.load_collection(keys::FUEL_LOGS);

        let reminders = match self.migrate_legacy_reminders(&vehicles) {
            Some(migrated) => migrated,
            None => self.load_collection(keys::REMINDERS),
        };

        Store {
            vehicles,
            tasks,
            records,
            fuel_logs,
            reminders,
        }
    }

    pub fn save_vehicles(&self, vehicles: &[Vehicle]) -> Result<(), StorageError> {
        self.save_collection(keys::VEHICLES, vehicles)
    }

    pub fn save_tasks(&self, tasks: &[MaintenanceTask]) -> Result<(), StorageError> {
        self.save_collection(keys::TASKS, tasks)
    }

    pub fn save_records(&self, records: &[MaintenanceRecord]) -> Result<(), StorageError> {
        self.save_collection(keys::RECORDS, records)
    }

    pub fn save_fuel_logs(&self, fuel_logs: &[FuelLog]) -> Result<(), StorageError> {
        self.save_collection(keys::FUEL_LOGS, fuel_logs)
    }

    pub fn save_reminders(&self, reminders: &[Reminder]) -> Result<(), StorageError> {
        self.save_collection(keys::REMINDERS, reminders)
    }

    /// Persist all five collections. There is no ordering dependency
    /// between them; the first failed write aborts the rest.
    pub fn save_store(&self, store: &Store) -> Result<(), StorageError> {
        self.save_vehicles(&store.vehicles)?;
        self.save_tasks(&store.tasks)?;
        self.save_records(&store.records)?;
        self.save_fuel_logs(&store.fuel_logs)?;
        self.save_reminders(&store.reminders)?;
        Ok(())
    }

    /// Persist the pre-mutation snapshot as one blob, replacing any
    /// previous one.
    pub fn save_snapshot(&self, snapshot: &Store) -> Result<(), StorageError> {
        let json =
            serde_json::to_string(snapshot).map_err(|e| StorageError::SerializeFailed {
                key: keys::SNAPSHOT.to_string(),
                source: e,
            })?;
        self.store.set(keys::SNAPSHOT, &json)
    }

    /// Read back the persisted snapshot, if an earlier run left one.
    /// Degrades to `None` like collection reads.
    pub fn load_snapshot(&self) -> Option<Store> {
        match self.store.get(keys::SNAPSHOT) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    warn_degraded(keys::SNAPSHOT, &e.to_string());
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn_degraded(keys::SNAPSHOT, &e.to_string());
                None
            }
        }
    }

    pub fn clear_snapshot(&self) -> Result<(), StorageError> {
        self.store.remove(&[keys::SNAPSHOT])
    }

    /// Read an opaque blob (preference-family keys). Degrades to `None`
    /// like collection reads.
    pub fn get_raw(&self, key: &str) -> Option<Value> {
        match self.store.get(key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn_degraded(key, &e.to_string());
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn_degraded(key, &e.to_string());
                None
            }
        }
    }

    pub fn set_raw(&self, key: &str, value: &Value) -> Result<(), StorageError> {
        let json = serde_json::to_string(value).map_err(|e| StorageError::SerializeFailed {
            key: key.to_string(),
            source: e,
        })?;
        self.store.set(key, &json)
    }

    /// One-time migration: merge per-vehicle legacy reminder blobs into
    /// the unified collection. Returns `None` when there is nothing to
    /// migrate (the unified key exists, or no legacy blobs were found).
    fn migrate_legacy_reminders(&self, vehicles: &[Vehicle]) -> Option<Vec<Reminder>> {
        match self.store.get(keys::REMINDERS) {
            Ok(Some(_)) => return None,
            Ok(None) => {}
            Err(e) => {
                warn_degraded(keys::REMINDERS, &e.to_string());
                return None;
            }
        }

        let mut merged: Vec<Reminder> = Vec::new();
        let mut legacy_keys: Vec<String> = Vec::new();

        for vehicle in vehicles {
            let key = keys::legacy_reminders(vehicle.id);
            match self.store.get(&key) {
                Ok(Some(raw)) => match serde_json::from_str::<Vec<Reminder>>(&raw) {
                    Ok(mut reminders) => {
                        merged.append(&mut reminders);
                        legacy_keys.push(key);
                    }
                    Err(e) => warn_degraded(&key, &e.to_string()),
                },
                Ok(None) => {}
                Err(e) => warn_degraded(&key, &e.to_string()),
            }
        }

        if legacy_keys.is_empty() {
            return None;
        }

        // Persist under the unified key before dropping the legacy blobs;
        // a failure here leaves the legacy data in place for the next run.
        if let Err(e) = self.save_reminders(&merged) {
            warn_degraded(keys::REMINDERS, &e.to_string());
            return Some(merged);
        }
        let key_refs: Vec<&str> = legacy_keys.iter().map(String::as_str).collect();
        if let Err(e) = self.store.remove(&key_refs) {
            warn_degraded(keys::REMINDERS, &e.to_string());
        }

        Some(merged)
    }

    fn load_collection<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        match self.store.get(key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(items) => items,
                Err(e) => {
                    warn_degraded(key, &e.to_string());
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn_degraded(key, &e.to_string());
                Vec::new()
            }
        }
    }

    fn save_collection<T: Serialize>(&self, key: &str, items: &[T]) -> Result<(), StorageError> {
        let json = serde_json::to_string(items).map_err(|e| StorageError::SerializeFailed {
            key: key.to_string(),
            source: e,
        })?;
        self.store.set(key, &json)
    }
}

fn warn_degraded(key: &str, detail: &str) {
    eprintln!(
        "{} could not read '{}', continuing with empty data: {}",
        "Warning:".yellow().bold(),
        key,
        detail
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStore;
    use std::path::PathBuf;
    use uuid::Uuid;

    fn repo_with(seed: &[(&str, &str)]) -> Repository<MemoryStore> {
        let store = MemoryStore::new();
        for (key, value) in seed {
            store.seed(key, value);
        }
        Repository::new(store)
    }

    #[test]
    fn test_load_all_defaults_missing_keys_to_empty() {
        let repo = repo_with(&[]);

        let store = repo.load_all();

        assert!(store.vehicles.is_empty());
        assert!(store.tasks.is_empty());
        assert!(store.records.is_empty());
        assert!(store.fuel_logs.is_empty());
        assert!(store.reminders.is_empty());
    }

    #[test]
    fn test_unparseable_collection_degrades_to_empty_without_aborting_load() {
        let vehicle = Vehicle {
            id: Uuid::new_v4(),
            make: String::from("Honda"),
            model: String::from("Civic"),
            ..Vehicle::default()
        };
        let vehicles_json = serde_json::to_string(&[vehicle.clone()]).unwrap();
        let repo = repo_with(&[
            (keys::VEHICLES, &vehicles_json),
            (keys::RECORDS, "{ not json ["),
        ]);

        let store = repo.load_all();

        assert_eq!(store.vehicles.len(), 1);
        assert_eq!(store.vehicles[0].id, vehicle.id);
        assert!(store.records.is_empty());
    }

    #[test]
    fn test_save_then_load_round_trips_a_collection() {
        let repo = repo_with(&[]);
        let vehicle = Vehicle {
            id: Uuid::new_v4(),
            make: String::from("Toyota"),
            model: String::from("Hilux"),
            current_mileage: 82000,
            ..Vehicle::default()
        };

        repo.save_vehicles(&[vehicle.clone()]).unwrap();
        let store = repo.load_all();

        assert_eq!(store.vehicles.len(), 1);
        assert_eq!(store.vehicles[0].current_mileage, 82000);
    }

    #[test]
    fn test_legacy_reminders_are_merged_and_legacy_keys_removed() {
        let vehicle_a = Vehicle {
            id: Uuid::new_v4(),
            ..Vehicle::default()
        };
        let vehicle_b = Vehicle {
            id: Uuid::new_v4(),
            ..Vehicle::default()
        };
        let reminder_a = Reminder {
            id: Uuid::new_v4(),
            vehicle_id: vehicle_a.id,
            text: String::from("Renew insurance"),
            ..Reminder::default()
        };
        let reminder_b = Reminder {
            id: Uuid::new_v4(),
            vehicle_id: vehicle_b.id,
            text: String::from("Check tire pressure"),
            ..Reminder::default()
        };

        let store = MemoryStore::new();
        store.seed(
            keys::VEHICLES,
            &serde_json::to_string(&[vehicle_a.clone(), vehicle_b.clone()]).unwrap(),
        );
        store.seed(
            &keys::legacy_reminders(vehicle_a.id),
            &serde_json::to_string(&[reminder_a.clone()]).unwrap(),
        );
        store.seed(
            &keys::legacy_reminders(vehicle_b.id),
            &serde_json::to_string(&[reminder_b.clone()]).unwrap(),
        );
        let repo = Repository::new(store);

        let loaded = repo.load_all();

        assert_eq!(loaded.reminders.len(), 2);
        assert_eq!(loaded.reminders[0].id, reminder_a.id);
        assert_eq!(loaded.reminders[1].id, reminder_b.id);

        // Unified key persisted, legacy keys gone, second load stable
        assert!(repo.store.contains_key(keys::REMINDERS));
        assert!(!repo.store.contains_key(&keys::legacy_reminders(vehicle_a.id)));
        let again = repo.load_all();
        assert_eq!(again.reminders.len(), 2);
    }

    #[test]
    fn test_migration_skipped_when_unified_key_exists() {
        let vehicle = Vehicle {
            id: Uuid::new_v4(),
            ..Vehicle::default()
        };
        let legacy = Reminder {
            id: Uuid::new_v4(),
            vehicle_id: vehicle.id,
            ..Reminder::default()
        };

        let store = MemoryStore::new();
        store.seed(
            keys::VEHICLES,
            &serde_json::to_string(&[vehicle.clone()]).unwrap(),
        );
        store.seed(keys::REMINDERS, "[]");
        store.seed(
            &keys::legacy_reminders(vehicle.id),
            &serde_json::to_string(&[legacy]).unwrap(),
        );
        let repo = Repository::new(store);

        let loaded = repo.load_all();

        assert!(loaded.reminders.is_empty());
        assert!(repo.store.contains_key(&keys::legacy_reminders(vehicle.id)));
    }

    #[test]
    fn test_snapshot_round_trips_and_clear_removes_it() {
        let repo = repo_with(&[]);
        let snapshot = Store {
            vehicles: vec![Vehicle {
                id: Uuid::new_v4(),
                make: String::from("Mazda"),
                ..Vehicle::default()
            }],
            ..Store::default()
        };

        repo.save_snapshot(&snapshot).unwrap();
        let loaded = repo.load_snapshot().unwrap();
        assert_eq!(loaded.vehicles.len(), 1);
        assert_eq!(loaded.vehicles[0].id, snapshot.vehicles[0].id);

        repo.clear_snapshot().unwrap();
        assert!(repo.load_snapshot().is_none());
    }

    #[test]
    fn test_corrupt_snapshot_degrades_to_none() {
        let repo = repo_with(&[(keys::SNAPSHOT, "{ not json [")]);

        assert!(repo.load_snapshot().is_none());
    }

    #[test]
    fn test_read_error_degrades_to_empty() {
        struct FailingStore;
        impl KvStore for FailingStore {
            fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
                Err(StorageError::ReadFailed {
                    key: key.to_string(),
                    path: PathBuf::from("/nowhere"),
                    source: std::io::Error::other("disk on fire"),
                })
            }
            fn set(&self, _: &str, _: &str) -> Result<(), StorageError> {
                Ok(())
            }
            fn remove(&self, _: &[&str]) -> Result<(), StorageError> {
                Ok(())
            }
        }

        let repo = Repository::new(FailingStore);
        let store = repo.load_all();

        assert!(store.vehicles.is_empty());
        assert!(store.reminders.is_empty());
    }
}
