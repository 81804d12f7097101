use std::collections::BTreeMap;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    models::{
        fuel_log::FuelLog, record::MaintenanceRecord, reminder::Reminder, task::MaintenanceTask,
        vehicle::Vehicle,
    },
    repository::{Repository, keys},
    state::App,
    storage::{KvStore, StorageError},
};

pub const BACKUP_VERSION: u32 = 1;

/// Full-dataset backup file. Every field other than `version` may be
/// absent; an absent collection is left untouched on import. The
/// preference-family blobs and the image map pass through opaquely.
#[derive(Serialize, Deserialize, Default, Debug)]
#[serde(rename_all = "camelCase", default)]
pub struct Backup {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicles: Option<Vec<Vehicle>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<MaintenanceTask>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<Vec<MaintenanceRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_logs: Option<Vec<FuelLog>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminders: Option<Vec<Reminder>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notifications: Option<Value>,
    /// filename -> base64 content; carried through untouched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_date: Option<Timestamp>,
    pub version: u32,
}

/// Gather the live collections and the opaque preference blobs into a
/// backup, stamped with the export time.
pub fn export<S: KvStore>(app: &App, repo: &Repository<S>) -> Backup {
    Backup {
        vehicles: Some(app.store.vehicles.clone()),
        tasks: Some(app.store.tasks.clone()),
        records: Some(app.store.records.clone()),
        fuel_logs: Some(app.store.fuel_logs.clone()),
        reminders: Some(app.store.reminders.clone()),
        preferences: repo.get_raw(keys::PREFERENCES),
        theme: repo.get_raw(keys::THEME),
        language: repo.get_raw(keys::LANGUAGE),
        notifications: repo.get_raw(keys::NOTIFICATIONS_ENABLED),
        images: None,
        export_date: Some(Timestamp::now()),
        version: BACKUP_VERSION,
    }
}

/// Which collections an import replaced
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub vehicles: Option<usize>,
    pub tasks: Option<usize>,
    pub records: Option<usize>,
    pub fuel_logs: Option<usize>,
    pub reminders: Option<usize>,
}

/// Apply a backup: each present collection replaces its counterpart
/// wholesale (persisted, then applied in memory); absent collections are
/// untouched. The whole import is one snapshot, so a single undo reverts
/// it.
pub fn import<S: KvStore>(
    backup: Backup,
    app: &mut App,
    repo: &Repository<S>,
) -> Result<ImportSummary, StorageError> {
    app.take_snapshot(repo)?;

    let mut summary = ImportSummary::default();

    if let Some(vehicles) = backup.vehicles {
        repo.save_vehicles(&vehicles)?;
        summary.vehicles = Some(vehicles.len());
        app.store.vehicles = vehicles;
    }
    if let Some(tasks) = backup.tasks {
        repo.save_tasks(&tasks)?;
        summary.tasks = Some(tasks.len());
        app.store.tasks = tasks;
    }
    if let Some(records) = backup.records {
        repo.save_records(&records)?;
        summary.records = Some(records.len());
        app.store.records = records;
    }
    if let Some(fuel_logs) = backup.fuel_logs {
        repo.save_fuel_logs(&fuel_logs)?;
        summary.fuel_logs = Some(fuel_logs.len());
        app.store.fuel_logs = fuel_logs;
    }
    if let Some(reminders) = backup.reminders {
        repo.save_reminders(&reminders)?;
        summary.reminders = Some(reminders.len());
        app.store.reminders = reminders;
    }

    if let Some(preferences) = &backup.preferences {
        repo.set_raw(keys::PREFERENCES, preferences)?;
    }
    if let Some(theme) = &backup.theme {
        repo.set_raw(keys::THEME, theme)?;
    }
    if let Some(language) = &backup.language {
        repo.set_raw(keys::LANGUAGE, language)?;
    }
    if let Some(notifications) = &backup.notifications {
        repo.set_raw(keys::NOTIFICATIONS_ENABLED, notifications)?;
    }

    Ok(summary)
}
