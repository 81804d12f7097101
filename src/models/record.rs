use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::task::TaskType;

/// A completed piece of maintenance. Immutable once created except via an
/// explicit update operation.
#[derive(Serialize, Deserialize, Default, Clone, Debug)]
pub struct MaintenanceRecord {
    /// UUID to identify the record
    pub id: Uuid,
    /// The vehicle the work was done on
    pub vehicle_id: Uuid,
    /// The scheduled task this record completes, if any. A back-reference,
    /// not ownership.
    pub task_id: Option<Uuid>,
    /// What kind of maintenance was done
    pub kind: TaskType,
    /// When the work was done
    pub date: Timestamp,
    /// Odometer reading when the work was done
    pub mileage: u32,
    /// What it cost, if tracked
    pub cost: Option<f64>,
    /// Where the work was done
    pub location: Option<String>,
    /// Free-form notes
    pub notes: Option<String>,
    /// When the record was created
    pub created_at: Timestamp,
}
