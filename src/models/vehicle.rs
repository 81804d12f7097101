use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Default, Clone, Debug)]
pub struct Vehicle {
    /// UUID to identify the vehicle
    pub id: Uuid,
    /// Manufacturer, e.g. "Honda"
    pub make: String,
    /// Model name, e.g. "Civic"
    pub model: String,
    /// Model year
    pub year: u16,
    /// Last known odometer reading. Monotonic non-decreasing by convention;
    /// raised opportunistically when a record reports a higher reading.
    pub current_mileage: u32,
    /// Category of the vehicle
    pub category: VehicleCategory,
    /// Archived vehicles are hidden from the default listings but keep
    /// their history
    pub archived: bool,
    /// When the vehicle was created
    pub created_at: Timestamp,
    /// When the vehicle was last updated
    pub updated_at: Timestamp,
}

impl Vehicle {
    /// Human-facing name used by listings and fuzzy resolution
    pub fn display_name(&self) -> String {
        format!("{} {}", self.make, self.model)
    }
}

#[derive(Serialize, Deserialize, Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum VehicleCategory {
    #[default]
    Car,
    Motorcycle,
    Truck,
    Other,
}

impl VehicleCategory {
    pub const ALL: [VehicleCategory; 4] = [
        VehicleCategory::Car,
        VehicleCategory::Motorcycle,
        VehicleCategory::Truck,
        VehicleCategory::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            VehicleCategory::Car => "Car",
            VehicleCategory::Motorcycle => "Motorcycle",
            VehicleCategory::Truck => "Truck",
            VehicleCategory::Other => "Other",
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown vehicle category '{0}'. Expected one of: car, motorcycle, truck, other")]
pub struct ParseVehicleCategoryError(String);

impl std::str::FromStr for VehicleCategory {
    type Err = ParseVehicleCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "car" => Ok(VehicleCategory::Car),
            "motorcycle" => Ok(VehicleCategory::Motorcycle),
            "truck" => Ok(VehicleCategory::Truck),
            "other" => Ok(VehicleCategory::Other),
            _ => Err(ParseVehicleCategoryError(s.to_string())),
        }
    }
}
