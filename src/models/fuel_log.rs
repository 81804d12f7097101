use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Default, Clone, Debug)]
pub struct FuelLog {
    /// UUID to identify the fill-up
    pub id: Uuid,
    /// The vehicle that was filled
    pub vehicle_id: Uuid,
    /// When the fill-up happened
    pub date: Timestamp,
    /// What went in the tank (or battery)
    pub fuel_type: FuelType,
    /// Liters, or kWh for electric
    pub volume: f64,
    /// Total paid for the fill-up
    pub total_cost: f64,
    /// Derived at creation: total_cost / volume, 0 when volume is 0
    pub price_per_unit: f64,
    /// Where the fill-up happened
    pub station: Option<String>,
    /// Free-form notes
    pub notes: Option<String>,
    /// When the log entry was created
    pub created_at: Timestamp,
}

impl FuelLog {
    /// Display unit for the volume field
    pub fn unit(&self) -> &'static str {
        if self.fuel_type == FuelType::Electric {
            "kWh"
        } else {
            "L"
        }
    }
}

#[derive(Serialize, Deserialize, Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FuelType {
    #[default]
    Gasoline,
    Diesel,
    Electric,
    Other,
}

impl FuelType {
    pub fn label(&self) -> &'static str {
        match self {
            FuelType::Gasoline => "Gasoline",
            FuelType::Diesel => "Diesel",
            FuelType::Electric => "Electric",
            FuelType::Other => "Other",
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown fuel type '{0}'. Expected one of: gasoline, diesel, electric, other")]
pub struct ParseFuelTypeError(String);

impl std::str::FromStr for FuelType {
    type Err = ParseFuelTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gasoline" | "gas" | "petrol" => Ok(FuelType::Gasoline),
            "diesel" => Ok(FuelType::Diesel),
            "electric" | "ev" => Ok(FuelType::Electric),
            "other" => Ok(FuelType::Other),
            _ => Err(ParseFuelTypeError(s.to_string())),
        }
    }
}
