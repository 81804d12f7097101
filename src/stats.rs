use jiff::Timestamp;
use uuid::Uuid;

use crate::models::{
    fuel_log::{FuelLog, FuelType},
    record::MaintenanceRecord,
    task::TaskType,
    vehicle::{Vehicle, VehicleCategory},
};

/// Month length used for the average-monthly-spend approximation
const DAYS_PER_MONTH: f64 = 30.44;
const MS_PER_DAY: f64 = 86_400_000.0;

/// The one place the "missing cost counts as zero" rule lives.
pub fn cost_or_zero(record: &MaintenanceRecord) -> f64 {
    record.cost.unwrap_or(0.0)
}

fn local_date(ts: Timestamp) -> jiff::civil::Date {
    jiff::Zoned::new(ts, jiff::tz::TimeZone::system()).date()
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct OverallStats {
    pub total_spent: f64,
    pub total_records: usize,
    pub year_spent: f64,
    pub year_records: usize,
    pub avg_monthly_spend: f64,
    pub most_frequent_kind: Option<TaskType>,
    pub most_expensive_kind: Option<TaskType>,
}

/// Reduce all records into the overview card. Deterministic and
/// side-effect free; `now` anchors the calendar-year bucket.
pub fn overall_stats(records: &[MaintenanceRecord], now: Timestamp) -> OverallStats {
    if records.is_empty() {
        return OverallStats::default();
    }

    let total_spent: f64 = records.iter().map(cost_or_zero).sum();

    let current_year = local_date(now).year();
    let (year_spent, year_records) = records
        .iter()
        .filter(|r| local_date(r.date).year() == current_year)
        .fold((0.0, 0), |(spent, count), r| {
            (spent + cost_or_zero(r), count + 1)
        });

    let oldest = records.iter().map(|r| r.date).min().unwrap_or(now);
    let newest = records.iter().map(|r| r.date).max().unwrap_or(now);
    let span_days = (newest.as_millisecond() - oldest.as_millisecond()) as f64 / MS_PER_DAY;
    let months_spanned = (span_days / DAYS_PER_MONTH).max(1.0);
    let avg_monthly_spend = total_spent / months_spanned;

    // Accumulate per kind in first-seen order; the strict `>` below makes
    // ties resolve to the earliest-seen kind.
    let mut per_kind: Vec<(TaskType, usize, f64)> = Vec::new();
    for record in records {
        match per_kind.iter_mut().find(|(kind, _, _)| *kind == record.kind) {
            Some((_, count, spent)) => {
                *count += 1;
                *spent += cost_or_zero(record);
            }
            None => per_kind.push((record.kind, 1, cost_or_zero(record))),
        }
    }

    let mut most_frequent_kind = None;
    let mut best_count = 0usize;
    let mut most_expensive_kind = None;
    let mut best_spent = f64::NEG_INFINITY;
    for (kind, count, spent) in &per_kind {
        if *count > best_count {
            best_count = *count;
            most_frequent_kind = Some(*kind);
        }
        if *spent > best_spent {
            best_spent = *spent;
            most_expensive_kind = Some(*kind);
        }
    }

    OverallStats {
        total_spent,
        total_records: records.len(),
        year_spent,
        year_records,
        avg_monthly_spend,
        most_frequent_kind,
        most_expensive_kind,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VehicleSpend {
    pub vehicle_id: Uuid,
    pub name: String,
    pub record_count: usize,
    pub total_spent: f64,
}

/// Per-vehicle spend, sorted by total spend descending. Every vehicle
/// gets a row, including ones with no records yet.
pub fn vehicle_stats(records: &[MaintenanceRecord], vehicles: &[Vehicle]) -> Vec<VehicleSpend> {
    let mut rows: Vec<VehicleSpend> = vehicles
        .iter()
        .map(|vehicle| {
            let owned = records.iter().filter(|r| r.vehicle_id == vehicle.id);
            let (count, spent) = owned.fold((0, 0.0), |(c, s), r| (c + 1, s + cost_or_zero(r)));
            VehicleSpend {
                vehicle_id: vehicle.id,
                name: vehicle.display_name(),
                record_count: count,
                total_spent: spent,
            }
        })
        .collect();
    rows.sort_by(|a, b| b.total_spent.total_cmp(&a.total_spent));
    rows
}

#[derive(Debug, Clone, PartialEq)]
pub struct KindVehicleSpend {
    pub vehicle_id: Uuid,
    pub name: String,
    pub record_count: usize,
    pub total_spent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KindSpend {
    pub kind: TaskType,
    pub record_count: usize,
    pub total_spent: f64,
    /// Which vehicles this kind of work was done on, by count descending
    pub per_vehicle: Vec<KindVehicleSpend>,
}

/// Per-maintenance-type breakdown with a nested per-vehicle split,
/// outer rows by count descending.
pub fn kind_stats(records: &[MaintenanceRecord], vehicles: &[Vehicle]) -> Vec<KindSpend> {
    let mut rows: Vec<KindSpend> = Vec::new();

    for record in records {
        let row = match rows.iter_mut().find(|row| row.kind == record.kind) {
            Some(row) => row,
            None => {
                rows.push(KindSpend {
                    kind: record.kind,
                    record_count: 0,
                    total_spent: 0.0,
                    per_vehicle: Vec::new(),
                });
                rows.last_mut().unwrap()
            }
        };
        row.record_count += 1;
        row.total_spent += cost_or_zero(record);

        let name = vehicles
            .iter()
            .find(|v| v.id == record.vehicle_id)
            .map(Vehicle::display_name)
            .unwrap_or_else(|| String::from("(removed vehicle)"));
        match row
            .per_vehicle
            .iter_mut()
            .find(|v| v.vehicle_id == record.vehicle_id)
        {
            Some(entry) => {
                entry.record_count += 1;
                entry.total_spent += cost_or_zero(record);
            }
            None => row.per_vehicle.push(KindVehicleSpend {
                vehicle_id: record.vehicle_id,
                name,
                record_count: 1,
                total_spent: cost_or_zero(record),
            }),
        }
    }

    for row in &mut rows {
        row.per_vehicle.sort_by(|a, b| b.record_count.cmp(&a.record_count));
    }
    rows.sort_by(|a, b| b.record_count.cmp(&a.record_count));
    rows
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategorySpend {
    pub category: VehicleCategory,
    pub vehicle_count: usize,
    pub record_count: usize,
    pub total_spent: f64,
}

/// Spend per vehicle category. Categories with no vehicles and no
/// records are dropped; the rest sort by total spend descending.
pub fn category_stats(vehicles: &[Vehicle], records: &[MaintenanceRecord]) -> Vec<CategorySpend> {
    let mut rows: Vec<CategorySpend> = VehicleCategory::ALL
        .iter()
        .map(|&category| {
            let ids: Vec<Uuid> = vehicles
                .iter()
                .filter(|v| v.category == category)
                .map(|v| v.id)
                .collect();
            let owned = records.iter().filter(|r| ids.contains(&r.vehicle_id));
            let (count, spent) = owned.fold((0, 0.0), |(c, s), r| (c + 1, s + cost_or_zero(r)));
            CategorySpend {
                category,
                vehicle_count: ids.len(),
                record_count: count,
                total_spent: spent,
            }
        })
        .filter(|row| row.vehicle_count > 0 || row.record_count > 0)
        .collect();
    rows.sort_by(|a, b| b.total_spent.total_cmp(&a.total_spent));
    rows
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct FuelStats {
    pub fill_ups: usize,
    /// Volume of non-electric fill-ups, liters
    pub liters: f64,
    /// Volume of electric charges, kWh
    pub kwh: f64,
    pub total_cost: f64,
    pub avg_cost_per_fill: f64,
    pub last_fill: Option<Timestamp>,
}

pub fn fuel_stats(fuel_logs: &[FuelLog]) -> FuelStats {
    if fuel_logs.is_empty() {
        return FuelStats::default();
    }

    let mut stats = FuelStats {
        fill_ups: fuel_logs.len(),
        ..FuelStats::default()
    };
    for log in fuel_logs {
        if log.fuel_type == FuelType::Electric {
            stats.kwh += log.volume;
        } else {
            stats.liters += log.volume;
        }
        stats.total_cost += log.total_cost;
    }
    stats.avg_cost_per_fill = stats.total_cost / fuel_logs.len() as f64;
    stats.last_fill = fuel_logs.iter().map(|l| l.date).max();
    stats
}

#[derive(Debug, Clone, PartialEq)]
pub struct VehicleFuelSpend {
    pub vehicle_id: Uuid,
    pub name: String,
    pub fill_ups: usize,
    pub total_cost: f64,
}

/// Per-vehicle fuel spend, sorted by total cost descending.
pub fn vehicle_fuel_stats(fuel_logs: &[FuelLog], vehicles: &[Vehicle]) -> Vec<VehicleFuelSpend> {
    let mut rows: Vec<VehicleFuelSpend> = vehicles
        .iter()
        .map(|vehicle| {
            let owned = fuel_logs.iter().filter(|l| l.vehicle_id == vehicle.id);
            let (count, cost) = owned.fold((0, 0.0), |(c, s), l| (c + 1, s + l.total_cost));
            VehicleFuelSpend {
                vehicle_id: vehicle.id,
                name: vehicle.display_name(),
                fill_ups: count,
                total_cost: cost,
            }
        })
        .collect();
    rows.sort_by(|a, b| b.total_cost.total_cmp(&a.total_cost));
    rows
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySpend {
    pub year: i16,
    pub month: i8,
    pub record_count: usize,
    pub total_spent: f64,
}

/// The trailing 12 calendar months ending at `now`'s month, oldest
/// first, zero-filled for months with no records.
pub fn monthly_stats(records: &[MaintenanceRecord], now: Timestamp) -> Vec<MonthlySpend> {
    let anchor = local_date(now);
    let mut months: Vec<MonthlySpend> = Vec::with_capacity(12);
    let (mut year, mut month) = (anchor.year(), anchor.month());
    for _ in 0..12 {
        months.push(MonthlySpend {
            year,
            month,
            record_count: 0,
            total_spent: 0.0,
        });
        month -= 1;
        if month == 0 {
            month = 12;
            year -= 1;
        }
    }
    months.reverse();

    for record in records {
        let date = local_date(record.date);
        if let Some(bucket) = months
            .iter_mut()
            .find(|m| m.year == date.year() && m.month == date.month())
        {
            bucket.record_count += 1;
            bucket.total_spent += cost_or_zero(record);
        }
    }

    months
}
