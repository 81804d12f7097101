use std::cmp::Ordering;

use jiff::Timestamp;
use uuid::Uuid;

use crate::models::{
    task::{MaintenanceTask, Schedule},
    vehicle::Vehicle,
};

/// Warning window: a task within this many days of its next occurrence
/// counts as due. Policy constant, not per-task configuration.
pub const DUE_SOON_DAYS: i64 = 7;
/// Warning window for mileage schedules, in distance units.
pub const DUE_SOON_MILES: i64 = 500;

const MS_PER_DAY: i64 = 86_400_000;

/// `i64::div_ceil` is not stable on this toolchain; same semantics
/// (rounds toward positive infinity) for a positive divisor.
const fn div_ceil(lhs: i64, rhs: i64) -> i64 {
    let q = lhs / rhs;
    let r = lhs % rhs;
    if r != 0 && (r > 0) == (rhs > 0) { q + 1 } else { q }
}

/// One row of the due view: the task, its vehicle, and the remaining
/// time or distance (exactly one of the two, matching the schedule).
pub struct UpcomingTask<'a> {
    pub task: &'a MaintenanceTask,
    pub vehicle: &'a Vehicle,
    pub is_due: bool,
    pub days_until_due: Option<i64>,
    pub miles_until_due: Option<i64>,
}

impl UpcomingTask<'_> {
    /// Stricter sub-state of due: the occurrence has literally passed.
    pub fn is_overdue(&self) -> bool {
        self.days_until_due.is_some_and(|d| d <= 0) || self.miles_until_due.is_some_and(|m| m <= 0)
    }
}

/// Compute the due view for the given tasks, optionally scoped to one
/// vehicle. Pure: `now` is an explicit input. Completed tasks and tasks
/// whose vehicle no longer exists are dropped.
///
/// Ordering: due tasks first; within equal due-ness ascending remaining
/// days when both sides have a date schedule, else ascending remaining
/// miles when both have a mileage schedule. A date/mileage pair has no
/// principled order and keeps its input order (the sort is stable).
pub fn upcoming_tasks<'a>(
    tasks: &'a [MaintenanceTask],
    vehicles: &'a [Vehicle],
    vehicle_id: Option<Uuid>,
    now: Timestamp,
) -> Vec<UpcomingTask<'a>> {
    let mut upcoming: Vec<UpcomingTask<'a>> = tasks
        .iter()
        .filter(|t| !t.is_completed)
        .filter(|t| vehicle_id.is_none_or(|id| t.vehicle_id == id))
        .filter_map(|task| {
            let vehicle = vehicles.iter().find(|v| v.id == task.vehicle_id)?;
            Some(match &task.schedule {
                Schedule::Date { next_due_date, .. } => {
                    let days = div_ceil(
                        next_due_date.as_millisecond() - now.as_millisecond(),
                        MS_PER_DAY,
                    );
                    UpcomingTask {
                        task,
                        vehicle,
                        is_due: days <= DUE_SOON_DAYS,
                        days_until_due: Some(days),
                        miles_until_due: None,
                    }
                }
                Schedule::Mileage {
                    next_due_mileage, ..
                } => {
                    let miles = i64::from(*next_due_mileage) - i64::from(vehicle.current_mileage);
                    UpcomingTask {
                        task,
                        vehicle,
                        is_due: miles <= DUE_SOON_MILES,
                        days_until_due: None,
                        miles_until_due: Some(miles),
                    }
                }
            })
        })
        .collect();

    upcoming.sort_by(|a, b| {
        b.is_due
            .cmp(&a.is_due)
            .then_with(|| match (a.days_until_due, b.days_until_due) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => match (a.miles_until_due, b.miles_until_due) {
                    (Some(x), Some(y)) => x.cmp(&y),
                    _ => Ordering::Equal,
                },
            })
    });

    upcoming
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::SignedDuration;

    fn vehicle_at(mileage: u32) -> Vehicle {
        Vehicle {
            id: Uuid::new_v4(),
            make: String::from("Honda"),
            model: String::from("Civic"),
            current_mileage: mileage,
            ..Vehicle::default()
        }
    }

    fn mileage_task(vehicle: &Vehicle, next_due: u32) -> MaintenanceTask {
        MaintenanceTask {
            id: Uuid::new_v4(),
            vehicle_id: vehicle.id,
            schedule: Schedule::Mileage {
                interval_value: 5000,
                last_completed_mileage: None,
                next_due_mileage: next_due,
            },
            is_recurring: true,
            ..MaintenanceTask::default()
        }
    }

    fn date_task(vehicle: &Vehicle, next_due: Timestamp) -> MaintenanceTask {
        MaintenanceTask {
            id: Uuid::new_v4(),
            vehicle_id: vehicle.id,
            schedule: Schedule::Date {
                interval_value: 180,
                last_completed_date: None,
                next_due_date: next_due,
            },
            is_recurring: true,
            ..MaintenanceTask::default()
        }
    }

    fn days_from(now: Timestamp, days: i64) -> Timestamp {
        now.checked_add(SignedDuration::from_hours(days * 24)).unwrap()
    }

    #[test]
    fn test_date_due_boundary_at_seven_days() {
        let now = Timestamp::now();
        let vehicle = vehicle_at(10000);
        let at_seven = date_task(&vehicle, days_from(now, 7));
        let at_eight = date_task(&vehicle, days_from(now, 8));

        let vehicles = vec![vehicle];
        let tasks = vec![at_seven.clone(), at_eight.clone()];
        let upcoming = upcoming_tasks(&tasks, &vehicles, None, now);

        let seven = upcoming.iter().find(|u| u.task.id == at_seven.id).unwrap();
        let eight = upcoming.iter().find(|u| u.task.id == at_eight.id).unwrap();
        assert!(seven.is_due);
        assert_eq!(seven.days_until_due, Some(7));
        assert!(!eight.is_due);
        assert_eq!(eight.days_until_due, Some(8));
    }

    #[test]
    fn test_mileage_due_boundary_at_five_hundred_miles() {
        let now = Timestamp::now();
        let vehicle = vehicle_at(44500);
        let at_500 = mileage_task(&vehicle, 45000);
        let at_501 = mileage_task(&vehicle, 45001);

        let vehicles = vec![vehicle];
        let tasks = vec![at_500.clone(), at_501.clone()];
        let upcoming = upcoming_tasks(&tasks, &vehicles, None, now);

        let near = upcoming.iter().find(|u| u.task.id == at_500.id).unwrap();
        let far = upcoming.iter().find(|u| u.task.id == at_501.id).unwrap();
        assert!(near.is_due);
        assert_eq!(near.miles_until_due, Some(500));
        assert!(!far.is_due);
        assert_eq!(far.miles_until_due, Some(501));
    }

    #[test]
    fn test_due_tasks_sort_before_non_due_tasks() {
        let now = Timestamp::now();
        let vehicle = vehicle_at(10000);
        let tasks = vec![
            date_task(&vehicle, days_from(now, 30)),
            mileage_task(&vehicle, 10200),
            date_task(&vehicle, days_from(now, 3)),
            mileage_task(&vehicle, 25000),
        ];

        let vehicles = vec![vehicle];
        let upcoming = upcoming_tasks(&tasks, &vehicles, None, now);

        assert_eq!(upcoming.len(), 4);
        let first_non_due = upcoming.iter().position(|u| !u.is_due).unwrap();
        assert!(
            upcoming[first_non_due..].iter().all(|u| !u.is_due),
            "Due tasks must all sort before non-due tasks"
        );
        assert_eq!(first_non_due, 2);
    }

    #[test]
    fn test_same_unit_tasks_sort_by_ascending_remainder() {
        let now = Timestamp::now();
        let vehicle = vehicle_at(10000);
        let far = mileage_task(&vehicle, 10400);
        let near = mileage_task(&vehicle, 10100);

        let vehicles = vec![vehicle];
        let tasks = vec![far.clone(), near.clone()];
        let upcoming = upcoming_tasks(&tasks, &vehicles, None, now);

        assert_eq!(upcoming[0].task.id, near.id);
        assert_eq!(upcoming[1].task.id, far.id);
    }

    #[test]
    fn test_mixed_unit_tasks_keep_input_order() {
        let now = Timestamp::now();
        let vehicle = vehicle_at(10000);
        let by_date = date_task(&vehicle, days_from(now, 2));
        let by_mileage = mileage_task(&vehicle, 10100);

        let vehicles = vec![vehicle];
        let tasks = vec![by_date.clone(), by_mileage.clone()];
        let upcoming = upcoming_tasks(&tasks, &vehicles, None, now);

        assert_eq!(upcoming[0].task.id, by_date.id);
        assert_eq!(upcoming[1].task.id, by_mileage.id);
    }

    #[test]
    fn test_completed_and_orphaned_tasks_are_dropped() {
        let now = Timestamp::now();
        let vehicle = vehicle_at(10000);
        let mut completed = mileage_task(&vehicle, 10100);
        completed.is_completed = true;
        let mut orphan = mileage_task(&vehicle, 10100);
        orphan.vehicle_id = Uuid::new_v4();

        let vehicles = vec![vehicle];
        let tasks = vec![completed, orphan];
        let upcoming = upcoming_tasks(&tasks, &vehicles, None, now);

        assert!(upcoming.is_empty());
    }

    #[test]
    fn test_vehicle_scope_filters_other_vehicles() {
        let now = Timestamp::now();
        let mine = vehicle_at(10000);
        let other = vehicle_at(50000);
        let my_task = mileage_task(&mine, 10100);
        let other_task = mileage_task(&other, 50100);

        let mine_id = mine.id;
        let vehicles = vec![mine, other];
        let tasks = vec![my_task.clone(), other_task];
        let upcoming = upcoming_tasks(&tasks, &vehicles, Some(mine_id), now);

        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].task.id, my_task.id);
    }

    #[test]
    fn test_overdue_is_a_stricter_substate_of_due() {
        let now = Timestamp::now();
        let vehicle = vehicle_at(45200);
        let passed = mileage_task(&vehicle, 45000);
        let soon = mileage_task(&vehicle, 45400);

        let vehicles = vec![vehicle];
        let tasks = vec![passed.clone(), soon.clone()];
        let upcoming = upcoming_tasks(&tasks, &vehicles, None, now);

        let passed_row = upcoming.iter().find(|u| u.task.id == passed.id).unwrap();
        let soon_row = upcoming.iter().find(|u| u.task.id == soon.id).unwrap();
        assert!(passed_row.is_due && passed_row.is_overdue());
        assert!(soon_row.is_due && !soon_row.is_overdue());
    }
}
