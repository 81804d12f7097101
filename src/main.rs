use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::*;
use jiff::{SignedDuration, Timestamp};
use uuid::Uuid;

use crate::{
    models::{
        reminder::ReminderKind,
        task::Schedule,
        vehicle::Vehicle,
    },
    notify::ConsoleScheduler,
    repository::Repository,
    services::{
        fuel::{
            AddFuelLogParameters, UpdateFuelLogParameters, add_fuel_log, delete_fuel_log,
            update_fuel_log,
        },
        records::{
            AddRecordParameters, UpdateRecordParameters, add_record, delete_record,
            update_record,
        },
        reminders::{AddReminderParameters, add_reminder, delete_reminder},
        tasks::{AddTaskParameters, UpdateTaskParameters, add_task, delete_task, update_task},
        undo::restore_last_snapshot,
        vehicles::{
            AddVehicleParameters, UpdateVehicleParameters, add_vehicle, archive_vehicles,
            delete_vehicles, resolve_vehicle, unarchive_vehicles, update_vehicle,
        },
    },
    state::App,
    storage::json::JsonFileStore,
};

mod backup;
mod due;
mod models;
mod notify;
mod repository;
mod services;
mod state;
mod stats;
mod storage;
mod ui;

#[derive(Parser)]
#[command(
    name = "wrenchlog",
    about = "Track vehicle maintenance, fuel and reminders from your terminal"
)]
struct Cli {
    /// Override the data directory (defaults to the platform data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage vehicles
    #[command(subcommand)]
    Vehicle(VehicleCommands),

    /// Manage maintenance tasks
    #[command(subcommand)]
    Task(TaskCommands),

    /// Show tasks that are due or coming up
    Due {
        /// Limit to one vehicle (fuzzy name)
        #[arg(short, long)]
        vehicle: Option<String>,
    },

    /// Manage maintenance records
    #[command(subcommand)]
    Record(RecordCommands),

    /// Manage fuel logs
    #[command(subcommand)]
    Fuel(FuelCommands),

    /// Manage quick reminders
    #[command(subcommand)]
    Reminder(ReminderCommands),

    /// Show statistics
    #[command(subcommand)]
    Stats(StatsCommands),

    /// Undo the most recent change
    Undo,

    /// Export everything to a backup file
    Export { path: PathBuf },

    /// Import a backup file
    Import { path: PathBuf },
}

#[derive(Debug, Subcommand)]
enum VehicleCommands {
    /// Add a new vehicle
    Add {
        make: String,
        model: String,

        /// Model year
        #[arg(long)]
        year: u16,

        /// Current odometer reading
        #[arg(long, default_value_t = 0)]
        mileage: u32,

        /// car, motorcycle, truck, or other
        #[arg(long, default_value = "car")]
        category: String,
    },
    /// List vehicles
    List {
        /// Include archived vehicles
        #[arg(long)]
        all: bool,
    },
    /// Update a vehicle (fuzzy name)
    Update {
        name: String,

        #[arg(long)]
        make: Option<String>,

        #[arg(long)]
        model: Option<String>,

        #[arg(long)]
        year: Option<u16>,

        #[arg(long)]
        mileage: Option<u32>,

        #[arg(long)]
        category: Option<String>,
    },
    /// Archive vehicles (fuzzy names); history is kept
    Archive { names: Vec<String> },
    /// Bring archived vehicles back
    Unarchive { names: Vec<String> },
    /// Delete vehicles and all their tasks, records, and fuel logs
    Delete { names: Vec<String> },
}

#[derive(Debug, Subcommand)]
enum TaskCommands {
    /// Add a maintenance task
    Add {
        /// Vehicle (fuzzy name)
        vehicle: String,

        /// oil-change, tire-rotation, brake-service, air-filter,
        /// battery, inspection, or other
        kind: String,

        /// Recur every N distance units
        #[arg(long, conflicts_with = "every_days")]
        every_miles: Option<u32>,

        /// Recur every N days
        #[arg(long)]
        every_days: Option<u32>,

        /// First due odometer reading (defaults to current + interval)
        #[arg(long)]
        due_mileage: Option<u32>,

        /// First due in N days (defaults to the interval)
        #[arg(long)]
        due_in_days: Option<u32>,

        /// One-off: complete it once instead of recurring
        #[arg(long)]
        once: bool,
    },
    /// List tasks
    List {
        /// Limit to one vehicle (fuzzy name)
        #[arg(short, long)]
        vehicle: Option<String>,
    },
    /// Update a task by id
    Update {
        id: Uuid,

        #[arg(long)]
        kind: Option<String>,

        /// Mark the task completed
        #[arg(long, conflicts_with = "reopen")]
        complete: bool,

        /// Mark the task not completed
        #[arg(long)]
        reopen: bool,
    },
    /// Delete a task by id
    Delete { id: Uuid },
}

#[derive(Debug, Subcommand)]
enum RecordCommands {
    /// Record completed maintenance
    Add {
        /// Vehicle (fuzzy name)
        vehicle: String,

        /// What kind of maintenance was done
        kind: String,

        /// Odometer reading at the time of the work
        #[arg(long)]
        mileage: u32,

        /// Date of the work (e.g. "2026-03-01"), defaults to today
        #[arg(long)]
        date: Option<String>,

        /// What it cost
        #[arg(long)]
        cost: Option<f64>,

        /// Scheduled task this completes (advances or completes it)
        #[arg(long)]
        task: Option<Uuid>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },
    /// List records, newest first
    List {
        /// Limit to one vehicle (fuzzy name)
        #[arg(short, long)]
        vehicle: Option<String>,
    },
    /// Update a record by id
    Update {
        id: Uuid,

        #[arg(long)]
        kind: Option<String>,

        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        mileage: Option<u32>,

        #[arg(long)]
        cost: Option<f64>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a record by id
    Delete { id: Uuid },
}

#[derive(Debug, Subcommand)]
enum FuelCommands {
    /// Log a fill-up or charge
    Add {
        /// Vehicle (fuzzy name)
        vehicle: String,

        /// Liters (or kWh for electric)
        #[arg(long)]
        volume: f64,

        /// Total paid
        #[arg(long)]
        cost: f64,

        /// gasoline, diesel, electric, or other
        #[arg(long, default_value = "gasoline")]
        fuel: String,

        /// Date of the fill-up, defaults to today
        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        station: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },
    /// List fuel logs, newest first
    List {
        /// Limit to one vehicle (fuzzy name)
        #[arg(short, long)]
        vehicle: Option<String>,
    },
    /// Update a fuel log by id
    Update {
        id: Uuid,

        #[arg(long)]
        volume: Option<f64>,

        #[arg(long)]
        cost: Option<f64>,

        #[arg(long)]
        fuel: Option<String>,

        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        station: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a fuel log by id
    Delete { id: Uuid },
}

#[derive(Debug, Subcommand)]
enum ReminderCommands {
    /// Add a quick reminder
    Add {
        /// Vehicle (fuzzy name)
        vehicle: String,

        /// What to be reminded of
        text: String,

        /// Due date (e.g. "2026-03-01")
        #[arg(long, conflicts_with = "in_days")]
        due: Option<String>,

        /// Due in N days
        #[arg(long)]
        in_days: Option<i64>,

        /// Repeat every N seconds (makes the reminder recurring)
        #[arg(long)]
        every: Option<u64>,
    },
    /// List reminders
    List,
    /// Delete a reminder (fuzzy text match)
    Delete { text: String },
}

#[derive(Debug, Subcommand)]
enum StatsCommands {
    /// Totals, yearly figures, and most frequent/expensive types
    Overview,
    /// Spend per vehicle
    Vehicles,
    /// Spend per maintenance type, with a per-vehicle split
    Kinds,
    /// Spend per vehicle category
    Categories,
    /// Fill-up totals and per-vehicle fuel spend
    Fuel,
    /// Trailing 12 months of maintenance spend
    Monthly,
}

fn fail(e: impl std::fmt::Display) -> ! {
    eprintln!("{} {}", "Error:".red().bold(), e);
    std::process::exit(1);
}

/// Parse "YYYY-MM-DD" into a timestamp at local midnight
fn parse_date(input: &str) -> Timestamp {
    let date: jiff::civil::Date = input
        .parse()
        .unwrap_or_else(|e| fail(format!("Invalid date '{input}': {e}")));
    date.to_zoned(jiff::tz::TimeZone::system())
        .unwrap_or_else(|e| fail(format!("Invalid date '{input}': {e}")))
        .timestamp()
}

fn date_or_now(input: Option<String>) -> Timestamp {
    input.map(|s| parse_date(&s)).unwrap_or_else(Timestamp::now)
}

fn resolve(store: &models::store::Store, query: &str) -> Vehicle {
    resolve_vehicle(store, query)
        .unwrap_or_else(|e| fail(e))
        .clone()
}

fn resolve_many(store: &models::store::Store, queries: &[String]) -> Vec<Uuid> {
    queries.iter().map(|q| resolve(store, q).id).collect()
}

fn main() {
    let cli = Cli::parse();

    let data_dir = cli.data_dir.unwrap_or_else(|| {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wrenchlog")
    });

    let repo = Repository::new(JsonFileStore::new(data_dir));
    let mut app = App::load(&repo);
    let mut scheduler = ConsoleScheduler;

    match cli.command {
        Commands::Vehicle(command) => match command {
            VehicleCommands::Add {
                make,
                model,
                year,
                mileage,
                category,
            } => {
                let category = category.parse().unwrap_or_else(|e| fail(e));
                let vehicle = add_vehicle(
                    &mut app,
                    &repo,
                    AddVehicleParameters {
                        make,
                        model,
                        year,
                        current_mileage: mileage,
                        category,
                    },
                )
                .unwrap_or_else(|e| fail(e));
                println!("Added {} ({})", vehicle.display_name().bold(), vehicle.year);
            }
            VehicleCommands::List { all } => {
                let active: Vec<&Vehicle> = app.store.active_vehicles().collect();
                let archived: Vec<&Vehicle> =
                    app.store.vehicles.iter().filter(|v| v.archived).collect();

                if active.is_empty() && (!all || archived.is_empty()) {
                    println!("No vehicles yet. Add one with: wrenchlog vehicle add");
                } else {
                    ui::render_view_header("Vehicles", active.len(), "vehicle");
                    for vehicle in active {
                        ui::render_vehicle_line(vehicle);
                    }
                    if all && !archived.is_empty() {
                        ui::render_section_header("Archived");
                        for vehicle in archived {
                            ui::render_vehicle_line(vehicle);
                        }
                    }
                }
            }
            VehicleCommands::Update {
                name,
                make,
                model,
                year,
                mileage,
                category,
            } => {
                let id = resolve(&app.store, &name).id;
                let category =
                    category.map(|c| c.parse().unwrap_or_else(|e| fail(e)));
                let vehicle = update_vehicle(
                    &mut app,
                    &repo,
                    id,
                    UpdateVehicleParameters {
                        make,
                        model,
                        year,
                        current_mileage: mileage,
                        category,
                    },
                )
                .unwrap_or_else(|e| fail(e));
                println!("Updated {}", vehicle.display_name().bold());
            }
            VehicleCommands::Archive { names } => {
                let ids = resolve_many(&app.store, &names);
                let count =
                    archive_vehicles(&mut app, &repo, &ids).unwrap_or_else(|e| fail(e));
                println!("Archived {count} vehicle(s)");
            }
            VehicleCommands::Unarchive { names } => {
                let needle_ids: Vec<Uuid> = names
                    .iter()
                    .map(|name| {
                        let needle = name.to_lowercase();
                        let matching: Vec<&Vehicle> = app
                            .store
                            .vehicles
                            .iter()
                            .filter(|v| v.archived)
                            .filter(|v| v.display_name().to_lowercase().contains(&needle))
                            .collect();
                        match matching.len() {
                            1 => matching[0].id,
                            0 => fail(format!("Archived vehicle '{name}' not found")),
                            _ => fail(format!("Vehicle name '{name}' is ambiguous")),
                        }
                    })
                    .collect();
                let count = unarchive_vehicles(&mut app, &repo, &needle_ids)
                    .unwrap_or_else(|e| fail(e));
                println!("Unarchived {count} vehicle(s)");
            }
            VehicleCommands::Delete { names } => {
                let ids = resolve_many(&app.store, &names);
                let counts =
                    delete_vehicles(&mut app, &repo, &ids).unwrap_or_else(|e| fail(e));
                println!(
                    "Deleted {} vehicle(s) with {} task(s), {} record(s), {} fuel log(s). Run 'wrenchlog undo' to bring them back.",
                    ids.len(),
                    counts.tasks,
                    counts.records,
                    counts.fuel_logs
                );
            }
        },
        Commands::Task(command) => match command {
            TaskCommands::Add {
                vehicle,
                kind,
                every_miles,
                every_days,
                due_mileage,
                due_in_days,
                once,
            } => {
                let vehicle = resolve(&app.store, &vehicle);
                let kind = kind.parse().unwrap_or_else(|e| fail(e));
                let schedule = match (every_miles, every_days) {
                    (Some(interval), None) => Schedule::Mileage {
                        interval_value: interval,
                        last_completed_mileage: None,
                        next_due_mileage: due_mileage
                            .unwrap_or(vehicle.current_mileage + interval),
                    },
                    (None, Some(interval)) => {
                        let days = due_in_days.unwrap_or(interval);
                        let next_due_date = Timestamp::now()
                            .checked_add(SignedDuration::from_hours(i64::from(days) * 24))
                            .unwrap_or_else(|e| fail(e));
                        Schedule::Date {
                            interval_value: interval,
                            last_completed_date: None,
                            next_due_date,
                        }
                    }
                    _ => fail("Provide exactly one of --every-miles or --every-days"),
                };
                let task = add_task(
                    &mut app,
                    &repo,
                    AddTaskParameters {
                        vehicle_id: vehicle.id,
                        kind,
                        schedule,
                        is_recurring: !once,
                    },
                )
                .unwrap_or_else(|e| fail(e));
                println!(
                    "Added {} for {} ({})",
                    task.kind.label().bold(),
                    vehicle.display_name(),
                    task.id
                );
            }
            TaskCommands::List { vehicle } => {
                let scope = vehicle.map(|name| resolve(&app.store, &name).id);
                let tasks: Vec<_> = app
                    .store
                    .tasks
                    .iter()
                    .filter(|t| scope.is_none_or(|id| t.vehicle_id == id))
                    .collect();

                if tasks.is_empty() {
                    println!("No tasks");
                } else {
                    ui::render_view_header("Tasks", tasks.len(), "task");
                    for task in tasks {
                        let vehicle = app
                            .store
                            .vehicle(task.vehicle_id)
                            .map(|v| v.display_name())
                            .unwrap_or_else(|| String::from("(removed vehicle)"));
                        let due = match &task.schedule {
                            Schedule::Mileage {
                                next_due_mileage, ..
                            } => format!("due at {next_due_mileage} mi"),
                            Schedule::Date { next_due_date, .. } => {
                                format!("due {}", ui::format_date(*next_due_date))
                            }
                        };
                        let status = if task.is_completed { " (completed)" } else { "" };
                        println!(
                            "  {}  {} — {} · {}{}",
                            format!("{}", task.id).dimmed(),
                            task.kind.label().bold(),
                            vehicle,
                            due,
                            status.dimmed()
                        );
                    }
                }
            }
            TaskCommands::Update {
                id,
                kind,
                complete,
                reopen,
            } => {
                let kind = kind.map(|k| k.parse().unwrap_or_else(|e| fail(e)));
                let is_completed = match (complete, reopen) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                };
                let task = update_task(
                    &mut app,
                    &repo,
                    id,
                    UpdateTaskParameters {
                        kind,
                        is_completed,
                        ..Default::default()
                    },
                )
                .unwrap_or_else(|e| fail(e));
                println!("Updated {} ({})", task.kind.label().bold(), task.id);
            }
            TaskCommands::Delete { id } => {
                delete_task(&mut app, &repo, id).unwrap_or_else(|e| fail(e));
                println!("Deleted task {id}");
            }
        },
        Commands::Due { vehicle } => {
            let scope = vehicle.map(|name| resolve(&app.store, &name).id);
            let upcoming = due::upcoming_tasks(
                &app.store.tasks,
                &app.store.vehicles,
                scope,
                Timestamp::now(),
            );

            if upcoming.is_empty() {
                println!("Nothing coming up");
            } else {
                ui::render_view_header("Upcoming maintenance", upcoming.len(), "task");
                let (overdue, rest): (Vec<_>, Vec<_>) =
                    upcoming.iter().partition(|u| u.is_overdue());
                if !overdue.is_empty() {
                    ui::render_section_header("Overdue");
                    for row in &overdue {
                        ui::render_due_line(row);
                    }
                }
                for row in &rest {
                    ui::render_due_line(row);
                }
            }
        }
        Commands::Record(command) => match command {
            RecordCommands::Add {
                vehicle,
                kind,
                mileage,
                date,
                cost,
                task,
                location,
                notes,
            } => {
                let vehicle = resolve(&app.store, &vehicle);
                let kind = kind.parse().unwrap_or_else(|e| fail(e));
                let record = add_record(
                    &mut app,
                    &repo,
                    AddRecordParameters {
                        vehicle_id: vehicle.id,
                        task_id: task,
                        kind,
                        date: date_or_now(date),
                        mileage,
                        cost,
                        location,
                        notes,
                    },
                )
                .unwrap_or_else(|e| fail(e));
                println!(
                    "Recorded {} for {} at {} mi",
                    record.kind.label().bold(),
                    vehicle.display_name(),
                    record.mileage
                );
            }
            RecordCommands::List { vehicle } => {
                let scope = vehicle.map(|name| resolve(&app.store, &name).id);
                let mut records: Vec<_> = app
                    .store
                    .records
                    .iter()
                    .filter(|r| scope.is_none_or(|id| r.vehicle_id == id))
                    .collect();
                records.sort_by(|a, b| b.date.cmp(&a.date));

                if records.is_empty() {
                    println!("No records");
                } else {
                    ui::render_view_header("Maintenance records", records.len(), "record");
                    for record in records {
                        ui::render_record_line(record, &app.store);
                    }
                }
            }
            RecordCommands::Update {
                id,
                kind,
                date,
                mileage,
                cost,
                location,
                notes,
            } => {
                let kind = kind.map(|k| k.parse().unwrap_or_else(|e| fail(e)));
                let record = update_record(
                    &mut app,
                    &repo,
                    id,
                    UpdateRecordParameters {
                        kind,
                        date: date.map(|d| parse_date(&d)),
                        mileage,
                        cost,
                        location,
                        notes,
                    },
                )
                .unwrap_or_else(|e| fail(e));
                println!("Updated {} record ({})", record.kind.label().bold(), record.id);
            }
            RecordCommands::Delete { id } => {
                delete_record(&mut app, &repo, id).unwrap_or_else(|e| fail(e));
                println!("Deleted record {id}");
            }
        },
        Commands::Fuel(command) => match command {
            FuelCommands::Add {
                vehicle,
                volume,
                cost,
                fuel,
                date,
                station,
                notes,
            } => {
                let vehicle = resolve(&app.store, &vehicle);
                let fuel_type = fuel.parse().unwrap_or_else(|e| fail(e));
                let log = add_fuel_log(
                    &mut app,
                    &repo,
                    AddFuelLogParameters {
                        vehicle_id: vehicle.id,
                        date: date_or_now(date),
                        fuel_type,
                        volume,
                        total_cost: cost,
                        station,
                        notes,
                    },
                )
                .unwrap_or_else(|e| fail(e));
                println!(
                    "Logged {:.1} {} for {} ({} / {})",
                    log.volume,
                    log.unit(),
                    vehicle.display_name(),
                    ui::format_money(log.total_cost),
                    format!("{:.2}/{}", log.price_per_unit, log.unit())
                );
            }
            FuelCommands::List { vehicle } => {
                let scope = vehicle.map(|name| resolve(&app.store, &name).id);
                let mut logs: Vec<_> = app
                    .store
                    .fuel_logs
                    .iter()
                    .filter(|l| scope.is_none_or(|id| l.vehicle_id == id))
                    .collect();
                logs.sort_by(|a, b| b.date.cmp(&a.date));

                if logs.is_empty() {
                    println!("No fuel logs");
                } else {
                    ui::render_view_header("Fuel logs", logs.len(), "fill-up");
                    for log in logs {
                        ui::render_fuel_line(log, &app.store);
                    }
                }
            }
            FuelCommands::Update {
                id,
                volume,
                cost,
                fuel,
                date,
                station,
                notes,
            } => {
                let fuel_type = fuel.map(|f| f.parse().unwrap_or_else(|e| fail(e)));
                let log = update_fuel_log(
                    &mut app,
                    &repo,
                    id,
                    UpdateFuelLogParameters {
                        date: date.map(|d| parse_date(&d)),
                        fuel_type,
                        volume,
                        total_cost: cost,
                        station,
                        notes,
                    },
                )
                .unwrap_or_else(|e| fail(e));
                println!(
                    "Updated fuel log {} ({:.1} {} / {})",
                    log.id,
                    log.volume,
                    log.unit(),
                    ui::format_money(log.total_cost)
                );
            }
            FuelCommands::Delete { id } => {
                delete_fuel_log(&mut app, &repo, id).unwrap_or_else(|e| fail(e));
                println!("Deleted fuel log {id}");
            }
        },
        Commands::Reminder(command) => match command {
            ReminderCommands::Add {
                vehicle,
                text,
                due,
                in_days,
                every,
            } => {
                let vehicle = resolve(&app.store, &vehicle);
                let due_at = match (due, in_days) {
                    (Some(date), None) => parse_date(&date),
                    (None, Some(days)) => Timestamp::now()
                        .checked_add(SignedDuration::from_hours(days * 24))
                        .unwrap_or_else(|e| fail(e)),
                    _ => fail("Provide exactly one of --due or --in-days"),
                };
                let kind = if every.is_some() {
                    ReminderKind::Recurring
                } else {
                    ReminderKind::OneTime
                };
                let reminder = add_reminder(
                    &mut app,
                    &repo,
                    &mut scheduler,
                    AddReminderParameters {
                        vehicle_id: vehicle.id,
                        text,
                        due_at,
                        kind,
                        trigger_seconds: every,
                    },
                )
                .unwrap_or_else(|e| fail(e));
                println!(
                    "Reminder set for {}: {} ({})",
                    vehicle.display_name(),
                    reminder.text.bold(),
                    ui::format_date(reminder.due_at)
                );
            }
            ReminderCommands::List => {
                if app.store.reminders.is_empty() {
                    println!("No reminders");
                } else {
                    ui::render_view_header("Reminders", app.store.reminders.len(), "reminder");
                    for reminder in &app.store.reminders {
                        ui::render_reminder_line(reminder, &app.store);
                    }
                }
            }
            ReminderCommands::Delete { text } => {
                let reminder = delete_reminder(&mut app, &repo, &mut scheduler, &text)
                    .unwrap_or_else(|e| fail(e));
                println!("Deleted reminder: {}", reminder.text);
            }
        },
        Commands::Stats(command) => match command {
            StatsCommands::Overview => {
                let overview = stats::overall_stats(&app.store.records, Timestamp::now());
                ui::render_view_header("Overview", overview.total_records, "record");
                ui::render_stat_line("Total spent", &ui::format_money(overview.total_spent));
                ui::render_stat_line(
                    "This year",
                    &format!(
                        "{} across {} record(s)",
                        ui::format_money(overview.year_spent),
                        overview.year_records
                    ),
                );
                ui::render_stat_line(
                    "Average per month",
                    &ui::format_money(overview.avg_monthly_spend),
                );
                if let Some(kind) = overview.most_frequent_kind {
                    ui::render_stat_line("Most frequent", kind.label());
                }
                if let Some(kind) = overview.most_expensive_kind {
                    ui::render_stat_line("Most expensive", kind.label());
                }
            }
            StatsCommands::Vehicles => {
                let rows = stats::vehicle_stats(&app.store.records, &app.store.vehicles);
                if rows.is_empty() {
                    println!("No vehicles yet");
                } else {
                    ui::render_view_header("Spend per vehicle", rows.len(), "vehicle");
                    for row in rows {
                        ui::render_stat_line(
                            &row.name,
                            &format!(
                                "{} across {} record(s)",
                                ui::format_money(row.total_spent),
                                row.record_count
                            ),
                        );
                    }
                }
            }
            StatsCommands::Kinds => {
                let rows = stats::kind_stats(&app.store.records, &app.store.vehicles);
                if rows.is_empty() {
                    println!("No records yet");
                } else {
                    ui::render_view_header("Spend per type", rows.len(), "type");
                    for row in rows {
                        ui::render_stat_line(
                            row.kind.label(),
                            &format!(
                                "{} across {} record(s)",
                                ui::format_money(row.total_spent),
                                row.record_count
                            ),
                        );
                        for vehicle in row.per_vehicle {
                            println!(
                                "      {} {}",
                                format!("{} ×", vehicle.record_count).dimmed(),
                                vehicle.name.dimmed()
                            );
                        }
                    }
                }
            }
            StatsCommands::Categories => {
                let rows = stats::category_stats(&app.store.vehicles, &app.store.records);
                if rows.is_empty() {
                    println!("No vehicles yet");
                } else {
                    ui::render_view_header("Spend per category", rows.len(), "category");
                    for row in rows {
                        ui::render_stat_line(
                            row.category.label(),
                            &format!(
                                "{} · {} vehicle(s) · {} record(s)",
                                ui::format_money(row.total_spent),
                                row.vehicle_count,
                                row.record_count
                            ),
                        );
                    }
                }
            }
            StatsCommands::Fuel => {
                let totals = stats::fuel_stats(&app.store.fuel_logs);
                ui::render_view_header("Fuel", totals.fill_ups, "fill-up");
                ui::render_stat_line("Total cost", &ui::format_money(totals.total_cost));
                ui::render_stat_line(
                    "Average per fill",
                    &ui::format_money(totals.avg_cost_per_fill),
                );
                ui::render_stat_line("Volume (fuel)", &format!("{:.1} L", totals.liters));
                ui::render_stat_line("Volume (charge)", &format!("{:.1} kWh", totals.kwh));
                if let Some(last) = totals.last_fill {
                    ui::render_stat_line("Last fill", &ui::format_date(last));
                }
                let rows = stats::vehicle_fuel_stats(&app.store.fuel_logs, &app.store.vehicles);
                for row in rows.iter().filter(|r| r.fill_ups > 0) {
                    ui::render_stat_line(
                        &row.name,
                        &format!(
                            "{} across {} fill-up(s)",
                            ui::format_money(row.total_cost),
                            row.fill_ups
                        ),
                    );
                }
            }
            StatsCommands::Monthly => {
                let months = stats::monthly_stats(&app.store.records, Timestamp::now());
                ui::render_view_header("Monthly spend", months.len(), "month");
                for month in months {
                    ui::render_stat_line(
                        &ui::format_month(month.year, month.month),
                        &format!(
                            "{} · {} record(s)",
                            ui::format_money(month.total_spent),
                            month.record_count
                        ),
                    );
                }
            }
        },
        Commands::Undo => {
            let restored = restore_last_snapshot(&mut app, &repo).unwrap_or_else(|e| fail(e));
            if restored {
                println!("Restored the state before the last change");
            } else {
                println!("Nothing to undo");
            }
        }
        Commands::Export { path } => {
            let backup = backup::export(&app, &repo);
            let json = serde_json::to_string_pretty(&backup)
                .unwrap_or_else(|e| fail(format!("Could not serialize backup: {e}")));
            std::fs::write(&path, json)
                .unwrap_or_else(|e| fail(format!("Could not write '{}': {e}", path.display())));
            println!("Exported everything to {}", path.display());
        }
        Commands::Import { path } => {
            let content = std::fs::read_to_string(&path)
                .unwrap_or_else(|e| fail(format!("Could not read '{}': {e}", path.display())));
            let parsed: backup::Backup = serde_json::from_str(&content)
                .unwrap_or_else(|e| fail(format!("Invalid backup file: {e}")));
            let summary =
                backup::import(parsed, &mut app, &repo).unwrap_or_else(|e| fail(e));
            let applied = [
                summary.vehicles.map(|n| format!("{n} vehicle(s)")),
                summary.tasks.map(|n| format!("{n} task(s)")),
                summary.records.map(|n| format!("{n} record(s)")),
                summary.fuel_logs.map(|n| format!("{n} fuel log(s)")),
                summary.reminders.map(|n| format!("{n} reminder(s)")),
            ]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>();
            if applied.is_empty() {
                println!("Backup contained no collections; nothing changed");
            } else {
                println!("Imported {}", applied.join(", "));
            }
        }
    }
}
