use colored::*;
use jiff::Timestamp;

use crate::{
    due::UpcomingTask,
    models::{
        fuel_log::FuelLog, record::MaintenanceRecord, reminder::Reminder, store::Store,
        vehicle::Vehicle,
    },
};

/// Get the terminal width, defaulting to 80 if unavailable
fn get_terminal_width() -> usize {
    term_size::dimensions().map(|(w, _)| w).unwrap_or(80)
}

pub fn format_money(amount: f64) -> String {
    format!("${amount:.2}")
}

/// Format a timestamp for display (e.g., "Feb 15, 2026")
pub fn format_date(timestamp: Timestamp) -> String {
    let zoned = jiff::Zoned::new(timestamp, jiff::tz::TimeZone::system());
    zoned.strftime("%b %d, %Y").to_string()
}

/// Format a month bucket header (e.g., "February 2026")
pub fn format_month(year: i16, month: i8) -> String {
    const NAMES: [&str; 12] = [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ];
    let name = NAMES.get((month - 1) as usize).unwrap_or(&"?");
    format!("{name} {year}")
}

/// Render a view header with title and count
pub fn render_view_header(title: &str, count: usize, noun: &str) {
    let word = if count == 1 {
        noun.to_string()
    } else {
        format!("{noun}s")
    };
    println!("\n  {} ({} {})\n", title.cyan().bold(), count, word);
}

/// Render a section header (e.g., "Overdue", "Archived")
pub fn render_section_header(title: &str) {
    println!("\n  ─── {} ───\n", title.bold());
}

/// Print a left section with a dimmed right-aligned context, falling back
/// to plain output when the terminal is too narrow.
fn render_aligned(left: ColoredString, left_visible_len: usize, right: &str) {
    if right.is_empty() {
        println!("{}", left);
        return;
    }

    let terminal_width = get_terminal_width();
    let total_content = left_visible_len + right.chars().count();

    if total_content + 4 < terminal_width {
        let padding = terminal_width - total_content - 2;
        println!("{}{}{}", left, " ".repeat(padding), right.dimmed());
    } else {
        println!("{}", left);
    }
}

pub fn render_vehicle_line(vehicle: &Vehicle) {
    let glyph = if vehicle.archived {
        "▪".dimmed()
    } else {
        "▸".normal()
    };
    let left = format!(
        "  {}  {} ({})",
        glyph,
        vehicle.display_name(),
        vehicle.year
    );
    let styled = if vehicle.archived {
        left.dimmed()
    } else {
        left.bold()
    };
    let right = format!(
        "{} mi  ·  {}",
        vehicle.current_mileage,
        vehicle.category.label()
    );
    render_aligned(styled, left.chars().count(), &right);
}

/// One row of the due view: glyph by severity, remaining time/distance
/// right-aligned.
pub fn render_due_line(upcoming: &UpcomingTask<'_>) {
    let glyph = if upcoming.is_overdue() {
        "●".red()
    } else if upcoming.is_due {
        "●".yellow()
    } else {
        "○".normal()
    };

    let left = format!(
        "  {}  {} — {}",
        glyph,
        upcoming.task.kind.label(),
        upcoming.vehicle.display_name()
    );
    let styled = if upcoming.is_due { left.bold() } else { left.normal() };

    let right = match (upcoming.days_until_due, upcoming.miles_until_due) {
        (Some(days), _) if days < 0 => format!("{} days overdue", -days),
        (Some(0), _) => String::from("due today"),
        (Some(days), _) => format!("in {days} days"),
        (_, Some(miles)) if miles < 0 => format!("{} mi past due", -miles),
        (_, Some(miles)) => format!("{miles} mi left"),
        _ => String::new(),
    };
    render_aligned(styled, left.chars().count(), &right);
}

pub fn render_record_line(record: &MaintenanceRecord, store: &Store) {
    let vehicle = store
        .vehicle(record.vehicle_id)
        .map(|v| v.display_name())
        .unwrap_or_else(|| String::from("(removed vehicle)"));
    let left = format!(
        "  {}  {} — {}",
        "✓".green(),
        record.kind.label(),
        vehicle
    );
    let cost = record.cost.map(format_money).unwrap_or_default();
    let right = if cost.is_empty() {
        format!("{} · {} mi", format_date(record.date), record.mileage)
    } else {
        format!("{} · {} mi · {}", format_date(record.date), record.mileage, cost)
    };
    render_aligned(left.normal(), left.chars().count(), &right);
}

pub fn render_fuel_line(log: &FuelLog, store: &Store) {
    let vehicle = store
        .vehicle(log.vehicle_id)
        .map(|v| v.display_name())
        .unwrap_or_else(|| String::from("(removed vehicle)"));
    let left = format!("  {}  {} · {}", "⛽".normal(), vehicle, log.fuel_type.label());
    let right = format!(
        "{} · {:.1} {} · {}",
        format_date(log.date),
        log.volume,
        log.unit(),
        format_money(log.total_cost)
    );
    render_aligned(left.normal(), left.chars().count(), &right);
}

pub fn render_reminder_line(reminder: &Reminder, store: &Store) {
    let vehicle = store
        .vehicle(reminder.vehicle_id)
        .map(|v| v.display_name())
        .unwrap_or_else(|| String::from("(removed vehicle)"));
    let overdue = reminder.due_at < Timestamp::now();
    let glyph = if overdue { "●".red() } else { "○".normal() };
    let left = format!("  {}  {}", glyph, reminder.text);
    let right = format!("{} · {}", vehicle, format_date(reminder.due_at));
    render_aligned(left.normal(), left.chars().count(), &right);
}

/// A labelled stat row, value right-aligned
pub fn render_stat_line(label: &str, value: &str) {
    let left = format!("  {label}");
    render_aligned(left.normal(), left.chars().count(), value);
}
