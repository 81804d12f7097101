pub mod fuel;
pub mod records;
pub mod reminders;
pub mod tasks;
pub mod undo;
pub mod vehicles;
