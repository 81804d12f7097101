pub mod fuel_log;
pub mod record;
pub mod reminder;
pub mod store;
pub mod task;
pub mod vehicle;
