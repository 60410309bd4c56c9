// Module exports for models

pub mod appointment;
pub mod room;
pub mod schedule;
pub mod settings;
