// Service module exports

pub mod appointment;
pub mod availability;
pub mod database;
pub mod room;
pub mod schedule;
pub mod settings;
pub mod store;
