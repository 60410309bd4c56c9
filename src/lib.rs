// Room Scheduler Library
// Layout engine, persistence and the egui shell

pub mod error;
pub mod models;
pub mod services;
pub mod ui_egui;
pub mod utils;
