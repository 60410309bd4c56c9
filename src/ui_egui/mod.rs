mod app;
mod draft_panel;
mod room_grid;
mod toast;

pub use app::SchedulerApp;
