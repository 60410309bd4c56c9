// Room Scheduler
// Main entry point

use anyhow::Context;
use room_scheduler::models::room::Room;
use room_scheduler::services::settings::{resolve_database_path, SettingsService};
use room_scheduler::services::store::ScheduleStore;
use room_scheduler::ui_egui::SchedulerApp;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    log::info!("Starting Room Scheduler");

    let settings = SettingsService::from_default_location().load();
    let tz = settings.timezone()?;
    let db_path = resolve_database_path(&settings);
    log::info!("Using database at {}", db_path.display());

    let store = ScheduleStore::open(&db_path, tz)
        .with_context(|| format!("Failed to open database at {}", db_path.display()))?;
    let demo_rooms: Vec<Room> = (101i64..=107)
        .map(|number| Room::from_number(number - 100, &number.to_string()))
        .collect();
    if store.seed_rooms_if_empty(&demo_rooms)? {
        log::info!("Seeded {} demo rooms", demo_rooms.len());
    }

    let app = SchedulerApp::new(store, &settings)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Room Scheduler")
            .with_inner_size([1600.0, 900.0])
            .with_min_inner_size([360.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Room Scheduler",
        options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )
    .map_err(|err| anyhow::anyhow!("Room Scheduler exited with an error: {}", err))
}
