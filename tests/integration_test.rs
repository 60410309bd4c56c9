// Integration tests for the scheduling context over the SQLite store
mod fixtures;

use chrono::Duration;
use chrono_tz::Tz;
use fixtures::{at, committed, day, rooms, RecordingNavigator};
use pretty_assertions::assert_eq;
use room_scheduler::error::ScheduleError;
use room_scheduler::models::appointment::{AppointmentDraft, AppointmentId};
use room_scheduler::models::room::RoomId;
use room_scheduler::models::schedule::TimeWindow;
use room_scheduler::models::settings::Settings;
use room_scheduler::services::availability::RoomAvailabilityChecker;
use room_scheduler::services::schedule::context::ScheduleContext;
use room_scheduler::services::schedule::layout::RenderModel;
use room_scheduler::services::schedule::positioner::GridGeometry;
use room_scheduler::services::schedule::source::ScheduleSource;
use room_scheduler::services::schedule::viewport::{LayoutRegime, ViewportClassifier};
use room_scheduler::services::schedule::TICK_INTERVAL;
use room_scheduler::services::settings::SettingsService;
use room_scheduler::services::store::ScheduleStore;

fn store_with_rooms(count: i64) -> ScheduleStore {
    let store = ScheduleStore::in_memory(Tz::UTC).expect("Failed to open store");
    store
        .seed_rooms_if_empty(&rooms(count))
        .expect("Failed to seed rooms");
    store
}

fn context(width: f32) -> ScheduleContext {
    ScheduleContext::new(
        TimeWindow::default(),
        Tz::UTC,
        ViewportClassifier::default(),
        TICK_INTERVAL,
        day(),
        width,
    )
}

fn book(store: &ScheduleStore, room: i64, from: (u32, u32), to: (u32, u32)) -> i64 {
    let draft = AppointmentDraft::new(at(from.0, from.1), at(to.0, to.1))
        .titled("Booked")
        .in_room(RoomId(room));
    let created = store.create_appointment(&draft).expect("Failed to book");
    created.id.committed_id().unwrap()
}

#[test]
fn test_wide_layout_positions_from_store() {
    let store = store_with_rooms(3);
    let id = book(&store, 2, (9, 30), (11, 0));

    let mut ctx = context(1550.0);
    ctx.mount(&store, at(7, 0));
    ctx.apply_width(1550.0, at(7, 0));

    let model = ctx.render_model();
    let grid = model.grid().expect("grid should be rendered");
    assert_eq!(grid.regime, LayoutRegime::Wide);
    assert_eq!(grid.geometry.pixels_per_hour(), 100.0);

    let event = grid.find_event(AppointmentId::Committed(id)).unwrap();
    assert_eq!(event.rect.left, 150.0);
    assert_eq!(event.rect.width, 150.0);
    assert_eq!(event.rect.top, 100.0);
    assert_eq!(event.tooltip, "Booked\n09:30 - 11:00");
}

#[test]
fn test_narrow_layout_groups_seven_rooms() {
    let store = store_with_rooms(7);
    let mut ctx = context(500.0);
    ctx.mount(&store, at(7, 0));
    ctx.apply_width(500.0, at(7, 0));

    let model = ctx.render_model();
    let grid = model.grid().unwrap();
    assert_eq!(grid.regime, LayoutRegime::Narrow);
    let sizes: Vec<usize> = grid.sections.iter().map(|s| s.rooms.len()).collect();
    assert_eq!(sizes, vec![6, 1]);
    assert_eq!(grid.sections[1].rooms[0].label, "Room 107");
}

#[test]
fn test_panel_width_picks_regime_and_columns() {
    let store = store_with_rooms(7);
    let mut ctx = context(900.0);
    ctx.mount(&store, at(7, 0));

    // Below 768 only once the whole panel is that narrow
    let model = ctx.render_model();
    let grid = model.grid().unwrap();
    assert_eq!(grid.regime, LayoutRegime::Wide);
    assert_eq!(grid.geometry.pixels_per_hour(), 60.0);

    ctx.apply_width(700.0, at(7, 0));
    let model = ctx.render_model();
    let grid = model.grid().unwrap();
    assert_eq!(grid.regime, LayoutRegime::Narrow);
    assert_eq!(
        grid.geometry,
        GridGeometry::Mobile { room_column_width: 650.0 / 6.0 }
    );
}

#[test]
fn test_empty_directory_shows_placeholder() {
    let store = ScheduleStore::in_memory(Tz::UTC).unwrap();
    let mut ctx = context(1550.0);
    assert_eq!(ctx.render_model(), RenderModel::Loading);

    ctx.mount(&store, at(7, 0));
    assert_eq!(ctx.render_model(), RenderModel::NoRooms);
}

#[test]
fn test_availability_matches_store() {
    let store = store_with_rooms(2);
    book(&store, 1, (10, 0), (11, 0));

    let mut ctx = context(1550.0);
    ctx.mount(&store, at(7, 0));

    assert!(!ctx.is_room_available(RoomId(1), at(10, 30), at(10, 45)));
    assert!(ctx.is_room_available(RoomId(1), at(11, 0), at(12, 0)));
    assert!(ctx.is_room_available(RoomId(2), at(10, 30), at(10, 45)));

    let advisory: Vec<RoomId> = ctx
        .available_rooms(at(10, 30), at(10, 45))
        .into_iter()
        .map(|r| r.id)
        .collect();
    let authoritative: Vec<RoomId> = store
        .find_available_rooms(at(10, 30), at(10, 45))
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(advisory, vec![RoomId(2)]);
    assert_eq!(advisory, authoritative);
}

#[test]
fn test_store_refuses_double_booking() {
    let store = store_with_rooms(1);
    let id = book(&store, 1, (10, 0), (11, 0));

    let overlapping = AppointmentDraft::new(at(10, 30), at(11, 30)).in_room(RoomId(1));
    let err = store.create_appointment(&overlapping).unwrap_err();
    match err.downcast_ref::<ScheduleError>() {
        Some(ScheduleError::RoomConflict { room, conflicting }) => {
            assert_eq!(*room, RoomId(1));
            assert_eq!(conflicting, &vec![AppointmentId::Committed(id)]);
        }
        other => panic!("expected a room conflict, got {:?}", other),
    }

    // Moving an appointment within its own slot is not a conflict
    let moved = AppointmentDraft::new(at(10, 15), at(11, 15)).in_room(RoomId(1));
    assert!(store.update_appointment(id, &moved).is_ok());

    // Back-to-back is fine
    let adjacent = AppointmentDraft::new(at(11, 15), at(12, 0)).in_room(RoomId(1));
    assert!(store.create_appointment(&adjacent).is_ok());
}

#[test]
fn test_draft_lifecycle_through_context() {
    let store = store_with_rooms(2);
    let existing = book(&store, 1, (10, 0), (11, 0));

    let mut ctx = context(1550.0);
    let mut navigator = RecordingNavigator::default();
    ctx.mount(&store, at(7, 0));

    // New draft from a slot click
    let selection = ctx.on_slot_clicked(Some(RoomId(2)), chrono::NaiveTime::from_hms_opt(13, 52, 0));
    let draft = ctx.draft_for_slot(&selection);
    assert_eq!(draft.start, at(13, 45));
    assert_eq!(draft.end, at(14, 45));
    ctx.begin_new_draft(&draft, &mut navigator);
    assert_eq!(navigator.scrolled_to, vec![at(13, 45)]);

    let model = ctx.render_model();
    let ghost = model.grid().unwrap().find_event(AppointmentId::Ghost).unwrap();
    assert!(ghost.is_ghost);
    assert_eq!(ghost.title, "New appointment");

    // A draft conflicting with the existing booking is refused and kept
    let clash = AppointmentDraft::new(at(10, 30), at(11, 30)).in_room(RoomId(1));
    ctx.set_ghost_event(&clash, &mut navigator);
    let err = ctx.save_draft(&clash, &store, at(7, 0)).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ScheduleError>(),
        Some(ScheduleError::RoomConflict { .. })
    ));
    assert!(ctx.ghost().is_drafting());

    // Adjusted draft commits
    let fixed = draft.titled("Chess club");
    ctx.set_ghost_event(&fixed, &mut navigator);
    let saved = ctx.save_draft(&fixed, &store, at(7, 0)).unwrap();
    assert_eq!(saved.title, "Chess club");
    assert!(!ctx.ghost().is_drafting());
    assert_eq!(ctx.appointments().len(), 2);
    assert!(ctx.appointments().iter().all(|a| !a.id.is_ghost()));

    // Editing keeps the id and does not conflict with itself
    let edited = ctx
        .begin_edit(AppointmentId::Committed(existing), &mut navigator)
        .unwrap();
    let longer = AppointmentDraft {
        end: at(11, 30),
        ..edited
    };
    ctx.set_ghost_event(&longer, &mut navigator);
    let model = ctx.render_model();
    assert!(model
        .grid()
        .unwrap()
        .find_event(AppointmentId::Committed(existing))
        .is_none());
    let updated = ctx.save_draft(&longer, &store, at(7, 0)).unwrap();
    assert_eq!(updated.id, AppointmentId::Committed(existing));
    assert_eq!(updated.end, at(11, 30));

    ctx.delete_appointment(saved.id, &store, at(7, 0)).unwrap();
    assert_eq!(ctx.appointments().len(), 1);
}

#[test]
fn test_clock_marks_active_appointment() {
    let store = store_with_rooms(1);
    let id = book(&store, 1, (10, 0), (11, 0));

    let mut ctx = context(1550.0);
    ctx.mount(&store, at(10, 15));
    ctx.apply_width(1550.0, at(10, 15));

    let model = ctx.render_model();
    let grid = model.grid().unwrap();
    let marker = grid.marker.as_ref().expect("today inside the window");
    assert_eq!(marker.label, "10:15");
    assert_eq!(marker.offset, 225.0);
    assert!(grid.find_event(AppointmentId::Committed(id)).unwrap().is_active);

    // Not due yet, then due after the interval
    assert!(!ctx.tick(at(10, 15) + Duration::seconds(5)));
    assert!(ctx.tick(at(11, 0)));
    let model = ctx.render_model();
    assert!(!model
        .grid()
        .unwrap()
        .find_event(AppointmentId::Committed(id))
        .unwrap()
        .is_active);

    let mut navigator = RecordingNavigator::default();
    ctx.unmount(&mut navigator);
    assert_eq!(navigator.cancelled, 1);
    assert!(!ctx.tick(at(12, 0)));
}

#[test]
fn test_navigation_replaces_appointments() {
    let store = store_with_rooms(1);
    book(&store, 1, (10, 0), (11, 0));
    let tomorrow = AppointmentDraft::new(at(9, 0) + Duration::days(1), at(10, 0) + Duration::days(1))
        .in_room(RoomId(1));
    store.create_appointment(&tomorrow).unwrap();

    let mut ctx = context(1550.0);
    ctx.mount(&store, at(7, 0));
    assert_eq!(ctx.appointments().len(), 1);

    ctx.navigate(day().succ_opt().unwrap(), &store, at(7, 0));
    assert_eq!(ctx.appointments().len(), 1);
    assert_eq!(ctx.appointments()[0].start, at(9, 0) + Duration::days(1));
    // The marker only shows on the current day
    assert!(ctx.snapshot().marker.is_none());
}

#[test]
fn test_checker_ignores_uncommitted() {
    let mut ghost = committed(1, 1, at(10, 0), at(11, 0));
    ghost.id = AppointmentId::Ghost;
    let appointments = vec![ghost, committed(2, 2, at(10, 0), at(11, 0))];

    let checker = RoomAvailabilityChecker::new(&appointments, Tz::UTC);
    assert!(checker.is_available(RoomId(1), at(10, 0), at(11, 0)));
    assert!(!checker.is_available(RoomId(2), at(10, 0), at(11, 0)));
}

#[test]
fn test_file_backed_store_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rooms.db");

    {
        let store = ScheduleStore::open(&path, Tz::UTC).unwrap();
        store.seed_rooms_if_empty(&rooms(2)).unwrap();
        book(&store, 2, (14, 0), (15, 0));
    }

    let store = ScheduleStore::open(&path, Tz::UTC).unwrap();
    assert!(!store.seed_rooms_if_empty(&rooms(5)).unwrap());
    assert_eq!(store.list_rooms().unwrap().len(), 2);
    let listed = store.list_appointments(day()).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].room, Some(RoomId(2)));
}

#[test]
fn test_context_from_saved_settings() {
    let dir = tempfile::tempdir().unwrap();
    let service = SettingsService::new(dir.path().join("config.toml"));

    let settings = Settings {
        start_hour: 7,
        end_hour: 19,
        display_timezone: "UTC".to_string(),
        ..Settings::default()
    };
    service.save(&settings).unwrap();
    let loaded = service.load();
    assert_eq!(loaded, settings);

    let store = store_with_rooms(1);
    let mut ctx = ScheduleContext::from_settings(&loaded, day(), 1350.0).unwrap();
    ctx.mount(&store, at(6, 0));
    ctx.apply_width(1350.0, at(6, 0));
    assert_eq!(ctx.window().start_hour(), 7);
    assert_eq!(ctx.render_model().grid().unwrap().geometry.pixels_per_hour(), 100.0);
}
