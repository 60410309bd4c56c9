//! Per-view scheduling state.
//!
//! One `ScheduleContext` is created when the room grid is mounted and torn
//! down with it. It owns the room directory, the day's appointments, the
//! ghost draft, the clock tracker and the viewport debouncer, and is passed
//! explicitly to whatever needs them.

use std::time::{Duration as StdDuration, Instant};

use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;

use super::current_time::{CurrentTimeTracker, TimeSnapshot};
use super::ghost::{purge_orphans, DraftOrigin, GhostEventController, GridNavigator};
use super::interaction::{EventActivation, SlotSelection};
use super::layout::{layout, LayoutInput, RenderModel};
use super::positioner::GridGeometry;
use super::source::ScheduleSource;
use super::viewport::{ViewportClassifier, ViewportState, ViewportTracker};
use crate::error::ScheduleError;
use crate::models::appointment::{Appointment, AppointmentDraft, AppointmentId};
use crate::models::room::{Room, RoomId};
use crate::models::schedule::TimeWindow;
use crate::models::settings::Settings;
use crate::services::availability::RoomAvailabilityChecker;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum RoomDirectory {
    #[default]
    NotLoaded,
    Loaded(Vec<Room>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Transient message for the shell to show (e.g. a failed fetch).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

pub struct ScheduleContext {
    window: TimeWindow,
    tz: Tz,
    default_duration: Duration,
    rooms: RoomDirectory,
    day: NaiveDate,
    appointments: Vec<Appointment>,
    ghost: GhostEventController,
    tracker: CurrentTimeTracker,
    viewport: ViewportTracker,
    snapshot: TimeSnapshot,
    notices: Vec<Notice>,
}

impl ScheduleContext {
    pub fn new(
        window: TimeWindow,
        tz: Tz,
        classifier: ViewportClassifier,
        tick_interval: StdDuration,
        day: NaiveDate,
        initial_width: f32,
    ) -> Self {
        Self {
            window,
            tz,
            default_duration: Duration::hours(1),
            rooms: RoomDirectory::NotLoaded,
            day,
            appointments: Vec::new(),
            ghost: GhostEventController::new(),
            tracker: CurrentTimeTracker::new(window, tz, tick_interval),
            viewport: ViewportTracker::new(classifier, initial_width),
            snapshot: TimeSnapshot::default(),
            notices: Vec::new(),
        }
    }

    pub fn from_settings(settings: &Settings, day: NaiveDate, initial_width: f32) -> Result<Self> {
        settings.validate()?;
        let classifier = ViewportClassifier::new(settings.breakpoint, settings.group_size);
        let mut context = Self::new(
            settings.time_window()?,
            settings.timezone()?,
            classifier,
            settings.tick_interval(),
            day,
            initial_width,
        );
        context.default_duration = Duration::minutes(settings.default_duration_minutes);
        Ok(context)
    }

    // --- lifecycle ---

    /// Load rooms (once) and the day's appointments, then start the clock.
    pub fn mount(&mut self, source: &dyn ScheduleSource, now: DateTime<Utc>) {
        log::debug!("Mounting room grid for {}", self.day);
        self.tracker.start();
        self.ensure_rooms(source);
        self.reload_appointments(source, now);
    }

    /// Release the timer, pending resizes, the ghost and any scroll in flight.
    pub fn unmount(&mut self, navigator: &mut dyn GridNavigator) {
        log::debug!("Unmounting room grid");
        self.tracker.stop();
        self.viewport.cancel_pending();
        self.ghost.teardown(navigator);
    }

    pub fn is_mounted(&self) -> bool {
        self.tracker.is_running()
    }

    // --- data ---

    /// Fetch the room directory unless it is already loaded. A failed fetch
    /// leaves an empty directory and a notice.
    pub fn ensure_rooms(&mut self, source: &dyn ScheduleSource) {
        if matches!(self.rooms, RoomDirectory::Loaded(_)) {
            return;
        }
        self.reload_rooms(source);
    }

    pub fn reload_rooms(&mut self, source: &dyn ScheduleSource) {
        let rooms = match source.list_rooms() {
            Ok(rooms) => rooms,
            Err(e) => {
                log::error!("Failed to load rooms: {:#}", e);
                self.notices.push(Notice::error("Rooms could not be loaded"));
                Vec::new()
            }
        };
        log::debug!("Room directory loaded with {} rooms", rooms.len());
        self.rooms = RoomDirectory::Loaded(rooms);
    }

    /// Switch the viewed day and fetch its appointments.
    pub fn navigate(&mut self, day: NaiveDate, source: &dyn ScheduleSource, now: DateTime<Utc>) {
        if day == self.day {
            return;
        }
        self.day = day;
        self.reload_appointments(source, now);
    }

    pub fn reload_appointments(&mut self, source: &dyn ScheduleSource, now: DateTime<Utc>) {
        let appointments = match source.list_appointments(self.day) {
            Ok(appointments) => appointments,
            Err(e) => {
                log::error!("Failed to load appointments for {}: {:#}", self.day, e);
                self.notices.push(Notice::error("Appointments could not be loaded"));
                Vec::new()
            }
        };
        self.replace_appointments(appointments, now);
    }

    /// Replace the appointment set wholesale and re-evaluate the clock.
    pub fn replace_appointments(&mut self, mut appointments: Vec<Appointment>, now: DateTime<Utc>) {
        purge_orphans(&mut appointments);
        self.appointments = appointments;
        self.refresh_snapshot(now);
    }

    pub fn rooms(&self) -> Option<&[Room]> {
        match &self.rooms {
            RoomDirectory::Loaded(rooms) => Some(rooms),
            RoomDirectory::NotLoaded => None,
        }
    }

    pub fn day(&self) -> NaiveDate {
        self.day
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn window(&self) -> &TimeWindow {
        &self.window
    }

    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn appointment(&self, id: AppointmentId) -> Option<&Appointment> {
        self.appointments.iter().find(|a| a.id == id)
    }

    pub fn snapshot(&self) -> &TimeSnapshot {
        &self.snapshot
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    // --- draft / ghost ---

    pub fn ghost(&self) -> &GhostEventController {
        &self.ghost
    }

    pub fn begin_new_draft(&mut self, draft: &AppointmentDraft, navigator: &mut dyn GridNavigator) {
        self.ghost.begin_new(draft, navigator);
    }

    /// Open an existing appointment in the form; the ghost takes its place
    /// on the grid until the draft is saved or cancelled.
    pub fn begin_edit(
        &mut self,
        id: AppointmentId,
        navigator: &mut dyn GridNavigator,
    ) -> Result<AppointmentDraft> {
        let appointment = self
            .appointment(id)
            .ok_or_else(|| anyhow!("Appointment {} is not loaded", id))?;
        let draft = AppointmentDraft::from_appointment(appointment);
        self.ghost.begin_edit(id, &draft, navigator);
        Ok(draft)
    }

    pub fn set_ghost_event(&mut self, draft: &AppointmentDraft, navigator: &mut dyn GridNavigator) {
        self.ghost.set_ghost_event(draft, navigator);
    }

    pub fn clear_ghost_event(&mut self) {
        self.ghost.clear_ghost_event();
    }

    pub fn cancel_draft(&mut self) {
        self.ghost.cancel();
    }

    /// Commit the form's draft.
    ///
    /// Runs the advisory availability check against the loaded appointments
    /// first, then hands the draft to the source, which re-checks
    /// atomically. On success the ghost is cleared and the day is reloaded;
    /// on failure the ghost stays so the user can adjust the draft.
    pub fn save_draft(
        &mut self,
        draft: &AppointmentDraft,
        source: &dyn ScheduleSource,
        now: DateTime<Utc>,
    ) -> Result<Appointment> {
        let origin = self.ghost.origin().unwrap_or(DraftOrigin::New);
        let editing = match origin {
            DraftOrigin::Edit(id) => Some(id),
            DraftOrigin::New => None,
        };

        if let Some(room) = draft.room {
            let (start, end) = draft.effective_range(&self.tz);
            let conflicting = self.conflicts(room, start, end, editing);
            if !conflicting.is_empty() {
                log::info!("Draft for room {} conflicts with {:?}", room, conflicting);
                return Err(ScheduleError::RoomConflict { room, conflicting }.into());
            }
        }

        let saved = match editing.and_then(|id| id.committed_id()) {
            Some(id) => source.update_appointment(id, draft)?,
            None => source.create_appointment(draft)?,
        };

        self.ghost.save();
        self.reload_appointments(source, now);
        Ok(saved)
    }

    pub fn delete_appointment(
        &mut self,
        id: AppointmentId,
        source: &dyn ScheduleSource,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let storage_id = id
            .committed_id()
            .ok_or_else(|| anyhow!("Appointment {} has not been saved", id))?;
        source.delete_appointment(storage_id)?;
        if self.ghost.origin() == Some(DraftOrigin::Edit(id)) {
            self.ghost.cancel();
        }
        self.reload_appointments(source, now);
        Ok(())
    }

    // --- availability ---

    fn checker(&self, ignoring: Option<AppointmentId>) -> RoomAvailabilityChecker<'_> {
        let checker = RoomAvailabilityChecker::new(&self.appointments, self.tz);
        match ignoring {
            Some(id) => checker.ignoring(id),
            None => checker,
        }
    }

    fn conflicts(
        &self,
        room: RoomId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        ignoring: Option<AppointmentId>,
    ) -> Vec<AppointmentId> {
        self.checker(ignoring)
            .conflicts(room, start, end)
            .into_iter()
            .map(|a| a.id)
            .collect()
    }

    /// Advisory check against the loaded appointments. The appointment under
    /// edit does not block itself.
    pub fn is_room_available(&self, room: RoomId, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.conflicts(room, start, end, self.editing_id()).is_empty()
    }

    /// Rooms free for the window according to the loaded appointments.
    pub fn available_rooms(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<&Room> {
        let rooms = self.rooms().unwrap_or(&[]);
        self.checker(self.editing_id()).available_rooms(rooms, start, end)
    }

    fn editing_id(&self) -> Option<AppointmentId> {
        match self.ghost.origin() {
            Some(DraftOrigin::Edit(id)) => Some(id),
            _ => None,
        }
    }

    // --- viewport and clock ---

    pub fn viewport(&self) -> ViewportState {
        self.viewport.current()
    }

    pub fn queue_resize(&mut self, width: f32, at: Instant) -> bool {
        self.viewport.queue_resize(width, at)
    }

    /// Apply a debounced resize. Returns true when the grid must re-render.
    pub fn flush_resize(&mut self, at: Instant, now: DateTime<Utc>) -> bool {
        if self.viewport.flush(at).is_none() {
            return false;
        }
        self.refresh_snapshot(now);
        true
    }

    /// Apply a width immediately (first frame).
    pub fn apply_width(&mut self, width: f32, now: DateTime<Utc>) {
        self.viewport.apply_now(width);
        self.refresh_snapshot(now);
    }

    pub fn has_pending_resize(&self) -> bool {
        self.viewport.has_pending()
    }

    /// Periodic clock evaluation. Returns true when a new snapshot was taken.
    pub fn tick(&mut self, now: DateTime<Utc>) -> bool {
        let geometry = self.geometry();
        match self
            .tracker
            .tick(now, self.day, &geometry, &self.appointments)
        {
            Some(snapshot) => {
                self.snapshot = snapshot;
                true
            }
            None => false,
        }
    }

    pub fn next_tick_in(&self, now: DateTime<Utc>) -> Option<StdDuration> {
        self.tracker.next_due_in(now)
    }

    fn refresh_snapshot(&mut self, now: DateTime<Utc>) {
        let geometry = self.geometry();
        self.snapshot = self
            .tracker
            .refresh(now, self.day, &geometry, &self.appointments);
    }

    fn geometry(&self) -> GridGeometry {
        let room_count = self.rooms().map_or(0, <[Room]>::len);
        GridGeometry::for_viewport(&self.viewport.current(), room_count, &self.window)
    }

    // --- rendering and interaction ---

    pub fn render_model(&self) -> RenderModel {
        let appointments = self.ghost.overlay(&self.appointments);
        layout(&LayoutInput {
            rooms: self.rooms(),
            appointments: &appointments,
            viewport: self.viewport.current(),
            window: &self.window,
            day: self.day,
            tz: self.tz,
            snapshot: &self.snapshot,
        })
    }

    /// A rendered appointment box was clicked.
    pub fn on_event_activated(&self, id: AppointmentId) -> Option<EventActivation> {
        if id.is_ghost() {
            return self.ghost.ghost().map(EventActivation::for_appointment);
        }
        self.appointment(id).map(EventActivation::for_appointment)
    }

    /// An empty cell was clicked.
    pub fn on_slot_clicked(&self, room: Option<RoomId>, time: Option<NaiveTime>) -> SlotSelection {
        SlotSelection::new(self.day, room, time)
    }

    /// Prefilled draft for a clicked slot, starting at the window start
    /// when no time was given.
    pub fn draft_for_slot(&self, selection: &SlotSelection) -> AppointmentDraft {
        let fallback =
            NaiveTime::from_hms_opt(self.window.start_hour(), 0, 0).unwrap_or(NaiveTime::MIN);
        selection.to_draft(fallback, self.default_duration, &self.tz)
    }
}
