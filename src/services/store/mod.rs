//! SQLite-backed [`ScheduleSource`].

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::models::appointment::{Appointment, AppointmentDraft};
use crate::models::room::Room;
use crate::services::appointment::AppointmentService;
use crate::services::database::Database;
use crate::services::room::RoomService;
use crate::services::schedule::source::ScheduleSource;

pub struct ScheduleStore {
    db: Database,
    tz: Tz,
}

impl ScheduleStore {
    /// Open (or create) the database file and bring its schema up to date.
    pub fn open(path: &Path, tz: Tz) -> Result<Self> {
        let db = Database::new(&path.to_string_lossy())?;
        db.initialize_schema()
            .context("Failed to initialize database schema")?;
        log::info!("Opened schedule database at {}", path.display());
        Ok(Self { db, tz })
    }

    pub fn in_memory(tz: Tz) -> Result<Self> {
        let db = Database::new(":memory:")?;
        db.initialize_schema()?;
        Ok(Self { db, tz })
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn rooms(&self) -> RoomService<'_> {
        RoomService::new(self.db.connection())
    }

    pub fn appointments(&self) -> AppointmentService<'_> {
        AppointmentService::new(self.db.connection(), self.tz)
    }

    /// Insert `rooms` when the directory is empty. Returns whether anything
    /// was inserted.
    pub fn seed_rooms_if_empty(&self, rooms: &[Room]) -> Result<bool> {
        let service = self.rooms();
        if service.count()? > 0 {
            return Ok(false);
        }
        log::info!("Seeding {} rooms", rooms.len());
        for room in rooms {
            service.upsert(room)?;
        }
        Ok(true)
    }
}

impl ScheduleSource for ScheduleStore {
    fn list_rooms(&self) -> Result<Vec<Room>> {
        self.rooms().list_all()
    }

    fn list_appointments(&self, day: NaiveDate) -> Result<Vec<Appointment>> {
        self.appointments().list_for_day(day)
    }

    fn create_appointment(&self, draft: &AppointmentDraft) -> Result<Appointment> {
        self.appointments().create(draft)
    }

    fn update_appointment(&self, id: i64, draft: &AppointmentDraft) -> Result<Appointment> {
        self.appointments().update(id, draft)
    }

    fn delete_appointment(&self, id: i64) -> Result<()> {
        self.appointments().delete(id)
    }

    fn find_available_rooms(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Room>> {
        self.appointments().find_available_rooms(start, end)
    }
}
