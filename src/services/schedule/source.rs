//! Data the grid consumes from the outside world.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};

use crate::models::appointment::{Appointment, AppointmentDraft};
use crate::models::room::Room;

/// Rooms, appointments and commits. The SQLite implementation lives in
/// [`crate::services::store`]; tests substitute a mock.
#[cfg_attr(test, mockall::automock)]
pub trait ScheduleSource {
    fn list_rooms(&self) -> Result<Vec<Room>>;

    /// Every appointment whose range touches `day` in the display timezone.
    fn list_appointments(&self, day: NaiveDate) -> Result<Vec<Appointment>>;

    fn create_appointment(&self, draft: &AppointmentDraft) -> Result<Appointment>;

    fn update_appointment(&self, id: i64, draft: &AppointmentDraft) -> Result<Appointment>;

    fn delete_appointment(&self, id: i64) -> Result<()>;

    /// Rooms with no committed appointment overlapping the window.
    fn find_available_rooms(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Room>>;
}
