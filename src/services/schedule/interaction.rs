//! Results of user interaction with the grid.

use chrono::{Duration, NaiveDate, NaiveTime};
use chrono_tz::Tz;

use crate::models::appointment::{Appointment, AppointmentDraft, AppointmentId};
use crate::models::room::RoomId;
use crate::utils::date::{local_instant, round_to_nearest_quarter};

/// What to open after an appointment box was clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventActivation {
    OpenPopover(AppointmentId),
    /// Tutoring appointments have their own detail page
    OpenTutoringDetails(i64),
}

impl EventActivation {
    pub fn for_appointment(appointment: &Appointment) -> Self {
        match appointment.id.committed_id() {
            Some(id) if appointment.is_tutoring() => Self::OpenTutoringDetails(id),
            _ => Self::OpenPopover(appointment.id),
        }
    }
}

/// Empty grid cell that was clicked, used to prefill the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotSelection {
    pub day: NaiveDate,
    pub room: Option<RoomId>,
    /// Rounded to the nearest quarter hour
    pub time: Option<NaiveTime>,
}

impl SlotSelection {
    pub fn new(day: NaiveDate, room: Option<RoomId>, time: Option<NaiveTime>) -> Self {
        Self {
            day,
            room,
            time: time.map(round_to_nearest_quarter),
        }
    }

    /// Draft of `duration` starting at the selected time. Without a time the
    /// draft starts at `fallback`.
    pub fn to_draft(&self, fallback: NaiveTime, duration: Duration, tz: &Tz) -> AppointmentDraft {
        let start = local_instant(self.day, self.time.unwrap_or(fallback), tz);
        let mut draft = AppointmentDraft::new(start, start + duration);
        draft.room = self.room;
        draft
    }
}
