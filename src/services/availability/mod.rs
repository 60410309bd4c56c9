//! Advisory room availability over an already-fetched appointment set.
//!
//! This is the fast, synchronous check the form runs before submitting. It
//! cannot see bookings made concurrently by other users; the store repeats
//! the check atomically when the appointment is committed.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::models::appointment::{Appointment, AppointmentId};
use crate::models::room::{Room, RoomId};
use crate::models::schedule::OverlapQuery;

pub struct RoomAvailabilityChecker<'a> {
    appointments: &'a [Appointment],
    tz: Tz,
    ignore: Option<AppointmentId>,
}

impl<'a> RoomAvailabilityChecker<'a> {
    pub fn new(appointments: &'a [Appointment], tz: Tz) -> Self {
        Self {
            appointments,
            tz,
            ignore: None,
        }
    }

    /// Skip one appointment, so an edit does not collide with itself.
    pub fn ignoring(mut self, id: AppointmentId) -> Self {
        self.ignore = Some(id);
        self
    }

    /// Committed appointments in `room` that overlap `[start, end)`.
    pub fn conflicts(
        &self,
        room: RoomId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<&'a Appointment> {
        let query = OverlapQuery::normalized(room, start, end);
        self.appointments
            .iter()
            .filter(|a| a.id.is_committed() && Some(a.id) != self.ignore)
            .filter(|a| a.room == Some(query.room))
            .filter(|a| {
                let (a_start, a_end) = a.effective_range(&self.tz);
                query.overlaps(a_start, a_end)
            })
            .collect()
    }

    pub fn is_available(&self, room: RoomId, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.conflicts(room, start, end).is_empty()
    }

    /// Rooms free for the whole window, in directory order.
    pub fn available_rooms<'r>(
        &self,
        rooms: &'r [Room],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<&'r Room> {
        rooms
            .iter()
            .filter(|room| self.is_available(room.id, start, end))
            .collect()
    }
}
