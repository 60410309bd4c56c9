// Test fixtures - reusable test data
// Shared by the integration and property tests

#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use room_scheduler::models::appointment::{Appointment, AppointmentId};
use room_scheduler::models::room::Room;
use room_scheduler::services::schedule::ghost::GridNavigator;

/// Monday 10 March 2025, the day most tests look at
pub fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
}

/// UTC instant on [`day`]
pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, hour, minute, 0).unwrap()
}

/// Rooms 1..=count labelled "Room 101", "Room 102", ...
pub fn rooms(count: i64) -> Vec<Room> {
    (1..=count)
        .map(|id| Room::from_number(id, &(100 + id).to_string()))
        .collect()
}

pub fn committed(id: i64, room: i64, start: DateTime<Utc>, end: DateTime<Utc>) -> Appointment {
    Appointment::builder()
        .id(AppointmentId::Committed(id))
        .title(format!("Appointment {}", id))
        .start(start)
        .end(end)
        .room(room)
        .build()
        .unwrap()
}

/// Navigator that records scroll requests instead of scrolling.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    pub scrolled_to: Vec<DateTime<Utc>>,
    pub cancelled: usize,
}

impl GridNavigator for RecordingNavigator {
    fn scroll_to_time(&mut self, at: DateTime<Utc>) {
        self.scrolled_to.push(at);
    }

    fn cancel_scroll(&mut self) {
        self.cancelled += 1;
    }
}
