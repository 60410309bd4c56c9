//! Typed errors for scheduling operations.
//!
//! Services return `anyhow::Result` and carry these inside; callers that need
//! to react to a specific failure (for example a double booking) use
//! `err.downcast_ref::<ScheduleError>()`.

use thiserror::Error;

use crate::models::appointment::AppointmentId;
use crate::models::room::RoomId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("Invalid time window {start_hour}:00-{end_hour}:00 (start must be before end, end at most 24)")]
    InvalidTimeWindow { start_hour: u32, end_hour: u32 },

    #[error("Appointment end time must not be before its start time")]
    InvalidRange,

    #[error("Room {room} is already booked in that time window ({} conflicting appointment(s))", conflicting.len())]
    RoomConflict {
        room: RoomId,
        conflicting: Vec<AppointmentId>,
    },

    #[error("Room {0} does not exist")]
    UnknownRoom(RoomId),

    #[error("Appointment with id {0} not found")]
    NotFound(i64),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_message_counts_appointments() {
        let err = ScheduleError::RoomConflict {
            room: RoomId(3),
            conflicting: vec![AppointmentId::Committed(1), AppointmentId::Committed(2)],
        };
        assert_eq!(
            err.to_string(),
            "Room 3 is already booked in that time window (2 conflicting appointment(s))"
        );
    }

    #[test]
    fn test_downcast_through_anyhow() {
        let err: anyhow::Error = ScheduleError::NotFound(7).into();
        assert_eq!(
            err.downcast_ref::<ScheduleError>(),
            Some(&ScheduleError::NotFound(7))
        );
    }
}
