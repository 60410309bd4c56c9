//! Appointment storage.
//!
//! Commits are the authoritative place where double bookings are refused:
//! `create` and `update` re-check the target room inside an immediate
//! transaction, so two clients racing for the same slot cannot both win.

use chrono_tz::Tz;
use rusqlite::Connection;

pub mod crud;
pub mod queries;
mod shared;

pub struct AppointmentService<'a> {
    pub(crate) conn: &'a Connection,
    /// Display timezone, used for day boundaries and all-day ranges
    pub(crate) tz: Tz,
}

impl<'a> AppointmentService<'a> {
    pub fn new(conn: &'a Connection, tz: Tz) -> Self {
        Self { conn, tz }
    }
}
