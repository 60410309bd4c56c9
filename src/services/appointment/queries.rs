use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection};

use super::shared::{map_appointment_row, APPOINTMENT_COLUMNS};
use super::AppointmentService;
use crate::models::appointment::Appointment;
use crate::models::room::{Room, RoomId};
use crate::models::schedule::OverlapQuery;
use crate::services::database::to_sql_timestamp;
use crate::services::room::map_room_row;
use crate::utils::date::day_bounds;

impl<'a> AppointmentService<'a> {
    /// Appointments touching `day` in the display timezone, ordered by start.
    pub fn list_for_day(&self, day: NaiveDate) -> Result<Vec<Appointment>> {
        let (start, end) = day_bounds(day, &self.tz);
        self.list_range(start, end)
    }

    /// Appointments overlapping `[start, end)`. Zero-length appointments
    /// inside the range are included.
    pub fn list_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Appointment>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM appointments
             WHERE start_at < ?2 AND (end_at > ?1 OR (start_at = end_at AND start_at >= ?1))
             ORDER BY start_at ASC, id ASC",
            APPOINTMENT_COLUMNS
        ))?;

        let appointments = stmt
            .query_map(
                params![to_sql_timestamp(start), to_sql_timestamp(end)],
                map_appointment_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to list appointments")?;

        Ok(appointments)
    }

    /// Appointments in `room` overlapping the window. Reversed bounds are
    /// swapped first.
    pub fn find_overlapping_for_room(
        &self,
        room: RoomId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>> {
        let query = OverlapQuery::normalized(room, start, end);
        find_overlapping_in(self.conn, query.room, query.start, query.end, None)
    }

    /// Rooms with no appointment overlapping the window, in display order.
    pub fn find_available_rooms(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Room>> {
        let (start, end) = if end < start { (end, start) } else { (start, end) };
        let mut stmt = self.conn.prepare(
            "SELECT r.id, r.label, r.location FROM rooms r
             WHERE NOT EXISTS (
                 SELECT 1 FROM appointments a
                 WHERE a.room_id = r.id AND a.start_at < ?2 AND a.end_at > ?1
             )
             ORDER BY r.sort_order ASC, r.id ASC",
        )?;

        let rooms = stmt
            .query_map(
                params![to_sql_timestamp(start), to_sql_timestamp(end)],
                map_room_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to query available rooms")?;

        Ok(rooms)
    }
}

/// Overlap predicate shared with the commit-time check:
/// `start_at < :end AND end_at > :start`.
pub(crate) fn find_overlapping_in(
    conn: &Connection,
    room: RoomId,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude: Option<i64>,
) -> Result<Vec<Appointment>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM appointments
         WHERE room_id = ?1 AND start_at < ?3 AND end_at > ?2
           AND (?4 IS NULL OR id != ?4)
         ORDER BY start_at ASC",
        APPOINTMENT_COLUMNS
    ))?;

    let appointments = stmt
        .query_map(
            params![room.0, to_sql_timestamp(start), to_sql_timestamp(end), exclude],
            map_appointment_row,
        )?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to query overlapping appointments")?;

    Ok(appointments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::appointment::AppointmentDraft;
    use crate::services::database::Database;
    use crate::services::room::RoomService;
    use chrono::TimeZone;
    use chrono_tz::Tz;

    fn setup() -> Database {
        let db = Database::new(":memory:").unwrap();
        db.initialize_schema().unwrap();
        let rooms = RoomService::new(db.connection());
        rooms.upsert(&Room::from_number(1, "A")).unwrap();
        rooms.upsert(&Room::from_number(2, "B")).unwrap();
        db
    }

    fn at(d: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, d, h, m, 0).unwrap()
    }

    fn book(service: &AppointmentService<'_>, room: i64, start: DateTime<Utc>, end: DateTime<Utc>) {
        service
            .create(&AppointmentDraft::new(start, end).in_room(RoomId(room)).titled("Booked"))
            .unwrap();
    }

    #[test]
    fn test_find_overlapping_for_room_scenario() {
        let db = setup();
        let service = AppointmentService::new(db.connection(), Tz::UTC);
        book(&service, 1, at(10, 10, 0), at(10, 11, 0));

        assert_eq!(
            service
                .find_overlapping_for_room(RoomId(1), at(10, 10, 30), at(10, 10, 45))
                .unwrap()
                .len(),
            1
        );
        assert!(service
            .find_overlapping_for_room(RoomId(1), at(10, 11, 0), at(10, 12, 0))
            .unwrap()
            .is_empty());
        // Reversed bounds are normalized
        assert_eq!(
            service
                .find_overlapping_for_room(RoomId(1), at(10, 10, 45), at(10, 10, 30))
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_find_available_rooms() {
        let db = setup();
        let service = AppointmentService::new(db.connection(), Tz::UTC);
        book(&service, 1, at(10, 10, 0), at(10, 11, 0));

        let busy: Vec<RoomId> = service
            .find_available_rooms(at(10, 10, 30), at(10, 10, 45))
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(busy, vec![RoomId(2)]);

        let reversed = service
            .find_available_rooms(at(10, 12, 0), at(10, 11, 0))
            .unwrap();
        assert_eq!(reversed.len(), 2);
    }

    #[test]
    fn test_list_for_day_respects_timezone() {
        let db = setup();
        let berlin = chrono_tz::Europe::Berlin;
        let service = AppointmentService::new(db.connection(), berlin);
        // 23:30 UTC on the 9th is already the 10th in Berlin
        book(&service, 1, at(9, 23, 30), at(10, 0, 30));
        book(&service, 2, at(10, 9, 0), at(10, 10, 0));
        book(&service, 2, at(11, 9, 0), at(11, 10, 0));

        let day = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let listed = service.list_for_day(day).unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].start < listed[1].start);
    }

    #[test]
    fn test_all_day_stored_as_whole_day() {
        let db = setup();
        let service = AppointmentService::new(db.connection(), Tz::UTC);
        let mut draft = AppointmentDraft::new(at(10, 0, 0), at(10, 23, 59))
            .in_room(RoomId(1))
            .titled("Closed");
        draft.all_day = true;
        let created = service.create(&draft).unwrap();
        assert_eq!(created.end, at(11, 0, 0));

        // Blocks the last minute of the day as well
        assert!(service
            .create(
                &AppointmentDraft::new(at(10, 23, 59), at(11, 0, 0))
                    .in_room(RoomId(1))
                    .titled("Late")
            )
            .is_err());
    }
}
