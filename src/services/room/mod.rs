//! Room directory backed by SQLite.
//!
//! Rooms are read once per view mount; the grid never writes to them.

use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, Row};

use crate::error::ScheduleError;
use crate::models::room::{Room, RoomId};

pub struct RoomService<'a> {
    conn: &'a Connection,
}

impl<'a> RoomService<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a room, letting SQLite assign the id. New rooms sort last.
    pub fn create(&self, label: &str, location: Option<&str>) -> Result<Room> {
        let label = label.trim();
        if label.is_empty() {
            return Err(anyhow!("Room label cannot be empty"));
        }

        self.conn
            .execute(
                "INSERT INTO rooms (label, location, sort_order)
                 VALUES (?1, ?2, (SELECT COALESCE(MAX(sort_order), 0) + 1 FROM rooms))",
                params![label, location],
            )
            .context("Failed to insert room")?;

        let id = RoomId(self.conn.last_insert_rowid());
        log::info!("Created room {} ({})", id, label);
        self.get(id)?.ok_or_else(|| anyhow!(ScheduleError::UnknownRoom(id)))
    }

    /// Insert or replace a room with a known id (imports and seeding).
    pub fn upsert(&self, room: &Room) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO rooms (id, label, location, sort_order)
                 VALUES (?1, ?2, ?3, ?1)
                 ON CONFLICT(id) DO UPDATE SET label = excluded.label, location = excluded.location",
                params![room.id.0, room.label, room.location],
            )
            .with_context(|| format!("Failed to store room {}", room.id))?;
        Ok(())
    }

    pub fn get(&self, id: RoomId) -> Result<Option<Room>> {
        let result = self.conn.query_row(
            "SELECT id, label, location FROM rooms WHERE id = ?1",
            [id.0],
            map_room_row,
        );

        match result {
            Ok(room) => Ok(Some(room)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e).context("Failed to load room"),
        }
    }

    /// All rooms in display order.
    pub fn list_all(&self) -> Result<Vec<Room>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, label, location FROM rooms ORDER BY sort_order ASC, id ASC",
        )?;

        let rooms = stmt
            .query_map([], map_room_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to list rooms")?;

        Ok(rooms)
    }

    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM rooms", [], |row| row.get(0))
            .context("Failed to count rooms")?;
        Ok(count as usize)
    }

    /// Delete a room. Appointments in it become unassigned.
    pub fn delete(&self, id: RoomId) -> Result<()> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM rooms WHERE id = ?1", [id.0])
            .context("Failed to delete room")?;

        if rows_affected == 0 {
            return Err(ScheduleError::UnknownRoom(id).into());
        }
        Ok(())
    }
}

pub(crate) fn map_room_row(row: &Row<'_>) -> rusqlite::Result<Room> {
    Ok(Room {
        id: RoomId(row.get(0)?),
        label: row.get(1)?,
        location: row.get(2)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::database::Database;
    use pretty_assertions::assert_eq;

    fn setup_test_db() -> Database {
        let db = Database::new(":memory:").unwrap();
        db.initialize_schema().unwrap();
        db
    }

    #[test]
    fn test_create_and_list_in_order() {
        let db = setup_test_db();
        let service = RoomService::new(db.connection());

        service.create("Room 101", Some("Main building")).unwrap();
        service.create("Room 102", None).unwrap();

        let rooms = service.list_all().unwrap();
        let labels: Vec<&str> = rooms.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["Room 101", "Room 102"]);
        assert_eq!(rooms[0].location.as_deref(), Some("Main building"));
        assert_eq!(service.count().unwrap(), 2);
    }

    #[test]
    fn test_create_rejects_blank_label() {
        let db = setup_test_db();
        let service = RoomService::new(db.connection());
        assert!(service.create("   ", None).is_err());
    }

    #[test]
    fn test_upsert_updates_label() {
        let db = setup_test_db();
        let service = RoomService::new(db.connection());

        service.upsert(&Room::from_number(7, "107")).unwrap();
        service.upsert(&Room::new(7, "Music room")).unwrap();

        let room = service.get(RoomId(7)).unwrap().unwrap();
        assert_eq!(room.label, "Music room");
        assert_eq!(service.count().unwrap(), 1);
    }

    #[test]
    fn test_get_missing_room() {
        let db = setup_test_db();
        let service = RoomService::new(db.connection());
        assert!(service.get(RoomId(42)).unwrap().is_none());
    }

    #[test]
    fn test_delete_unknown_room() {
        let db = setup_test_db();
        let service = RoomService::new(db.connection());
        let err = service.delete(RoomId(3)).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ScheduleError>(),
            Some(&ScheduleError::UnknownRoom(RoomId(3)))
        );
    }
}
