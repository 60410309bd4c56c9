use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, Transaction, TransactionBehavior};

use super::queries::find_overlapping_in;
use super::shared::{map_appointment_row, serialize_participants, APPOINTMENT_COLUMNS};
use super::AppointmentService;
use crate::error::ScheduleError;
use crate::models::appointment::{Appointment, AppointmentDraft, AppointmentId};
use crate::services::database::to_sql_timestamp;

impl<'a> AppointmentService<'a> {
    /// Commit a new appointment, refusing it if its room is already booked.
    pub fn create(&self, draft: &AppointmentDraft) -> Result<Appointment> {
        let mut appointment = self.prepare(draft, AppointmentId::Temporary(0))?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)
            .context("Failed to start transaction")?;
        self.ensure_bookable(&tx, &appointment, None)?;

        let now = to_sql_timestamp(Utc::now());
        tx.execute(
            "INSERT INTO appointments (
                title, description, start_at, end_at, is_all_day, room_id,
                category, color, participants, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
            params![
                appointment.title,
                appointment.description,
                to_sql_timestamp(appointment.start),
                to_sql_timestamp(appointment.end),
                appointment.all_day as i32,
                appointment.room.map(|r| r.0),
                appointment.category,
                appointment.color,
                serialize_participants(&appointment.participants),
                now,
            ],
        )
        .context("Failed to insert appointment")?;

        appointment.id = AppointmentId::Committed(tx.last_insert_rowid());
        tx.commit().context("Failed to commit appointment")?;

        log::info!(
            "Created appointment {} '{}' in room {:?}",
            appointment.id,
            appointment.title,
            appointment.room
        );
        Ok(appointment)
    }

    /// Replace the fields of a committed appointment.
    pub fn update(&self, id: i64, draft: &AppointmentDraft) -> Result<Appointment> {
        let appointment = self.prepare(draft, AppointmentId::Committed(id))?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)
            .context("Failed to start transaction")?;
        self.ensure_bookable(&tx, &appointment, Some(id))?;

        let rows_affected = tx
            .execute(
                "UPDATE appointments SET
                    title = ?1, description = ?2, start_at = ?3, end_at = ?4, is_all_day = ?5,
                    room_id = ?6, category = ?7, color = ?8, participants = ?9, updated_at = ?10
                 WHERE id = ?11",
                params![
                    appointment.title,
                    appointment.description,
                    to_sql_timestamp(appointment.start),
                    to_sql_timestamp(appointment.end),
                    appointment.all_day as i32,
                    appointment.room.map(|r| r.0),
                    appointment.category,
                    appointment.color,
                    serialize_participants(&appointment.participants),
                    to_sql_timestamp(Utc::now()),
                    id,
                ],
            )
            .context("Failed to update appointment")?;

        if rows_affected == 0 {
            return Err(ScheduleError::NotFound(id).into());
        }
        tx.commit().context("Failed to commit appointment")?;

        log::info!("Updated appointment {}", appointment.id);
        Ok(appointment)
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM appointments WHERE id = ?1", [id])
            .context("Failed to delete appointment")?;

        if rows_affected == 0 {
            return Err(ScheduleError::NotFound(id).into());
        }

        log::info!("Deleted appointment {}", id);
        Ok(())
    }

    pub fn get(&self, id: i64) -> Result<Option<Appointment>> {
        let result = self.conn.query_row(
            &format!("SELECT {} FROM appointments WHERE id = ?1", APPOINTMENT_COLUMNS),
            [id],
            map_appointment_row,
        );

        match result {
            Ok(appointment) => Ok(Some(appointment)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e).context("Failed to load appointment"),
        }
    }

    /// Materialize and validate a draft. All-day appointments are stored
    /// with their effective whole-day range.
    fn prepare(&self, draft: &AppointmentDraft, id: AppointmentId) -> Result<Appointment> {
        if draft.end < draft.start {
            return Err(ScheduleError::InvalidRange.into());
        }

        let mut appointment = draft.to_appointment(id, "");
        appointment.validate().map_err(|e| anyhow!(e))?;

        if appointment.all_day {
            let (start, end) = appointment.effective_range(&self.tz);
            appointment.start = start;
            appointment.end = end;
        }
        Ok(appointment)
    }

    fn ensure_bookable(
        &self,
        conn: &Connection,
        appointment: &Appointment,
        exclude: Option<i64>,
    ) -> Result<()> {
        let Some(room) = appointment.room else {
            return Ok(());
        };

        let room_exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM rooms WHERE id = ?1)",
                [room.0],
                |row| row.get(0),
            )
            .context("Failed to look up room")?;
        if !room_exists {
            return Err(ScheduleError::UnknownRoom(room).into());
        }

        let conflicting: Vec<AppointmentId> =
            find_overlapping_in(conn, room, appointment.start, appointment.end, exclude)?
                .into_iter()
                .map(|a| a.id)
                .collect();
        if !conflicting.is_empty() {
            log::warn!(
                "Refusing booking of room {}: overlaps {:?}",
                room,
                conflicting
            );
            return Err(ScheduleError::RoomConflict { room, conflicting }.into());
        }
        Ok(())
    }
}
