use rusqlite::Row;

use crate::models::appointment::{Appointment, AppointmentId};
use crate::models::room::RoomId;
use crate::services::database::from_sql_timestamp;

pub(crate) const APPOINTMENT_COLUMNS: &str = "id, title, description, start_at, end_at, is_all_day,
     room_id, category, color, participants";

pub(crate) fn serialize_participants(participants: &[String]) -> String {
    serde_json::to_string(participants).unwrap_or_else(|_| "[]".to_string())
}

pub(crate) fn deserialize_participants(json: &str) -> rusqlite::Result<Vec<String>> {
    serde_json::from_str(json).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

pub(crate) fn map_appointment_row(row: &Row<'_>) -> rusqlite::Result<Appointment> {
    Ok(Appointment {
        id: AppointmentId::Committed(row.get(0)?),
        title: row.get(1)?,
        description: row.get(2)?,
        start: from_sql_timestamp(&row.get::<_, String>(3)?)?,
        end: from_sql_timestamp(&row.get::<_, String>(4)?)?,
        all_day: row.get::<_, i32>(5)? != 0,
        room: row.get::<_, Option<i64>>(6)?.map(RoomId),
        category: row.get(7)?,
        color: row.get(8)?,
        participants: deserialize_participants(&row.get::<_, String>(9)?)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_participants_json() {
        let json = serialize_participants(&["Alex".to_string(), "Sam \"S\"".to_string()]);
        assert_eq!(
            deserialize_participants(&json).unwrap(),
            vec!["Alex".to_string(), "Sam \"S\"".to_string()]
        );
        assert!(deserialize_participants("not json").is_err());
    }
}
