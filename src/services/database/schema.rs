use anyhow::{Context, Result};
use rusqlite::Connection;

use super::migrations;

pub fn initialize_schema(conn: &Connection) -> Result<()> {
    create_rooms_table(conn)?;
    create_appointments_table(conn)?;
    run_migrations(conn)?;
    create_indexes(conn)?;
    Ok(())
}

fn create_rooms_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS rooms (
            id INTEGER PRIMARY KEY,
            label TEXT NOT NULL,
            location TEXT,
            sort_order INTEGER NOT NULL DEFAULT 0
        )",
        [],
    )
    .context("Failed to create rooms table")?;

    Ok(())
}

fn create_appointments_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS appointments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT,
            start_at TEXT NOT NULL,
            end_at TEXT NOT NULL,
            is_all_day INTEGER NOT NULL DEFAULT 0,
            room_id INTEGER REFERENCES rooms(id) ON DELETE SET NULL,
            category TEXT,
            color TEXT,
            participants TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            CHECK (end_at >= start_at)
        )",
        [],
    )
    .context("Failed to create appointments table")?;

    Ok(())
}

fn run_migrations(conn: &Connection) -> Result<()> {
    let added = migrations::run(conn)?;
    if added > 0 {
        log::info!("Schema migrated, {} column(s) added", added);
    }
    Ok(())
}

fn create_indexes(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_appointments_room_time
         ON appointments(room_id, start_at, end_at)",
        [],
    )
    .context("Failed to create appointment room index")?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_appointments_start ON appointments(start_at)",
        [],
    )
    .context("Failed to create appointment start index")?;

    Ok(())
}
