//! Additive column migrations for databases created by older builds.
//!
//! Tables are created with their current shape; an older file only lacks
//! columns that were added later. Each entry in [`ADDED_COLUMNS`] is applied
//! once, when the column is missing.

use anyhow::{Context, Result};
use rusqlite::Connection;

/// A column added to an existing table after its first release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddedColumn {
    pub table: &'static str,
    pub column: &'static str,
    /// Column definition as it appears after `ADD COLUMN <name>`
    pub definition: &'static str,
}

/// Rooms gained an optional location; appointments gained a JSON list of
/// participants, empty for rows written before.
pub const ADDED_COLUMNS: &[AddedColumn] = &[
    AddedColumn {
        table: "rooms",
        column: "location",
        definition: "TEXT",
    },
    AddedColumn {
        table: "appointments",
        column: "participants",
        definition: "TEXT NOT NULL DEFAULT '[]'",
    },
];

pub fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = ?2",
            [table, column],
            |row| row.get(0),
        )
        .with_context(|| format!("Failed to inspect columns of {}", table))?;

    Ok(count > 0)
}

/// Adds the column unless it is already there. Returns whether it was added.
pub fn ensure_column(conn: &Connection, added: &AddedColumn) -> Result<bool> {
    if column_exists(conn, added.table, added.column)? {
        return Ok(false);
    }

    log::info!("Migrating {}: adding column {}", added.table, added.column);
    let ddl = format!(
        "ALTER TABLE {} ADD COLUMN {} {}",
        added.table, added.column, added.definition
    );
    conn.execute(&ddl, [])
        .with_context(|| format!("Failed to add {}.{}", added.table, added.column))?;
    Ok(true)
}

/// Apply every entry of [`ADDED_COLUMNS`]; returns how many columns were added.
pub fn run(conn: &Connection) -> Result<usize> {
    let mut added = 0;
    for column in ADDED_COLUMNS {
        if ensure_column(conn, column)? {
            added += 1;
        }
    }
    Ok(added)
}
