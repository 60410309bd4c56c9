//! SQLite storage for rooms and appointments.

mod connection;
pub mod migrations;
pub mod schema;

pub use connection::Database;

use chrono::{DateTime, SecondsFormat, Utc};

/// Timestamps are stored as RFC 3339 UTC strings with all nine fractional
/// digits and a `Z` suffix. Fixed width keeps lexicographic order equal to
/// time order, sub-second parts included.
pub(crate) fn to_sql_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub(crate) fn from_sql_timestamp(value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}
