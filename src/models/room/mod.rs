//! Room model.
//!
//! Rooms are the bookable physical spaces an appointment may be assigned to.
//! They are loaded once per view and stay immutable while the grid is shown.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized room identifier.
///
/// Every room reference coming from storage or from the editing form is
/// resolved to this type once, so layout code compares plain integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub i64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RoomId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    /// Display label shown in the room header (e.g. "Room 101")
    pub label: String,
    /// Physical location (building / site) the room belongs to
    pub location: Option<String>,
}

impl Room {
    pub fn new(id: impl Into<RoomId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            location: None,
        }
    }

    /// Build a room whose label is derived from its room number.
    pub fn from_number(id: impl Into<RoomId>, number: &str) -> Self {
        Self::new(id, format!("Room {}", number.trim()))
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}
