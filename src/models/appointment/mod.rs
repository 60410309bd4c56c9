// Appointment module
// Time-bounded scheduled item, optionally assigned to a room

use chrono::{DateTime, Duration, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::room::RoomId;
use crate::utils::date::local_midnight;

/// Category name that routes activation to the tutoring detail page.
pub const TUTORING_CATEGORY: &str = "Tutoring";

/// Identity of an appointment.
///
/// Temporary ids are handed out on the client before commit; the ghost
/// sentinel belongs to the draft preview and can never equal a stored id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppointmentId {
    Committed(i64),
    Temporary(u64),
    Ghost,
}

impl AppointmentId {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }

    pub fn is_ghost(&self) -> bool {
        matches!(self, Self::Ghost)
    }

    /// Storage id for committed appointments.
    pub fn committed_id(&self) -> Option<i64> {
        match self {
            Self::Committed(id) => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Committed(id) => write!(f, "{}", id),
            Self::Temporary(id) => write!(f, "tmp-{}", id),
            Self::Ghost => write!(f, "ghost-event"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub title: String,
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub all_day: bool,
    /// `None` means the appointment is not assigned to any room
    pub room: Option<RoomId>,
    pub category: Option<String>,
    /// Hex color (`#RRGGBB`)
    pub color: Option<String>,
    pub participants: Vec<String>,
}

impl Appointment {
    /// Create a temporary (not yet committed) appointment.
    ///
    /// # Examples
    /// ```
    /// use room_scheduler::models::appointment::Appointment;
    /// use chrono::{Duration, Utc};
    ///
    /// let start = Utc::now();
    /// let appointment = Appointment::new("Team Meeting", start, start + Duration::hours(1)).unwrap();
    /// assert!(!appointment.id.is_committed());
    /// ```
    pub fn new(
        title: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Self, String> {
        Self::builder().title(title).start(start).end(end).build()
    }

    pub fn builder() -> AppointmentBuilder {
        AppointmentBuilder::new()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Appointment title cannot be empty".to_string());
        }

        if self.end < self.start {
            return Err("Appointment end time must not be before start time".to_string());
        }

        if let Some(ref color) = self.color {
            if !is_hex_color(color) {
                return Err("Color must be in hex format (#RRGGBB)".to_string());
            }
        }

        Ok(())
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn is_tutoring(&self) -> bool {
        self.category
            .as_deref()
            .map(|c| c.eq_ignore_ascii_case(TUTORING_CATEGORY))
            .unwrap_or(false)
    }

    /// The half-open range the appointment actually occupies.
    ///
    /// All-day appointments cover whole local days: from midnight of the
    /// first day up to (excluding) midnight after the last day. A stored end
    /// of exactly midnight is already exclusive and is kept as is.
    pub fn effective_range(&self, tz: &Tz) -> (DateTime<Utc>, DateTime<Utc>) {
        if !self.all_day {
            return (self.start, self.end);
        }
        whole_day_range(self.start, self.end, tz)
    }
}

fn whole_day_range(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    tz: &Tz,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let first_day = start.with_timezone(tz).date_naive();
    let local_end = end.with_timezone(tz);
    let mut last_day = local_end.date_naive();
    if local_end.time() != NaiveTime::MIN || last_day == first_day {
        last_day = last_day.succ_opt().unwrap_or(last_day);
    }

    (local_midnight(first_day, tz), local_midnight(last_day, tz))
}

/// Field values produced by the editing form.
///
/// The form is responsible for field validation; drafts reaching the
/// scheduling core are assumed to be well formed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub all_day: bool,
    pub room: Option<RoomId>,
    pub category: Option<String>,
    pub color: Option<String>,
    pub participants: Vec<String>,
}

impl AppointmentDraft {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            title: None,
            description: None,
            start,
            end,
            all_day: false,
            room: None,
            category: None,
            color: None,
            participants: Vec::new(),
        }
    }

    pub fn in_room(mut self, room: RoomId) -> Self {
        self.room = Some(room);
        self
    }

    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Range the draft will occupy once stored; see
    /// [`Appointment::effective_range`].
    pub fn effective_range(&self, tz: &Tz) -> (DateTime<Utc>, DateTime<Utc>) {
        if !self.all_day {
            return (self.start, self.end);
        }
        whole_day_range(self.start, self.end, tz)
    }

    /// Copy the editable fields of an existing appointment.
    pub fn from_appointment(appointment: &Appointment) -> Self {
        Self {
            title: Some(appointment.title.clone()),
            description: appointment.description.clone(),
            start: appointment.start,
            end: appointment.end,
            all_day: appointment.all_day,
            room: appointment.room,
            category: appointment.category.clone(),
            color: appointment.color.clone(),
            participants: appointment.participants.clone(),
        }
    }

    /// Materialize the draft with the given identity, using `default_title`
    /// when the form left the title blank.
    pub fn to_appointment(&self, id: AppointmentId, default_title: &str) -> Appointment {
        let title = self
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(default_title)
            .to_string();

        Appointment {
            id,
            title,
            description: self.description.clone(),
            start: self.start,
            end: self.end,
            all_day: self.all_day,
            room: self.room,
            category: self.category.clone(),
            color: self.color.clone(),
            participants: self.participants.clone(),
        }
    }
}

/// Builder for creating appointments with optional fields
pub struct AppointmentBuilder {
    id: AppointmentId,
    title: Option<String>,
    description: Option<String>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    all_day: bool,
    room: Option<RoomId>,
    category: Option<String>,
    color: Option<String>,
    participants: Vec<String>,
}

impl AppointmentBuilder {
    pub fn new() -> Self {
        Self {
            id: AppointmentId::Temporary(0),
            title: None,
            description: None,
            start: None,
            end: None,
            all_day: false,
            room: None,
            category: None,
            color: None,
            participants: Vec::new(),
        }
    }

    pub fn id(mut self, id: AppointmentId) -> Self {
        self.id = id;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn start(mut self, start: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self
    }

    pub fn end(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }

    pub fn all_day(mut self, all_day: bool) -> Self {
        self.all_day = all_day;
        self
    }

    pub fn room(mut self, room: impl Into<RoomId>) -> Self {
        self.room = Some(room.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn participant(mut self, participant: impl Into<String>) -> Self {
        self.participants.push(participant.into());
        self
    }

    pub fn build(self) -> Result<Appointment, String> {
        let title = self.title.ok_or("Appointment title is required")?;
        let start = self.start.ok_or("Appointment start time is required")?;
        let end = self.end.ok_or("Appointment end time is required")?;

        let appointment = Appointment {
            id: self.id,
            title,
            description: self.description,
            start,
            end,
            all_day: self.all_day,
            room: self.room,
            category: self.category,
            color: self.color,
            participants: self.participants,
        };

        appointment.validate()?;
        Ok(appointment)
    }
}

impl Default for AppointmentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn is_hex_color(color: &str) -> bool {
    color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}
