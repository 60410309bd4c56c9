//! Time window and interval types shared by the layout engine and the
//! availability checks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;
use crate::models::room::RoomId;

/// The fixed daily hour range rendered by the grid, `[start_hour, end_hour)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    start_hour: u32,
    end_hour: u32,
}

impl TimeWindow {
    pub fn new(start_hour: u32, end_hour: u32) -> Result<Self, ScheduleError> {
        if start_hour >= end_hour || end_hour > 24 {
            return Err(ScheduleError::InvalidTimeWindow {
                start_hour,
                end_hour,
            });
        }
        Ok(Self {
            start_hour,
            end_hour,
        })
    }

    pub fn start_hour(&self) -> u32 {
        self.start_hour
    }

    pub fn end_hour(&self) -> u32 {
        self.end_hour
    }

    /// Number of visible hours (always at least one).
    pub fn hours(&self) -> u32 {
        self.end_hour - self.start_hour
    }

    pub fn contains_hour(&self, hour: u32) -> bool {
        hour >= self.start_hour && hour < self.end_hour
    }

    /// Visible hours in order, used for axis labels.
    pub fn hour_range(&self) -> std::ops::Range<u32> {
        self.start_hour..self.end_hour
    }

    /// Minutes into the window for a wall-clock minute of the day, clamped
    /// to `[0, window length]`.
    pub fn clamp_minutes(&self, minute_of_day: f64) -> f64 {
        let start = f64::from(self.start_hour * 60);
        let end = f64::from(self.end_hour * 60);
        if minute_of_day.is_nan() {
            return 0.0;
        }
        minute_of_day.clamp(start, end) - start
    }

    /// Pixel offset of a wall-clock minute of the day along the time axis:
    /// `(hoursSinceStart + minuteFraction) * pixels_per_hour`.
    pub fn pixel_offset(&self, minute_of_day: f64, pixels_per_hour: f32) -> f32 {
        (self.clamp_minutes(minute_of_day) / 60.0) as f32 * pixels_per_hour
    }

    /// Pixel length of the whole window along the time axis.
    pub fn extent(&self, pixels_per_hour: f32) -> f32 {
        self.hours() as f32 * pixels_per_hour
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self {
            start_hour: 8,
            end_hour: 22,
        }
    }
}

/// Half-open interval intersection: `[s1, e1)` and `[s2, e2)` overlap iff
/// `s1 < e2 && s2 < e1`. Touching endpoints do not overlap.
pub fn overlaps<T: PartialOrd>(s1: T, e1: T, s2: T, e2: T) -> bool {
    s1 < e2 && s2 < e1
}

/// Active-window check, start inclusive and end exclusive.
pub fn contains_instant(start: DateTime<Utc>, end: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    start <= now && now < end
}

/// Candidate window for an availability query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlapQuery {
    pub room: RoomId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl OverlapQuery {
    /// Build a query, swapping the bounds when they arrive reversed.
    pub fn normalized(room: RoomId, a: DateTime<Utc>, b: DateTime<Utc>) -> Self {
        let (start, end) = if b < a { (b, a) } else { (a, b) };
        Self { room, start, end }
    }

    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        overlaps(self.start, self.end, start, end)
    }
}
