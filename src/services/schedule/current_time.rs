//! Live "now" marker and active-appointment highlighting.
//!
//! The tracker is polled from the UI loop. Each evaluation produces an
//! immutable [`TimeSnapshot`]; the renderer redraws from the snapshot
//! instead of patching individual boxes.

use std::collections::HashSet;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};
use chrono_tz::Tz;

use super::positioner::GridGeometry;
use crate::models::appointment::{Appointment, AppointmentId};
use crate::models::schedule::{contains_instant, TimeWindow};
use crate::utils::date::{format_time, minutes_since_midnight};

/// `start <= now < end`. An appointment ending exactly at `now` is no
/// longer active.
pub fn is_active(now: DateTime<Utc>, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    contains_instant(start, end, now)
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeMarker {
    /// Offset along the time axis, same mapping as appointment boxes
    pub offset: f32,
    /// Wall-clock label, `HH:MM`
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimeSnapshot {
    pub taken_at: Option<DateTime<Utc>>,
    pub marker: Option<TimeMarker>,
    pub active: HashSet<AppointmentId>,
}

impl TimeSnapshot {
    pub fn is_active(&self, id: &AppointmentId) -> bool {
        self.active.contains(id)
    }
}

pub struct CurrentTimeTracker {
    window: TimeWindow,
    tz: Tz,
    interval: Duration,
    next_due_at: Option<DateTime<Utc>>,
    running: bool,
}

impl CurrentTimeTracker {
    pub fn new(window: TimeWindow, tz: Tz, interval: StdDuration) -> Self {
        let interval = Duration::from_std(interval).unwrap_or_else(|_| Duration::seconds(30));
        Self {
            window,
            tz,
            interval: interval.max(Duration::seconds(1)),
            next_due_at: None,
            running: false,
        }
    }

    /// Start ticking; the first tick is due immediately (view mount).
    pub fn start(&mut self) {
        self.running = true;
        self.next_due_at = None;
    }

    /// Release the timer (view teardown). Later ticks yield nothing.
    pub fn stop(&mut self) {
        self.running = false;
        self.next_due_at = None;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Evaluate if the cadence has elapsed since the last evaluation.
    pub fn tick(
        &mut self,
        now: DateTime<Utc>,
        viewed_day: NaiveDate,
        geometry: &GridGeometry,
        appointments: &[Appointment],
    ) -> Option<TimeSnapshot> {
        if !self.running {
            return None;
        }
        if self.next_due_at.is_some_and(|due| now < due) {
            return None;
        }
        Some(self.refresh(now, viewed_day, geometry, appointments))
    }

    /// Evaluate unconditionally (data refresh) and restart the cadence.
    pub fn refresh(
        &mut self,
        now: DateTime<Utc>,
        viewed_day: NaiveDate,
        geometry: &GridGeometry,
        appointments: &[Appointment],
    ) -> TimeSnapshot {
        if self.running {
            self.next_due_at = Some(now + self.interval);
        }

        let active = appointments
            .iter()
            .filter(|appointment| {
                let (start, end) = appointment.effective_range(&self.tz);
                is_active(now, start, end)
            })
            .map(|appointment| appointment.id)
            .collect();

        TimeSnapshot {
            taken_at: Some(now),
            marker: self.marker(now, viewed_day, geometry),
            active,
        }
    }

    /// Marker for `now`, or `None` when the viewed day is not today or the
    /// current hour lies outside the visible window.
    pub fn marker(
        &self,
        now: DateTime<Utc>,
        viewed_day: NaiveDate,
        geometry: &GridGeometry,
    ) -> Option<TimeMarker> {
        let local = now.with_timezone(&self.tz);
        if local.date_naive() != viewed_day || !self.window.contains_hour(local.hour()) {
            return None;
        }

        let minute_of_day = minutes_since_midnight(now, viewed_day, &self.tz);
        Some(TimeMarker {
            offset: self
                .window
                .pixel_offset(minute_of_day, geometry.pixels_per_hour()),
            label: format_time(now, &self.tz),
        })
    }

    /// Time until the next evaluation is due, for scheduling a repaint.
    pub fn next_due_in(&self, now: DateTime<Utc>) -> Option<StdDuration> {
        if !self.running {
            return None;
        }
        let Some(due) = self.next_due_at else {
            return Some(StdDuration::ZERO);
        };
        Some((due - now).to_std().unwrap_or(StdDuration::ZERO))
    }
}
