// Settings module
// Scheduler configuration loaded from config.toml

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ScheduleError;
use crate::models::schedule::TimeWindow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// First visible hour of the grid
    pub start_hour: u32,
    /// Hour at which the grid ends (exclusive)
    pub end_hour: u32,
    /// Widths below this render the narrow (mobile) layout
    pub breakpoint: f32,
    /// Maximum rooms per sub-grid in the narrow layout
    pub group_size: usize,
    /// Cadence of the current time marker refresh
    pub tick_seconds: u64,
    /// IANA timezone used for wall-clock display (e.g. "Europe/Berlin")
    pub display_timezone: String,
    /// Default length of appointments created from a slot click
    pub default_duration_minutes: i64,
    /// SQLite database file; defaults to the platform data directory
    pub database_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            start_hour: 8,
            end_hour: 22,
            breakpoint: 768.0,
            group_size: 6,
            tick_seconds: 30,
            display_timezone: "Europe/Berlin".to_string(),
            default_duration_minutes: 60,
            database_path: None,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), ScheduleError> {
        self.time_window()?;
        self.timezone()?;

        if !self.breakpoint.is_finite() || self.breakpoint <= 0.0 {
            return Err(ScheduleError::InvalidConfig(
                "breakpoint must be a positive width".to_string(),
            ));
        }
        if self.group_size == 0 {
            return Err(ScheduleError::InvalidConfig(
                "group_size must be at least 1".to_string(),
            ));
        }
        if self.tick_seconds == 0 {
            return Err(ScheduleError::InvalidConfig(
                "tick_seconds must be at least 1".to_string(),
            ));
        }
        if self.default_duration_minutes <= 0 {
            return Err(ScheduleError::InvalidConfig(
                "default_duration_minutes must be positive".to_string(),
            ));
        }

        Ok(())
    }

    pub fn time_window(&self) -> Result<TimeWindow, ScheduleError> {
        TimeWindow::new(self.start_hour, self.end_hour)
    }

    pub fn timezone(&self) -> Result<Tz, ScheduleError> {
        self.display_timezone.parse::<Tz>().map_err(|e| {
            ScheduleError::InvalidConfig(format!(
                "unknown timezone '{}': {}",
                self.display_timezone, e
            ))
        })
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_seconds.max(1))
    }
}
