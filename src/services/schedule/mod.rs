//! Room time-grid scheduling engine.
//!
//! Pure layout and state logic for the single-day room grid. Nothing in here
//! touches storage or the UI toolkit: data comes in through a
//! [`source::ScheduleSource`], geometry goes out as a [`layout::RenderModel`].

use std::time::Duration;

pub mod context;
pub mod current_time;
pub mod ghost;
pub mod interaction;
pub mod layout;
pub mod positioner;
pub mod source;
pub mod viewport;

/// Minimum width of one hour column in the wide layout
pub const MIN_CELL_WIDTH: f32 = 60.0;
/// Room label column to the left of the wide grid (outside the time area)
pub const ROOM_COLUMN_WIDTH: f32 = 150.0;
/// Height of one room row in the wide layout
pub const ROW_HEIGHT: f32 = 100.0;

/// Widths below this use the narrow layout
pub const MOBILE_BREAKPOINT: f32 = 768.0;
/// Maximum rooms per stacked sub-grid in the narrow layout
pub const MAX_ROOMS_PER_GROUP: usize = 6;
pub const MOBILE_TIME_COLUMN_WIDTH: f32 = 50.0;
pub const MOBILE_MIN_ROOM_COLUMN_WIDTH: f32 = 60.0;
pub const MOBILE_PIXELS_PER_HOUR: f32 = 60.0;

/// Cadence of the current time marker refresh
pub const TICK_INTERVAL: Duration = Duration::from_secs(30);
/// Quiet period before a burst of resize events is applied
pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(180);
