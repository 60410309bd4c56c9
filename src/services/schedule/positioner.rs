//! Maps appointment time ranges to rectangles inside a room's row or column.

use chrono::NaiveDate;
use chrono_tz::Tz;

use super::viewport::{LayoutRegime, ViewportState};
use super::{
    MIN_CELL_WIDTH, MOBILE_MIN_ROOM_COLUMN_WIDTH, MOBILE_PIXELS_PER_HOUR,
    MOBILE_TIME_COLUMN_WIDTH, ROOM_COLUMN_WIDTH, ROW_HEIGHT,
};
use crate::models::appointment::Appointment;
use crate::models::schedule::TimeWindow;
use crate::utils::date::minutes_since_midnight;

/// Position and size of an appointment box, relative to the top-left corner
/// of its (sub-)grid's content area.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EventRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl EventRect {
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Scale factors for the active layout regime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridGeometry {
    /// Time on the horizontal axis
    Desktop { pixels_per_hour: f32 },
    /// Time on the vertical axis at a fixed rate, rooms as columns
    Mobile { room_column_width: f32 },
}

impl GridGeometry {
    pub fn for_viewport(viewport: &ViewportState, room_count: usize, window: &TimeWindow) -> Self {
        match viewport.regime {
            LayoutRegime::Wide => GridGeometry::Desktop {
                pixels_per_hour: desktop_pixels_per_hour(viewport.width, window),
            },
            LayoutRegime::Narrow => {
                let rooms_per_row = room_count.min(viewport.group_size.unwrap_or(1)).max(1);
                GridGeometry::Mobile {
                    room_column_width: mobile_room_column_width(viewport.width, rooms_per_row),
                }
            }
        }
    }

    pub fn pixels_per_hour(&self) -> f32 {
        match self {
            GridGeometry::Desktop { pixels_per_hour } => *pixels_per_hour,
            GridGeometry::Mobile { .. } => MOBILE_PIXELS_PER_HOUR,
        }
    }

    pub fn pixels_per_minute(&self) -> f32 {
        self.pixels_per_hour() / 60.0
    }

    /// Length of the time axis for the whole window.
    pub fn time_extent(&self, window: &TimeWindow) -> f32 {
        window.extent(self.pixels_per_hour())
    }

    pub fn is_desktop(&self) -> bool {
        matches!(self, GridGeometry::Desktop { .. })
    }
}

/// `max((panel_width - ROOM_COLUMN_WIDTH) / visible_hours, MIN_CELL_WIDTH)`.
///
/// `panel_width` is the full width of the grid panel, room label column
/// included. Degenerate widths fall back to the minimum.
pub fn desktop_pixels_per_hour(panel_width: f32, window: &TimeWindow) -> f32 {
    let time_area = panel_width - ROOM_COLUMN_WIDTH;
    if !time_area.is_finite() || time_area <= 0.0 {
        return MIN_CELL_WIDTH;
    }
    (time_area / window.hours() as f32).max(MIN_CELL_WIDTH)
}

/// Width of one room column in the narrow layout, after reserving the time
/// label column out of the full panel width.
pub fn mobile_room_column_width(panel_width: f32, rooms_per_row: usize) -> f32 {
    if !panel_width.is_finite() {
        return MOBILE_MIN_ROOM_COLUMN_WIDTH;
    }
    let usable = panel_width - MOBILE_TIME_COLUMN_WIDTH;
    (usable / rooms_per_row.max(1) as f32).max(MOBILE_MIN_ROOM_COLUMN_WIDTH)
}

/// Positions appointments of one viewed day.
pub struct EventPositioner<'a> {
    window: &'a TimeWindow,
    geometry: GridGeometry,
    day: NaiveDate,
    tz: Tz,
}

impl<'a> EventPositioner<'a> {
    pub fn new(window: &'a TimeWindow, geometry: GridGeometry, day: NaiveDate, tz: Tz) -> Self {
        Self {
            window,
            geometry,
            day,
            tz,
        }
    }

    pub fn geometry(&self) -> GridGeometry {
        self.geometry
    }

    /// Offset and length along the time axis, clamped to the window.
    ///
    /// All-day appointments span the whole window. A reversed range yields a
    /// zero length at the start offset.
    pub fn time_span(&self, appointment: &Appointment) -> (f32, f32) {
        let pph = self.geometry.pixels_per_hour();
        if appointment.all_day {
            return (0.0, self.window.extent(pph));
        }

        let start_minute = minutes_since_midnight(appointment.start, self.day, &self.tz);
        let end_minute = minutes_since_midnight(appointment.end, self.day, &self.tz);

        let offset = self.window.pixel_offset(start_minute, pph);
        let end = self.window.pixel_offset(end_minute, pph);
        (offset, (end - offset).max(0.0))
    }

    /// Rectangle for an appointment in the room at `slot`: the row index in
    /// the wide layout, the column index within its group in the narrow one.
    pub fn position(&self, appointment: &Appointment, slot: usize) -> EventRect {
        let (offset, length) = self.time_span(appointment);
        match self.geometry {
            GridGeometry::Desktop { .. } => EventRect {
                left: offset,
                top: slot as f32 * ROW_HEIGHT,
                width: length,
                height: ROW_HEIGHT,
            },
            GridGeometry::Mobile { room_column_width } => EventRect {
                left: slot as f32 * room_column_width,
                top: offset,
                width: room_column_width,
                height: length,
            },
        }
    }
}
