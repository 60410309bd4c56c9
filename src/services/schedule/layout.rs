//! The pure layout function: rooms, appointments and a viewport in, a
//! [`RenderModel`] out.
//!
//! Renderers only paint what this produces. Nothing here reads the clock or
//! any global state; everything time-dependent arrives via the
//! [`TimeSnapshot`].

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use chrono_tz::Tz;

use super::current_time::{TimeMarker, TimeSnapshot};
use super::positioner::{EventPositioner, EventRect, GridGeometry};
use super::viewport::{group_rooms, LayoutRegime, ViewportState};
use super::{MOBILE_TIME_COLUMN_WIDTH, ROOM_COLUMN_WIDTH, ROW_HEIGHT};
use crate::models::appointment::{Appointment, AppointmentId};
use crate::models::room::{Room, RoomId};
use crate::models::schedule::{overlaps, TimeWindow};
use crate::utils::color::{
    contrast_text_color, darken, parse_hex_rgb, with_alpha, DEFAULT_EVENT_COLOR,
};
use crate::utils::date::{day_bounds, format_time};

/// Gradient end stop is the base color darkened by this much per channel
const GRADIENT_DARKEN: u8 = 20;
/// Ghost boxes are drawn at half opacity
const GHOST_ALPHA: u8 = 0x80;

pub const ALL_DAY_LABEL: &str = "All day";
pub const NO_ROOMS_MESSAGE: &str = "No rooms available";

pub struct LayoutInput<'a> {
    /// `None` while the room directory is still loading
    pub rooms: Option<&'a [Room]>,
    /// Committed appointments with the ghost overlay already applied
    pub appointments: &'a [Appointment],
    pub viewport: ViewportState,
    pub window: &'a TimeWindow,
    pub day: NaiveDate,
    pub tz: Tz,
    pub snapshot: &'a TimeSnapshot,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderModel {
    Loading,
    NoRooms,
    Grid(GridModel),
}

impl RenderModel {
    pub fn grid(&self) -> Option<&GridModel> {
        match self {
            RenderModel::Grid(grid) => Some(grid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridLineKind {
    Hour,
    HalfHour,
    QuarterHour,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridLine {
    pub offset: f32,
    pub kind: GridLineKind,
    /// `HH:00` for hour lines
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoomHeader {
    pub room: RoomId,
    pub label: String,
    pub location: Option<String>,
    /// Row (wide) or column within the section (narrow)
    pub slot: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventBox {
    pub id: AppointmentId,
    pub room: RoomId,
    pub rect: EventRect,
    pub title: String,
    pub time_label: String,
    pub tooltip: String,
    pub fill: String,
    pub fill_end: String,
    pub text_color: String,
    pub is_active: bool,
    pub is_ghost: bool,
    pub is_all_day: bool,
    pub is_tutoring: bool,
}

/// One grid: the whole room list in the wide layout, one room group in the
/// narrow layout.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSection {
    pub rooms: Vec<RoomHeader>,
    pub events: Vec<EventBox>,
    pub content_width: f32,
    pub content_height: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridModel {
    pub regime: LayoutRegime,
    pub geometry: GridGeometry,
    pub time_axis: Vec<GridLine>,
    pub sections: Vec<GridSection>,
    /// Appointments of the day that are not assigned to any room
    pub unplaced: Vec<Appointment>,
    pub marker: Option<TimeMarker>,
    /// Room label column (wide) or time label column (narrow)
    pub label_column_width: f32,
    pub time_extent: f32,
}

impl GridModel {
    pub fn events(&self) -> impl Iterator<Item = &EventBox> {
        self.sections.iter().flat_map(|s| s.events.iter())
    }

    pub fn find_event(&self, id: AppointmentId) -> Option<&EventBox> {
        self.events().find(|e| e.id == id)
    }
}

pub fn layout(input: &LayoutInput<'_>) -> RenderModel {
    let Some(rooms) = input.rooms else {
        return RenderModel::Loading;
    };
    if rooms.is_empty() {
        return RenderModel::NoRooms;
    }
    let rooms = unique_rooms(rooms);
    let rooms = rooms.as_slice();

    let geometry = GridGeometry::for_viewport(&input.viewport, rooms.len(), input.window);
    let positioner = EventPositioner::new(input.window, geometry, input.day, input.tz);
    let time_extent = geometry.time_extent(input.window);

    let groups: Vec<&[Room]> = match input.viewport.regime {
        LayoutRegime::Wide => vec![rooms],
        LayoutRegime::Narrow => {
            group_rooms(rooms, input.viewport.group_size.unwrap_or(rooms.len()))
        }
    };

    let mut placement: HashMap<RoomId, (usize, usize)> = HashMap::new();
    let mut sections: Vec<GridSection> = groups
        .iter()
        .enumerate()
        .map(|(section, group)| {
            let headers: Vec<RoomHeader> = group
                .iter()
                .enumerate()
                .map(|(slot, room)| {
                    placement.insert(room.id, (section, slot));
                    RoomHeader {
                        room: room.id,
                        label: room.label.clone(),
                        location: room.location.clone(),
                        slot,
                    }
                })
                .collect();
            let (content_width, content_height) = match geometry {
                GridGeometry::Desktop { .. } => (time_extent, headers.len() as f32 * ROW_HEIGHT),
                GridGeometry::Mobile { room_column_width } => {
                    (headers.len() as f32 * room_column_width, time_extent)
                }
            };
            GridSection {
                rooms: headers,
                events: Vec::new(),
                content_width,
                content_height,
            }
        })
        .collect();

    let (day_start, day_end) = day_bounds(input.day, &input.tz);
    let mut unplaced = Vec::new();

    for appointment in input.appointments {
        let (start, end) = appointment.effective_range(&input.tz);
        // Zero-length appointments still show up on their own day
        let touches_day = overlaps(start, end, day_start, day_end)
            || (start == end && start >= day_start && start < day_end);
        if !touches_day {
            log::debug!("Skipping appointment {} outside {}", appointment.id, input.day);
            continue;
        }

        let Some(room) = appointment.room else {
            unplaced.push(appointment.clone());
            continue;
        };
        let Some(&(section, slot)) = placement.get(&room) else {
            log::warn!(
                "Appointment {} references unknown room {}, not rendered",
                appointment.id,
                room
            );
            continue;
        };

        let rect = positioner.position(appointment, slot);
        sections[section]
            .events
            .push(event_box(appointment, room, rect, input.snapshot, &input.tz));
    }

    RenderModel::Grid(GridModel {
        regime: input.viewport.regime,
        geometry,
        time_axis: time_axis(input.window, &geometry),
        sections,
        unplaced,
        marker: input.snapshot.marker.clone(),
        label_column_width: match geometry {
            GridGeometry::Desktop { .. } => ROOM_COLUMN_WIDTH,
            GridGeometry::Mobile { .. } => MOBILE_TIME_COLUMN_WIDTH,
        },
        time_extent,
    })
}

/// Room directory with repeated ids dropped, first occurrence wins.
fn unique_rooms(rooms: &[Room]) -> Vec<Room> {
    let mut seen = HashSet::with_capacity(rooms.len());
    rooms
        .iter()
        .filter(|room| {
            let first = seen.insert(room.id);
            if !first {
                log::warn!("Duplicate room {} in directory, ignored", room.id);
            }
            first
        })
        .cloned()
        .collect()
}

/// Hour lines with labels; the narrow layout adds half and quarter hours.
pub fn time_axis(window: &TimeWindow, geometry: &GridGeometry) -> Vec<GridLine> {
    let pph = geometry.pixels_per_hour();
    let fine = !geometry.is_desktop();
    let mut lines = Vec::new();

    for (index, hour) in window.hour_range().enumerate() {
        let base = index as f32 * pph;
        lines.push(GridLine {
            offset: base,
            kind: GridLineKind::Hour,
            label: Some(format!("{:02}:00", hour)),
        });
        if fine {
            for (quarter, kind) in [
                (1, GridLineKind::QuarterHour),
                (2, GridLineKind::HalfHour),
                (3, GridLineKind::QuarterHour),
            ] {
                lines.push(GridLine {
                    offset: base + quarter as f32 * pph / 4.0,
                    kind,
                    label: None,
                });
            }
        }
    }
    lines
}

fn event_box(
    appointment: &Appointment,
    room: RoomId,
    rect: EventRect,
    snapshot: &TimeSnapshot,
    tz: &Tz,
) -> EventBox {
    let base = appointment
        .color
        .as_deref()
        .filter(|c| parse_hex_rgb(c).is_some())
        .unwrap_or(DEFAULT_EVENT_COLOR);
    let darker = darken(base, GRADIENT_DARKEN).unwrap_or_else(|| base.to_string());
    let is_ghost = appointment.id.is_ghost();

    let (fill, fill_end) = if is_ghost {
        (
            with_alpha(base, GHOST_ALPHA).unwrap_or_else(|| base.to_string()),
            with_alpha(&darker, GHOST_ALPHA).unwrap_or_else(|| darker.clone()),
        )
    } else {
        (base.to_string(), darker)
    };

    let time_label = if appointment.all_day {
        ALL_DAY_LABEL.to_string()
    } else {
        format!(
            "{} - {}",
            format_time(appointment.start, tz),
            format_time(appointment.end, tz)
        )
    };

    EventBox {
        id: appointment.id,
        room,
        rect,
        title: appointment.title.clone(),
        tooltip: format!("{}\n{}", appointment.title, time_label),
        time_label,
        fill,
        fill_end,
        text_color: contrast_text_color(base).to_string(),
        is_active: !is_ghost && snapshot.is_active(&appointment.id),
        is_ghost,
        is_all_day: appointment.all_day,
        is_tutoring: appointment.is_tutoring(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::schedule::viewport::ViewportClassifier;
    use chrono::{DateTime, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, h, m, 0).unwrap()
    }

    fn rooms(count: i64) -> Vec<Room> {
        (1..=count).map(|i| Room::from_number(i, &format!("{}", 100 + i))).collect()
    }

    fn booking(id: i64, room: Option<i64>, start: DateTime<Utc>, end: DateTime<Utc>) -> Appointment {
        let mut appointment = Appointment::new(format!("Booking {}", id), start, end).unwrap();
        appointment.id = AppointmentId::Committed(id);
        appointment.room = room.map(RoomId);
        appointment
    }

    fn run(rooms: Option<&[Room]>, appointments: &[Appointment], width: f32) -> RenderModel {
        let window = TimeWindow::default();
        let snapshot = TimeSnapshot::default();
        layout(&LayoutInput {
            rooms,
            appointments,
            viewport: ViewportClassifier::default().viewport(width),
            window: &window,
            day: day(),
            tz: Tz::UTC,
            snapshot: &snapshot,
        })
    }

    #[test]
    fn test_loading_and_empty_placeholders() {
        assert_eq!(run(None, &[], 1550.0), RenderModel::Loading);
        assert_eq!(run(Some(&[]), &[], 1550.0), RenderModel::NoRooms);
    }

    #[test]
    fn test_wide_layout_scenario() {
        let rooms = rooms(3);
        let appointments = vec![booking(1, Some(3), at(9, 30), at(11, 0))];
        let model = run(Some(&rooms), &appointments, 1550.0);
        let grid = model.grid().unwrap();

        assert_eq!(grid.regime, LayoutRegime::Wide);
        assert_eq!(grid.sections.len(), 1);
        assert_eq!(grid.label_column_width, ROOM_COLUMN_WIDTH);
        assert_eq!(grid.sections[0].content_height, 300.0);

        let event = grid.find_event(AppointmentId::Committed(1)).unwrap();
        assert_eq!(
            event.rect,
            EventRect {
                left: 150.0,
                top: 200.0,
                width: 150.0,
                height: ROW_HEIGHT
            }
        );
        assert_eq!(event.time_label, "09:30 - 11:00");
        assert_eq!(event.tooltip, "Booking 1\n09:30 - 11:00");
        assert_eq!(event.fill, DEFAULT_EVENT_COLOR);
        assert_eq!(event.fill_end, "#2374c4");
    }

    #[test]
    fn test_narrow_layout_groups_rooms() {
        let rooms = rooms(7);
        let appointments = vec![booking(1, Some(7), at(9, 0), at(10, 0))];
        let model = run(Some(&rooms), &appointments, 500.0);
        let grid = model.grid().unwrap();

        let sizes: Vec<usize> = grid.sections.iter().map(|s| s.rooms.len()).collect();
        assert_eq!(sizes, vec![6, 1]);
        assert_eq!(grid.label_column_width, MOBILE_TIME_COLUMN_WIDTH);

        // Room 7 is the first column of the second group
        assert!(grid.sections[0].events.is_empty());
        let event = &grid.sections[1].events[0];
        assert_eq!(event.rect.left, 0.0);
        assert_eq!(event.rect.top, 60.0);
        assert_eq!(event.rect.height, 60.0);
    }

    #[test]
    fn test_unknown_room_is_excluded_not_forced() {
        let rooms = rooms(2);
        let appointments = vec![
            booking(1, Some(99), at(9, 0), at(10, 0)),
            booking(2, Some(1), at(9, 0), at(10, 0)),
        ];
        let model = run(Some(&rooms), &appointments, 1550.0);
        let grid = model.grid().unwrap();

        assert_eq!(grid.events().count(), 1);
        assert!(grid.find_event(AppointmentId::Committed(1)).is_none());
    }

    #[test]
    fn test_duplicate_rooms_render_once() {
        let mut directory = rooms(3);
        let mut repeat = directory[1].clone();
        repeat.label = "Room 102 again".to_string();
        directory.push(repeat);
        let appointments = vec![booking(1, Some(2), at(9, 0), at(10, 0))];

        let model = run(Some(&directory), &appointments, 1550.0);
        let grid = model.grid().unwrap();
        let headers: Vec<&str> = grid.sections[0].rooms.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(headers, vec!["Room 101", "Room 102", "Room 103"]);
        assert_eq!(grid.sections[0].content_height, 300.0);
        assert_eq!(grid.events().count(), 1);
        assert_eq!(grid.sections[0].events[0].rect.top, ROW_HEIGHT);
    }

    #[test]
    fn test_duplicate_rooms_do_not_add_narrow_columns() {
        let mut directory = rooms(2);
        directory.push(directory[0].clone());
        let model = run(Some(&directory), &[], 450.0);
        let grid = model.grid().unwrap();

        assert_eq!(grid.sections.len(), 1);
        assert_eq!(grid.sections[0].rooms.len(), 2);
        assert_eq!(grid.geometry, GridGeometry::Mobile { room_column_width: 200.0 });
    }

    #[test]
    fn test_unassigned_goes_to_unplaced() {
        let rooms = rooms(2);
        let appointments = vec![booking(5, None, at(9, 0), at(10, 0))];
        let model = run(Some(&rooms), &appointments, 1550.0);
        let grid = model.grid().unwrap();

        assert_eq!(grid.events().count(), 0);
        assert_eq!(grid.unplaced.len(), 1);
        assert_eq!(grid.unplaced[0].id, AppointmentId::Committed(5));
    }

    #[test]
    fn test_other_days_are_skipped() {
        let rooms = rooms(1);
        let tomorrow = at(9, 0) + chrono::Duration::days(1);
        let appointments = vec![booking(1, Some(1), tomorrow, tomorrow + chrono::Duration::hours(1))];
        let model = run(Some(&rooms), &appointments, 1550.0);
        assert_eq!(model.grid().unwrap().events().count(), 0);
    }

    #[test]
    fn test_ghost_styling() {
        let rooms = rooms(1);
        let mut ghost = booking(0, Some(1), at(9, 0), at(10, 0));
        ghost.id = AppointmentId::Ghost;
        ghost.color = Some("#fde047".to_string());

        let model = run(Some(&rooms), &[ghost], 1550.0);
        let event = &model.grid().unwrap().sections[0].events[0];
        assert!(event.is_ghost);
        assert!(!event.is_active);
        assert_eq!(event.fill, "#fde04780");
        assert_eq!(event.text_color, "#000000");
    }

    #[test]
    fn test_active_flag_from_snapshot() {
        let rooms = rooms(1);
        let appointments = vec![booking(1, Some(1), at(9, 0), at(10, 0))];
        let window = TimeWindow::default();
        let mut snapshot = TimeSnapshot::default();
        snapshot.active.insert(AppointmentId::Committed(1));

        let model = layout(&LayoutInput {
            rooms: Some(&rooms),
            appointments: &appointments,
            viewport: ViewportClassifier::default().viewport(1550.0),
            window: &window,
            day: day(),
            tz: Tz::UTC,
            snapshot: &snapshot,
        });
        assert!(model.grid().unwrap().sections[0].events[0].is_active);
    }

    #[test]
    fn test_all_day_label_and_extent() {
        let rooms = rooms(1);
        let mut all_day = booking(1, Some(1), at(0, 0), at(23, 59));
        all_day.all_day = true;
        let model = run(Some(&rooms), &[all_day], 1550.0);
        let event = &model.grid().unwrap().sections[0].events[0];
        assert_eq!(event.time_label, ALL_DAY_LABEL);
        assert_eq!(event.rect.width, 1550.0);
    }

    #[test]
    fn test_time_axis_density() {
        let window = TimeWindow::default();
        let desktop = time_axis(&window, &GridGeometry::Desktop { pixels_per_hour: 100.0 });
        assert_eq!(desktop.len(), 14);
        assert_eq!(desktop[1].label.as_deref(), Some("09:00"));
        assert_eq!(desktop[1].offset, 100.0);

        let mobile = time_axis(&window, &GridGeometry::Mobile { room_column_width: 80.0 });
        assert_eq!(mobile.len(), 56);
        assert_eq!(mobile[2].kind, GridLineKind::HalfHour);
        assert_eq!(mobile[2].offset, 30.0);
    }
}
