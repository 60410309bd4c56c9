//! Paints a [`RenderModel`] and turns clicks into grid interactions.
//!
//! All geometry comes from the layout engine; this module only maps model
//! coordinates onto screen rectangles.

use chrono::{DateTime, NaiveTime, Utc};
use egui::{Align2, Color32, FontId, Mesh, Pos2, Rect, Sense, Shape, Stroke, Vec2};

use crate::models::appointment::AppointmentId;
use crate::models::room::RoomId;
use crate::models::schedule::TimeWindow;
use crate::services::schedule::current_time::TimeMarker;
use crate::services::schedule::ghost::GridNavigator;
use crate::services::schedule::layout::{
    EventBox, GridLineKind, GridModel, GridSection, RenderModel, NO_ROOMS_MESSAGE,
};
use crate::services::schedule::positioner::GridGeometry;
use crate::services::schedule::ROW_HEIGHT;
use crate::utils::color::parse_hex_rgba;

const HEADER_HEIGHT: f32 = 28.0;
const SECTION_SPACING: f32 = 16.0;
const EVENT_INSET: f32 = 2.0;
const MARKER_COLOR: Color32 = Color32::from_rgb(255, 100, 100);

/// Pending scroll request from the ghost controller, consumed by the next
/// frame that paints the grid.
#[derive(Debug, Default)]
pub struct ScrollState {
    target: Option<DateTime<Utc>>,
}

impl ScrollState {
    pub fn take_target(&mut self) -> Option<DateTime<Utc>> {
        self.target.take()
    }
}

impl GridNavigator for ScrollState {
    fn scroll_to_time(&mut self, at: DateTime<Utc>) {
        self.target = Some(at);
    }

    fn cancel_scroll(&mut self) {
        self.target = None;
    }
}

#[derive(Debug, Default)]
pub struct GridResponse {
    pub activated: Option<AppointmentId>,
    pub slot_clicked: Option<(Option<RoomId>, Option<NaiveTime>)>,
}

/// Width reported to the viewport tracker: the whole grid panel. Each
/// regime reserves its own label column out of it.
pub fn measured_width(ui: &egui::Ui) -> f32 {
    ui.available_width()
}

/// Paint the model. `scroll_to` is an offset along the time axis that the
/// scroll area should bring into view.
pub fn render_room_grid(
    ui: &mut egui::Ui,
    model: &RenderModel,
    window: &TimeWindow,
    scroll_to: Option<f32>,
) -> GridResponse {
    match model {
        RenderModel::Loading => {
            ui.centered_and_justified(|ui| ui.spinner());
            GridResponse::default()
        }
        RenderModel::NoRooms => {
            ui.centered_and_justified(|ui| {
                ui.label(egui::RichText::new(NO_ROOMS_MESSAGE).color(Color32::GRAY));
            });
            GridResponse::default()
        }
        RenderModel::Grid(grid) => {
            let mut response = GridResponse::default();
            egui::ScrollArea::both()
                .id_source("room_grid_scroll")
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    for (index, section) in grid.sections.iter().enumerate() {
                        if index > 0 {
                            ui.add_space(SECTION_SPACING);
                        }
                        let part = render_section(ui, grid, section, window, index == 0, scroll_to);
                        response.activated = response.activated.or(part.activated);
                        response.slot_clicked = response.slot_clicked.or(part.slot_clicked);
                    }
                });
            response
        }
    }
}

fn render_section(
    ui: &mut egui::Ui,
    grid: &GridModel,
    section: &GridSection,
    window: &TimeWindow,
    first: bool,
    scroll_to: Option<f32>,
) -> GridResponse {
    let desktop = grid.geometry.is_desktop();
    let size = Vec2::new(
        grid.label_column_width + section.content_width,
        HEADER_HEIGHT + section.content_height,
    );
    let (rect, background) = ui.allocate_exact_size(size, Sense::click());
    let origin = rect.min + Vec2::new(grid.label_column_width, HEADER_HEIGHT);
    let painter = ui.painter_at(rect);
    let visuals = ui.visuals().clone();
    let line_color = visuals.widgets.noninteractive.bg_stroke.color;
    let label_color = visuals.weak_text_color();

    // Time axis
    for line in &grid.time_axis {
        let stroke = match line.kind {
            GridLineKind::Hour => Stroke::new(1.0, line_color),
            GridLineKind::HalfHour => Stroke::new(0.5, line_color),
            GridLineKind::QuarterHour => Stroke::new(0.5, line_color.gamma_multiply(0.5)),
        };
        if desktop {
            let x = origin.x + line.offset;
            painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
            if let Some(label) = &line.label {
                painter.text(
                    Pos2::new(x + 3.0, rect.top() + 4.0),
                    Align2::LEFT_TOP,
                    label,
                    FontId::proportional(12.0),
                    label_color,
                );
            }
        } else {
            let y = origin.y + line.offset;
            painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
            if let Some(label) = &line.label {
                painter.text(
                    Pos2::new(rect.left() + 4.0, y + 2.0),
                    Align2::LEFT_TOP,
                    label,
                    FontId::proportional(11.0),
                    label_color,
                );
            }
        }
    }

    // Room headers
    for header in &section.rooms {
        let text = match &header.location {
            Some(location) => format!("{}\n{}", header.label, location),
            None => header.label.clone(),
        };
        match grid.geometry {
            GridGeometry::Desktop { .. } => {
                let top = origin.y + header.slot as f32 * ROW_HEIGHT;
                painter.line_segment(
                    [Pos2::new(rect.left(), top), Pos2::new(rect.right(), top)],
                    Stroke::new(1.0, line_color),
                );
                painter.text(
                    Pos2::new(rect.left() + 8.0, top + ROW_HEIGHT / 2.0),
                    Align2::LEFT_CENTER,
                    text,
                    FontId::proportional(14.0),
                    visuals.text_color(),
                );
            }
            GridGeometry::Mobile { room_column_width } => {
                let left = origin.x + header.slot as f32 * room_column_width;
                painter.line_segment(
                    [Pos2::new(left, rect.top()), Pos2::new(left, rect.bottom())],
                    Stroke::new(1.0, line_color),
                );
                painter.text(
                    Pos2::new(left + room_column_width / 2.0, rect.top() + 4.0),
                    Align2::CENTER_TOP,
                    header.label.as_str(),
                    FontId::proportional(12.0),
                    visuals.text_color(),
                );
            }
        }
    }

    let mut response = GridResponse::default();

    for event in &section.events {
        let event_rect = Rect::from_min_size(
            origin + Vec2::new(event.rect.left, event.rect.top),
            Vec2::new(event.rect.width, event.rect.height),
        )
        .shrink(EVENT_INSET);
        if event_rect.width() <= 0.0 || event_rect.height() <= 0.0 {
            continue;
        }

        paint_event(&painter, event_rect, event, desktop);

        let id = ui.id().with(("room_grid_event", event.id));
        let event_response = ui
            .interact(event_rect, id, Sense::click())
            .on_hover_text(&event.tooltip);
        if event_response.clicked() {
            response.activated = Some(event.id);
        }
    }

    if let Some(marker) = &grid.marker {
        paint_marker(&painter, rect, origin, marker, desktop);
    }

    if response.activated.is_none() && background.clicked() {
        if let Some(pos) = background.interact_pointer_pos() {
            response.slot_clicked = slot_at(grid, section, window, origin, pos);
        }
    }

    if first {
        if let Some(offset) = scroll_to {
            let target = if desktop {
                Rect::from_min_size(Pos2::new(origin.x + offset, rect.top()), Vec2::new(1.0, 1.0))
            } else {
                Rect::from_min_size(Pos2::new(rect.left(), origin.y + offset), Vec2::new(1.0, 1.0))
            };
            ui.scroll_to_rect(target, Some(egui::Align::Center));
        }
    }

    response
}

fn paint_event(painter: &egui::Painter, rect: Rect, event: &EventBox, desktop: bool) {
    let start = color32(&event.fill);
    let end = color32(&event.fill_end);

    // Gradient runs along the time axis
    let mut mesh = Mesh::default();
    let (c_tl, c_tr, c_br, c_bl) = if desktop {
        (start, end, end, start)
    } else {
        (start, start, end, end)
    };
    mesh.colored_vertex(rect.left_top(), c_tl);
    mesh.colored_vertex(rect.right_top(), c_tr);
    mesh.colored_vertex(rect.right_bottom(), c_br);
    mesh.colored_vertex(rect.left_bottom(), c_bl);
    mesh.add_triangle(0, 1, 2);
    mesh.add_triangle(0, 2, 3);
    painter.add(Shape::mesh(mesh));

    let text_color = color32(&event.text_color);
    if event.is_active {
        painter.rect_stroke(rect, 3.0, Stroke::new(2.0, MARKER_COLOR));
    } else if event.is_ghost {
        painter.rect_stroke(rect, 3.0, Stroke::new(1.0, text_color.gamma_multiply(0.6)));
    }

    let clipped = painter.with_clip_rect(rect.shrink(2.0));
    clipped.text(
        rect.left_top() + Vec2::new(4.0, 3.0),
        Align2::LEFT_TOP,
        &event.title,
        FontId::proportional(13.0),
        text_color,
    );
    clipped.text(
        rect.left_top() + Vec2::new(4.0, 19.0),
        Align2::LEFT_TOP,
        &event.time_label,
        FontId::proportional(11.0),
        text_color,
    );
}

fn paint_marker(painter: &egui::Painter, rect: Rect, origin: Pos2, marker: &TimeMarker, desktop: bool) {
    let stroke = Stroke::new(2.0, MARKER_COLOR);
    if desktop {
        let x = origin.x + marker.offset;
        painter.line_segment([Pos2::new(x, origin.y), Pos2::new(x, rect.bottom())], stroke);
        painter.circle_filled(Pos2::new(x, origin.y), 3.0, MARKER_COLOR);
        painter.text(
            Pos2::new(x + 3.0, origin.y - 2.0),
            Align2::LEFT_BOTTOM,
            &marker.label,
            FontId::proportional(11.0),
            MARKER_COLOR,
        );
    } else {
        let y = origin.y + marker.offset;
        painter.line_segment([Pos2::new(origin.x, y), Pos2::new(rect.right(), y)], stroke);
        painter.circle_filled(Pos2::new(origin.x, y), 3.0, MARKER_COLOR);
    }
}

/// Room and wall-clock time under a click inside a section.
fn slot_at(
    grid: &GridModel,
    section: &GridSection,
    window: &TimeWindow,
    origin: Pos2,
    pos: Pos2,
) -> Option<(Option<RoomId>, Option<NaiveTime>)> {
    let local = pos - origin;
    let (slot, along) = match grid.geometry {
        GridGeometry::Desktop { .. } => ((local.y / ROW_HEIGHT).floor(), local.x),
        GridGeometry::Mobile { room_column_width } => {
            ((local.x / room_column_width).floor(), local.y)
        }
    };
    if slot < 0.0 || along < 0.0 {
        return None;
    }

    let room = section
        .rooms
        .iter()
        .find(|header| header.slot == slot as usize)
        .map(|header| header.room);
    let minutes = (along / grid.geometry.pixels_per_minute()) as u32;
    let minute_of_day = (window.start_hour() * 60 + minutes).min(window.end_hour() * 60 - 1);
    let time = NaiveTime::from_hms_opt(minute_of_day / 60, minute_of_day % 60, 0);
    Some((room, time))
}

fn color32(hex: &str) -> Color32 {
    parse_hex_rgba(hex)
        .map(|(r, g, b, a)| Color32::from_rgba_unmultiplied(r, g, b, a))
        .unwrap_or(Color32::GRAY)
}
