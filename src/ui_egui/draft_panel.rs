use chrono::{NaiveDate, NaiveTime, Timelike};
use chrono_tz::Tz;
use egui::{Color32, RichText};

use crate::models::appointment::{AppointmentDraft, AppointmentId};
use crate::models::room::{Room, RoomId};
use crate::utils::color::{parse_hex_rgb, to_hex, DEFAULT_EVENT_COLOR};
use crate::utils::date::{local_instant, local_midnight};

/// Editable form state behind the draft side panel.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftForm {
    /// `None` while creating a new appointment
    pub editing: Option<AppointmentId>,

    pub title: String,
    pub description: String,
    pub category: String,
    pub color: String,
    /// Comma separated
    pub participants: String,

    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub all_day: bool,
    pub room: Option<RoomId>,

    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftAction {
    Changed,
    Save,
    Cancel,
    Delete,
}

impl DraftForm {
    pub fn from_draft(draft: &AppointmentDraft, editing: Option<AppointmentId>, tz: &Tz) -> Self {
        let start = draft.start.with_timezone(tz);
        let end = draft.end.with_timezone(tz);
        // A timed draft crossing midnight is shown on its start day
        let end_time = if end.date_naive() > start.date_naive() {
            NaiveTime::from_hms_opt(23, 45, 0).unwrap_or(NaiveTime::MIN)
        } else {
            end.time()
        };

        Self {
            editing,
            title: draft.title.clone().unwrap_or_default(),
            description: draft.description.clone().unwrap_or_default(),
            category: draft.category.clone().unwrap_or_default(),
            color: draft.color.clone().unwrap_or_default(),
            participants: draft.participants.join(", "),
            date: start.date_naive(),
            start_time: start.time(),
            end_time,
            all_day: draft.all_day,
            room: draft.room,
            error_message: None,
        }
    }

    fn validate(&self) -> Result<(), String> {
        if !self.all_day && self.end_time <= self.start_time {
            return Err("End time must be after start time".to_string());
        }
        if !self.color.trim().is_empty() && parse_hex_rgb(self.color.trim()).is_none() {
            return Err("Color must be a hex value like #3788d8".to_string());
        }
        Ok(())
    }

    /// Build the draft in `tz`. Blank text fields become `None`.
    pub fn to_draft(&self, tz: &Tz) -> Result<AppointmentDraft, String> {
        self.validate()?;

        let (start, end) = if self.all_day {
            let next = self
                .date
                .succ_opt()
                .ok_or_else(|| "Date is out of range".to_string())?;
            (local_midnight(self.date, tz), local_midnight(next, tz))
        } else {
            (
                local_instant(self.date, self.start_time, tz),
                local_instant(self.date, self.end_time, tz),
            )
        };

        let mut draft = AppointmentDraft::new(start, end);
        draft.title = non_empty(&self.title);
        draft.description = non_empty(&self.description);
        draft.category = non_empty(&self.category);
        draft.color = non_empty(&self.color);
        draft.all_day = self.all_day;
        draft.room = self.room;
        draft.participants = self
            .participants
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        Ok(draft)
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Render the side panel. `available` lists the rooms free for the current
/// draft window; other rooms are still selectable but marked busy.
pub fn render_draft_panel(
    ctx: &egui::Context,
    form: &mut DraftForm,
    rooms: &[Room],
    available: &[RoomId],
) -> Option<DraftAction> {
    let before = form.clone();
    let mut action = None;

    egui::SidePanel::right("draft_panel")
        .resizable(true)
        .default_width(320.0)
        .show(ctx, |ui| {
            ui.heading(if form.editing.is_some() {
                "Edit appointment"
            } else {
                "New appointment"
            });
            ui.add_space(8.0);

            if let Some(ref error) = form.error_message {
                ui.colored_label(Color32::RED, RichText::new(error).strong());
                ui.add_space(8.0);
            }

            egui::Grid::new("draft_fields")
                .num_columns(2)
                .spacing([8.0, 6.0])
                .show(ui, |ui| {
                    ui.label("Title:");
                    ui.text_edit_singleline(&mut form.title);
                    ui.end_row();

                    ui.label("Room:");
                    render_room_picker(ui, &mut form.room, rooms, available);
                    ui.end_row();

                    ui.label("Date:");
                    ui.horizontal(|ui| {
                        if ui.small_button("<").clicked() {
                            form.date = form.date.pred_opt().unwrap_or(form.date);
                        }
                        ui.label(RichText::new(form.date.format("%a %d %b %Y").to_string()).strong());
                        if ui.small_button(">").clicked() {
                            form.date = form.date.succ_opt().unwrap_or(form.date);
                        }
                    });
                    ui.end_row();

                    ui.label("All day:");
                    ui.checkbox(&mut form.all_day, "");
                    ui.end_row();

                    if !form.all_day {
                        ui.label("Start:");
                        render_time_picker(ui, "start", &mut form.start_time);
                        ui.end_row();

                        ui.label("End:");
                        render_time_picker(ui, "end", &mut form.end_time);
                        ui.end_row();
                    }

                    ui.label("Category:");
                    ui.text_edit_singleline(&mut form.category);
                    ui.end_row();

                    ui.label("Color:");
                    ui.horizontal(|ui| {
                        ui.add(
                            egui::TextEdit::singleline(&mut form.color)
                                .hint_text(DEFAULT_EVENT_COLOR)
                                .desired_width(80.0),
                        );
                        if let Some((r, g, b)) = parse_hex_rgb(form.color.trim()) {
                            let mut color = Color32::from_rgb(r, g, b);
                            if ui.color_edit_button_srgba(&mut color).changed() {
                                form.color = to_hex(color.r(), color.g(), color.b());
                            }
                        }
                    });
                    ui.end_row();

                    ui.label("Participants:");
                    ui.text_edit_singleline(&mut form.participants);
                    ui.end_row();
                });

            ui.label("Description:");
            ui.text_edit_multiline(&mut form.description);

            ui.add_space(12.0);
            ui.horizontal(|ui| {
                if ui.button("Save").clicked() {
                    action = Some(DraftAction::Save);
                }
                if ui.button("Cancel").clicked() {
                    action = Some(DraftAction::Cancel);
                }
                if form.editing.is_some() && ui.button("Delete").clicked() {
                    action = Some(DraftAction::Delete);
                }
            });
        });

    if action.is_none() && *form != before {
        form.error_message = None;
        action = Some(DraftAction::Changed);
    }
    action
}

fn render_room_picker(
    ui: &mut egui::Ui,
    selected: &mut Option<RoomId>,
    rooms: &[Room],
    available: &[RoomId],
) {
    let label_for = |room: &Room| {
        if available.contains(&room.id) {
            room.label.clone()
        } else {
            format!("{} (busy)", room.label)
        }
    };
    let selected_text = selected
        .and_then(|id| rooms.iter().find(|r| r.id == id))
        .map_or_else(|| "Unassigned".to_string(), label_for);

    egui::ComboBox::from_id_source("draft_room")
        .selected_text(selected_text)
        .show_ui(ui, |ui| {
            ui.selectable_value(selected, None, "Unassigned");
            for room in rooms {
                ui.selectable_value(selected, Some(room.id), label_for(room));
            }
        });
}

/// Hour and quarter-hour dropdowns.
fn render_time_picker(ui: &mut egui::Ui, id: &str, time: &mut NaiveTime) {
    let mut hour = time.hour();
    let mut minute = time.minute();

    ui.horizontal(|ui| {
        egui::ComboBox::from_id_source(("draft_hour", id))
            .width(50.0)
            .selected_text(format!("{:02}", hour))
            .show_ui(ui, |ui| {
                for h in 0..24 {
                    ui.selectable_value(&mut hour, h, format!("{:02}", h));
                }
            });
        ui.label(":");
        egui::ComboBox::from_id_source(("draft_minute", id))
            .width(50.0)
            .selected_text(format!("{:02}", minute))
            .show_ui(ui, |ui| {
                for m in (0..60).step_by(15) {
                    ui.selectable_value(&mut minute, m, format!("{:02}", m));
                }
            });
    });

    if let Some(new_time) = NaiveTime::from_hms_opt(hour, minute, 0) {
        *time = new_time;
    }
}
