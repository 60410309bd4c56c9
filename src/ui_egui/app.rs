use std::time::Instant;

use anyhow::Result;
use chrono::{NaiveDate, NaiveTime, Utc};
use egui::RichText;

use super::draft_panel::{render_draft_panel, DraftAction, DraftForm};
use super::room_grid::{measured_width, render_room_grid, ScrollState};
use super::toast::ToastManager;
use crate::models::appointment::AppointmentId;
use crate::models::room::RoomId;
use crate::models::settings::Settings;
use crate::services::schedule::context::ScheduleContext;
use crate::services::schedule::interaction::EventActivation;
use crate::services::schedule::RESIZE_DEBOUNCE;
use crate::services::store::ScheduleStore;
use crate::utils::date::{format_time, minutes_since_midnight};

const INITIAL_WIDTH: f32 = 1550.0;

pub struct SchedulerApp {
    store: ScheduleStore,
    schedule: ScheduleContext,
    scroll: ScrollState,
    form: Option<DraftForm>,
    /// Appointment whose details popover is open
    popover: Option<AppointmentId>,
    tutoring_details: Option<i64>,
    toasts: ToastManager,
    width_applied: bool,
}

impl eframe::App for SchedulerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Utc::now();
        if !self.schedule.is_mounted() {
            self.schedule.mount(&self.store, now);
        }

        self.render_toolbar(ctx);
        self.render_form(ctx);
        self.render_grid(ctx);
        self.render_popover(ctx);
        self.render_tutoring_details(ctx);

        self.toasts.extend(self.schedule.take_notices());
        self.toasts.render(ctx);

        if self.schedule.has_pending_resize() {
            ctx.request_repaint_after(RESIZE_DEBOUNCE);
        }
        if let Some(due) = self.schedule.next_tick_in(Utc::now()) {
            ctx.request_repaint_after(due);
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.schedule.unmount(&mut self.scroll);
    }
}

impl SchedulerApp {
    pub fn new(store: ScheduleStore, settings: &Settings) -> Result<Self> {
        let tz = settings.timezone()?;
        let today = Utc::now().with_timezone(&tz).date_naive();
        let schedule = ScheduleContext::from_settings(settings, today, INITIAL_WIDTH)?;
        log::info!(
            "Room grid for {} ({}, {:02}:00-{:02}:00)",
            today,
            tz,
            settings.start_hour,
            settings.end_hour
        );

        Ok(Self {
            store,
            schedule,
            scroll: ScrollState::default(),
            form: None,
            popover: None,
            tutoring_details: None,
            toasts: ToastManager::new(),
            width_applied: false,
        })
    }

    fn today(&self) -> NaiveDate {
        Utc::now()
            .with_timezone(&self.schedule.timezone())
            .date_naive()
    }

    fn navigate(&mut self, day: NaiveDate) {
        self.popover = None;
        self.schedule.navigate(day, &self.store, Utc::now());
    }

    fn render_toolbar(&mut self, ctx: &egui::Context) {
        let day = self.schedule.day();
        let mut target = None;

        egui::TopBottomPanel::top("schedule_toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("◀").clicked() {
                    target = day.pred_opt();
                }
                if ui.button("Today").clicked() {
                    target = Some(self.today());
                }
                if ui.button("▶").clicked() {
                    target = day.succ_opt();
                }
                ui.label(RichText::new(day.format("%A, %d %B %Y").to_string()).strong());

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let can_create = self.form.is_none();
                    if ui
                        .add_enabled(can_create, egui::Button::new("New appointment"))
                        .clicked()
                    {
                        self.open_slot(None, None);
                    }
                    if ui.button("Reload").clicked() {
                        self.schedule.reload_rooms(&self.store);
                        self.schedule.reload_appointments(&self.store, Utc::now());
                    }
                });
            });
        });

        if let Some(day) = target {
            self.navigate(day);
        }
    }

    fn render_grid(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let now = Utc::now();
            let width = measured_width(ui);
            if self.width_applied {
                self.schedule.queue_resize(width, Instant::now());
                self.schedule.flush_resize(Instant::now(), now);
            } else {
                self.schedule.apply_width(width, now);
                self.width_applied = true;
            }
            self.schedule.tick(now);

            let model = self.schedule.render_model();
            let scroll_to = self.scroll.take_target().and_then(|at| {
                let grid = model.grid()?;
                let minutes = minutes_since_midnight(at, self.schedule.day(), &self.schedule.timezone());
                Some(
                    self.schedule
                        .window()
                        .pixel_offset(minutes, grid.geometry.pixels_per_hour()),
                )
            });

            let response = render_room_grid(ui, &model, self.schedule.window(), scroll_to);

            if let Some(grid) = model.grid() {
                if !grid.unplaced.is_empty() {
                    ui.separator();
                    ui.horizontal_wrapped(|ui| {
                        ui.label(RichText::new("Unassigned:").weak());
                        for appointment in &grid.unplaced {
                            let label = format!(
                                "{} {}",
                                format_time(appointment.start, &self.schedule.timezone()),
                                appointment.title
                            );
                            if ui.link(label).clicked() {
                                self.activate(appointment.id);
                            }
                        }
                    });
                }
            }

            if let Some(id) = response.activated {
                self.activate(id);
            } else if let Some((room, time)) = response.slot_clicked {
                if self.form.is_none() {
                    self.open_slot(room, time);
                }
            }
        });
    }

    fn activate(&mut self, id: AppointmentId) {
        match self.schedule.on_event_activated(id) {
            Some(EventActivation::OpenPopover(id)) => self.popover = Some(id),
            Some(EventActivation::OpenTutoringDetails(id)) => self.tutoring_details = Some(id),
            None => log::debug!("Activated appointment {} is no longer loaded", id),
        }
    }

    fn open_slot(&mut self, room: Option<RoomId>, time: Option<NaiveTime>) {
        let selection = self.schedule.on_slot_clicked(room, time);
        let draft = self.schedule.draft_for_slot(&selection);
        self.schedule.begin_new_draft(&draft, &mut self.scroll);
        self.form = Some(DraftForm::from_draft(&draft, None, &self.schedule.timezone()));
    }

    fn open_edit(&mut self, id: AppointmentId) {
        match self.schedule.begin_edit(id, &mut self.scroll) {
            Ok(draft) => {
                self.form = Some(DraftForm::from_draft(&draft, Some(id), &self.schedule.timezone()));
                self.popover = None;
            }
            Err(e) => self.toasts.error(format!("{}", e)),
        }
    }

    fn render_form(&mut self, ctx: &egui::Context) {
        let tz = self.schedule.timezone();
        let Some(form) = self.form.as_mut() else {
            return;
        };

        let rooms = self.schedule.rooms().unwrap_or(&[]);
        let available: Vec<RoomId> = match form.to_draft(&tz) {
            Ok(draft) => self
                .schedule
                .available_rooms(draft.start, draft.end)
                .into_iter()
                .map(|room| room.id)
                .collect(),
            Err(_) => rooms.iter().map(|room| room.id).collect(),
        };

        let Some(action) = render_draft_panel(ctx, form, rooms, &available) else {
            return;
        };

        match action {
            DraftAction::Changed => {
                if let Ok(draft) = form.to_draft(&tz) {
                    self.schedule.set_ghost_event(&draft, &mut self.scroll);
                }
            }
            DraftAction::Save => match form.to_draft(&tz) {
                Ok(draft) => match self.schedule.save_draft(&draft, &self.store, Utc::now()) {
                    Ok(saved) => {
                        self.toasts.success(format!("Saved \"{}\"", saved.title));
                        self.form = None;
                    }
                    Err(e) => {
                        log::warn!("Saving draft failed: {:#}", e);
                        form.error_message = Some(e.to_string());
                    }
                },
                Err(message) => form.error_message = Some(message),
            },
            DraftAction::Cancel => {
                self.schedule.cancel_draft();
                self.form = None;
            }
            DraftAction::Delete => {
                if let Some(id) = form.editing {
                    match self.schedule.delete_appointment(id, &self.store, Utc::now()) {
                        Ok(()) => {
                            self.toasts.success("Appointment deleted");
                            self.form = None;
                        }
                        Err(e) => form.error_message = Some(e.to_string()),
                    }
                }
            }
        }
    }

    fn render_popover(&mut self, ctx: &egui::Context) {
        let Some(id) = self.popover else {
            return;
        };
        let Some(appointment) = self.schedule.appointment(id).cloned() else {
            self.popover = None;
            return;
        };

        let tz = self.schedule.timezone();
        let room = appointment.room.and_then(|room| {
            self.schedule
                .rooms()
                .and_then(|rooms| rooms.iter().find(|r| r.id == room))
                .map(|r| r.label.clone())
        });

        let mut open = true;
        let mut edit = false;
        egui::Window::new(appointment.title.as_str())
            .id(egui::Id::new(("appointment_popover", id)))
            .collapsible(false)
            .resizable(false)
            .open(&mut open)
            .show(ctx, |ui| {
                ui.label(format!(
                    "{} - {}",
                    format_time(appointment.start, &tz),
                    format_time(appointment.end, &tz)
                ));
                ui.label(room.unwrap_or_else(|| "No room".to_string()));
                if let Some(category) = &appointment.category {
                    ui.label(RichText::new(category).weak());
                }
                if !appointment.participants.is_empty() {
                    ui.label(appointment.participants.join(", "));
                }
                if let Some(description) = &appointment.description {
                    ui.separator();
                    ui.label(description);
                }
                ui.add_space(6.0);
                if ui
                    .add_enabled(self.form.is_none(), egui::Button::new("Edit"))
                    .clicked()
                {
                    edit = true;
                }
            });

        if edit {
            self.open_edit(id);
        } else if !open {
            self.popover = None;
        }
    }

    fn render_tutoring_details(&mut self, ctx: &egui::Context) {
        let Some(id) = self.tutoring_details else {
            return;
        };
        let appointment = self
            .schedule
            .appointment(AppointmentId::Committed(id))
            .cloned();
        let tz = self.schedule.timezone();

        let mut open = true;
        egui::Window::new("Tutoring session")
            .id(egui::Id::new(("tutoring_details", id)))
            .collapsible(false)
            .open(&mut open)
            .show(ctx, |ui| match &appointment {
                Some(appointment) => {
                    ui.heading(&appointment.title);
                    ui.label(format!(
                        "{} - {} ({} min)",
                        format_time(appointment.start, &tz),
                        format_time(appointment.end, &tz),
                        appointment.duration().num_minutes()
                    ));
                    if appointment.participants.is_empty() {
                        ui.label(RichText::new("No participants").weak());
                    }
                    for participant in &appointment.participants {
                        ui.label(format!("• {}", participant));
                    }
                }
                None => {
                    ui.label(format!("Session #{} is not on this day", id));
                }
            });

        if !open {
            self.tutoring_details = None;
        }
    }
}
