//! Ghost (draft preview) appointment.
//!
//! While the editing form is open, the values being typed are mirrored into a
//! single synthetic appointment with the reserved [`AppointmentId::Ghost`]
//! id. The ghost is rendered through the normal layout path but never takes
//! part in availability checks or commits.

use chrono::{DateTime, Utc};

use crate::models::appointment::{Appointment, AppointmentDraft, AppointmentId};
use crate::utils::color::DEFAULT_EVENT_COLOR;

pub const GHOST_DEFAULT_TITLE: &str = "New appointment";

/// Scrolls the rendered grid. Implemented by the UI shell.
#[cfg_attr(test, mockall::automock)]
pub trait GridNavigator {
    fn scroll_to_time(&mut self, at: DateTime<Utc>);
    fn cancel_scroll(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftOrigin {
    New,
    /// Editing a committed appointment, which is hidden while drafting
    Edit(AppointmentId),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum GhostState {
    #[default]
    Absent,
    Drafting {
        ghost: Appointment,
        origin: DraftOrigin,
    },
}

#[derive(Debug, Default)]
pub struct GhostEventController {
    state: GhostState,
}

impl GhostEventController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GhostState {
        &self.state
    }

    pub fn ghost(&self) -> Option<&Appointment> {
        match &self.state {
            GhostState::Drafting { ghost, .. } => Some(ghost),
            GhostState::Absent => None,
        }
    }

    pub fn origin(&self) -> Option<DraftOrigin> {
        match &self.state {
            GhostState::Drafting { origin, .. } => Some(*origin),
            GhostState::Absent => None,
        }
    }

    pub fn is_drafting(&self) -> bool {
        matches!(self.state, GhostState::Drafting { .. })
    }

    /// Open the form for a new appointment.
    pub fn begin_new(&mut self, draft: &AppointmentDraft, navigator: &mut dyn GridNavigator) {
        self.enter(draft, DraftOrigin::New, navigator);
    }

    /// Open the form for an existing appointment.
    pub fn begin_edit(
        &mut self,
        id: AppointmentId,
        draft: &AppointmentDraft,
        navigator: &mut dyn GridNavigator,
    ) {
        self.enter(draft, DraftOrigin::Edit(id), navigator);
    }

    /// Mirror a form change. Replaces any previous ghost; outside a drafting
    /// session this starts a new one.
    pub fn set_ghost_event(&mut self, draft: &AppointmentDraft, navigator: &mut dyn GridNavigator) {
        let origin = self.origin().unwrap_or(DraftOrigin::New);
        self.enter(draft, origin, navigator);
    }

    pub fn clear_ghost_event(&mut self) {
        if self.is_drafting() {
            log::debug!("Ghost event cleared");
        }
        self.state = GhostState::Absent;
    }

    /// The form was submitted. Returns the origin so the caller knows
    /// whether to create or update.
    pub fn save(&mut self) -> Option<DraftOrigin> {
        let origin = self.origin();
        self.clear_ghost_event();
        origin
    }

    pub fn cancel(&mut self) {
        self.clear_ghost_event();
    }

    /// View unmount: drop the ghost and stop any scroll still in flight.
    pub fn teardown(&mut self, navigator: &mut dyn GridNavigator) {
        self.clear_ghost_event();
        navigator.cancel_scroll();
    }

    /// The appointment set to render: committed appointments without stale
    /// ghost entries or the appointment under edit, plus the current ghost.
    pub fn overlay(&self, committed: &[Appointment]) -> Vec<Appointment> {
        let hidden = match self.origin() {
            Some(DraftOrigin::Edit(id)) => Some(id),
            _ => None,
        };

        let mut appointments: Vec<Appointment> = committed
            .iter()
            .filter(|a| !is_ghost(a) && Some(a.id) != hidden)
            .cloned()
            .collect();

        if let Some(ghost) = self.ghost() {
            appointments.push(ghost.clone());
        }
        appointments
    }

    fn enter(
        &mut self,
        draft: &AppointmentDraft,
        origin: DraftOrigin,
        navigator: &mut dyn GridNavigator,
    ) {
        let ghost = derive_ghost(draft);
        navigator.scroll_to_time(ghost.start);
        self.state = GhostState::Drafting { ghost, origin };
    }
}

pub fn is_ghost(appointment: &Appointment) -> bool {
    appointment.id.is_ghost()
}

/// Remove any ghost entries from a fetched appointment list.
pub fn purge_orphans(appointments: &mut Vec<Appointment>) {
    appointments.retain(|a| !is_ghost(a));
}

fn derive_ghost(draft: &AppointmentDraft) -> Appointment {
    let mut ghost = draft.to_appointment(AppointmentId::Ghost, GHOST_DEFAULT_TITLE);
    if ghost.color.is_none() {
        ghost.color = Some(DEFAULT_EVENT_COLOR.to_string());
    }
    ghost
}
