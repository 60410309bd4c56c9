//! Viewport classification, room grouping and resize debouncing.

use std::time::{Duration, Instant};

use super::{MAX_ROOMS_PER_GROUP, MOBILE_BREAKPOINT, RESIZE_DEBOUNCE};
use crate::models::room::Room;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutRegime {
    /// Time runs horizontally, one row per room
    Wide,
    /// Time runs vertically, rooms are columns in stacked groups
    Narrow,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    /// Full width of the grid panel, label columns included
    pub width: f32,
    pub regime: LayoutRegime,
    /// Rooms per sub-grid, only set for the narrow regime
    pub group_size: Option<usize>,
}

impl ViewportState {
    pub fn is_narrow(&self) -> bool {
        self.regime == LayoutRegime::Narrow
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportClassifier {
    breakpoint: f32,
    group_size: usize,
}

impl Default for ViewportClassifier {
    fn default() -> Self {
        Self::new(MOBILE_BREAKPOINT, MAX_ROOMS_PER_GROUP)
    }
}

impl ViewportClassifier {
    pub fn new(breakpoint: f32, group_size: usize) -> Self {
        Self {
            breakpoint,
            group_size: group_size.max(1),
        }
    }

    pub fn group_size(&self) -> usize {
        self.group_size
    }

    /// `width < breakpoint` is narrow; non-finite widths are treated as narrow.
    pub fn classify(&self, width: f32) -> LayoutRegime {
        if width.is_finite() && width >= self.breakpoint {
            LayoutRegime::Wide
        } else {
            LayoutRegime::Narrow
        }
    }

    pub fn viewport(&self, width: f32) -> ViewportState {
        let regime = self.classify(width);
        ViewportState {
            width,
            regime,
            group_size: match regime {
                LayoutRegime::Narrow => Some(self.group_size),
                LayoutRegime::Wide => None,
            },
        }
    }
}

/// Partition rooms into consecutive groups of at most `group_size`,
/// preserving order.
pub fn group_rooms(rooms: &[Room], group_size: usize) -> Vec<&[Room]> {
    rooms.chunks(group_size.max(1)).collect()
}

/// Collapses bursts of resize notifications into a single viewport change.
///
/// Resize observers and window listeners can fire many times per second;
/// widths are queued and only applied once they have been stable for the
/// debounce period.
#[derive(Debug)]
pub struct ViewportTracker {
    classifier: ViewportClassifier,
    current: ViewportState,
    pending: Option<(f32, Instant)>,
    debounce: Duration,
}

impl ViewportTracker {
    pub fn new(classifier: ViewportClassifier, initial_width: f32) -> Self {
        Self {
            classifier,
            current: classifier.viewport(initial_width),
            pending: None,
            debounce: RESIZE_DEBOUNCE,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn current(&self) -> ViewportState {
        self.current
    }

    pub fn classifier(&self) -> &ViewportClassifier {
        &self.classifier
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Queue a width reported by a resize notification.
    ///
    /// Returns false when the width matches both the applied and the queued
    /// width, so repeated notifications do not restart the debounce timer.
    pub fn queue_resize(&mut self, width: f32, now: Instant) -> bool {
        match self.pending {
            Some((pending, _)) if pending == width => return false,
            None if self.current.width == width => return false,
            _ => {}
        }
        self.pending = Some((width, now));
        true
    }

    /// Apply a queued width once the debounce period has elapsed.
    ///
    /// Returns the new state only when it differs from the applied one.
    pub fn flush(&mut self, now: Instant) -> Option<ViewportState> {
        let (width, queued_at) = self.pending?;
        if now.saturating_duration_since(queued_at) < self.debounce {
            return None;
        }
        self.pending = None;

        let next = self.classifier.viewport(width);
        if next == self.current {
            return None;
        }
        log::debug!(
            "Viewport resized: {:.0}px ({:?}) -> {:.0}px ({:?})",
            self.current.width,
            self.current.regime,
            next.width,
            next.regime
        );
        self.current = next;
        Some(next)
    }

    /// Apply a width immediately, bypassing the debounce (view mount).
    pub fn apply_now(&mut self, width: f32) -> ViewportState {
        self.pending = None;
        self.current = self.classifier.viewport(width);
        self.current
    }

    /// Drop any queued resize (view teardown).
    pub fn cancel_pending(&mut self) {
        self.pending = None;
    }
}
