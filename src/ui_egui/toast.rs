//! Brief non-blocking notifications shown in the bottom-right corner.
//!
//! Schedule notices (failed loads, rejected saves) are turned into toasts so
//! the grid stays usable while the message is shown.

use egui::{Color32, Context, Pos2, RichText};
use std::time::{Duration, Instant};

use crate::services::schedule::context::{Notice, NoticeLevel};

const TOAST_WIDTH: f32 = 320.0;
const TOAST_HEIGHT: f32 = 40.0;
const FADE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Info,
    Error,
}

impl ToastLevel {
    pub fn icon(&self) -> &'static str {
        match self {
            ToastLevel::Success => "✓",
            ToastLevel::Info => "ℹ",
            ToastLevel::Error => "✗",
        }
    }

    pub fn background_color(&self, is_dark_theme: bool) -> Color32 {
        match (self, is_dark_theme) {
            (ToastLevel::Success, true) => Color32::from_rgb(30, 70, 40),
            (ToastLevel::Info, true) => Color32::from_rgb(30, 50, 80),
            (ToastLevel::Error, true) => Color32::from_rgb(80, 30, 30),
            (ToastLevel::Success, false) => Color32::from_rgb(220, 255, 220),
            (ToastLevel::Info, false) => Color32::from_rgb(220, 235, 255),
            (ToastLevel::Error, false) => Color32::from_rgb(255, 220, 220),
        }
    }

    pub fn text_color(&self, is_dark_theme: bool) -> Color32 {
        match (self, is_dark_theme) {
            (ToastLevel::Success, true) => Color32::from_rgb(100, 220, 120),
            (ToastLevel::Info, true) => Color32::from_rgb(100, 180, 255),
            (ToastLevel::Error, true) => Color32::from_rgb(255, 120, 120),
            (ToastLevel::Success, false) => Color32::from_rgb(30, 120, 50),
            (ToastLevel::Info, false) => Color32::from_rgb(30, 80, 150),
            (ToastLevel::Error, false) => Color32::from_rgb(180, 40, 40),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub level: ToastLevel,
    pub created_at: Instant,
    pub duration: Duration,
}

impl Toast {
    pub fn new(message: impl Into<String>, level: ToastLevel) -> Self {
        let duration = match level {
            ToastLevel::Error => Duration::from_secs(5),
            _ => Duration::from_secs(3),
        };
        Self {
            message: message.into(),
            level,
            created_at: Instant::now(),
            duration,
        }
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) >= self.duration
    }

    /// 1.0 until the last half second, then fades linearly to 0.
    pub fn opacity_at(&self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.created_at);
        if elapsed >= self.duration {
            return 0.0;
        }
        let remaining = self.duration - elapsed;
        if remaining < FADE {
            (remaining.as_secs_f32() / FADE.as_secs_f32()).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }
}

impl From<Notice> for Toast {
    fn from(notice: Notice) -> Self {
        let level = match notice.level {
            NoticeLevel::Info => ToastLevel::Info,
            NoticeLevel::Error => ToastLevel::Error,
        };
        Toast::new(notice.message, level)
    }
}

#[derive(Debug, Default)]
pub struct ToastManager {
    toasts: Vec<Toast>,
}

impl ToastManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, toast: Toast) {
        self.toasts.push(toast);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.add(Toast::new(message, ToastLevel::Success));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.add(Toast::new(message, ToastLevel::Error));
    }

    pub fn extend(&mut self, notices: impl IntoIterator<Item = Notice>) {
        self.toasts.extend(notices.into_iter().map(Toast::from));
    }

    pub fn cleanup(&mut self, now: Instant) {
        self.toasts.retain(|t| !t.is_expired_at(now));
    }

    pub fn render(&mut self, ctx: &Context) {
        let now = Instant::now();
        self.cleanup(now);
        if self.toasts.is_empty() {
            return;
        }

        // Keep animating the fade
        ctx.request_repaint();

        let is_dark_theme = ctx.style().visuals.dark_mode;
        let screen_rect = ctx.screen_rect();
        let margin = 10.0;
        let spacing = 5.0;

        for (i, toast) in self.toasts.iter().enumerate() {
            let opacity = toast.opacity_at(now);
            if opacity <= 0.0 {
                continue;
            }

            let y_offset = i as f32 * (TOAST_HEIGHT + spacing);
            let pos = Pos2::new(
                screen_rect.right() - TOAST_WIDTH - margin,
                screen_rect.bottom() - TOAST_HEIGHT - margin - y_offset,
            );

            let bg_color = toast.level.background_color(is_dark_theme).gamma_multiply(opacity);
            let text_color = toast.level.text_color(is_dark_theme).gamma_multiply(opacity);

            egui::Area::new(egui::Id::new(("toast", i)))
                .fixed_pos(pos)
                .order(egui::Order::Foreground)
                .show(ctx, |ui| {
                    egui::Frame::none()
                        .fill(bg_color)
                        .rounding(6.0)
                        .inner_margin(egui::Margin::symmetric(12.0, 8.0))
                        .stroke(egui::Stroke::new(1.0, text_color.gamma_multiply(0.3)))
                        .show(ui, |ui| {
                            ui.set_min_width(TOAST_WIDTH - 24.0);
                            ui.horizontal(|ui| {
                                ui.label(RichText::new(toast.level.icon()).color(text_color).strong());
                                ui.label(RichText::new(&toast.message).color(text_color));
                            });
                        });
                });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_maps_to_level() {
        let toast = Toast::from(Notice::error("Could not load rooms"));
        assert_eq!(toast.level, ToastLevel::Error);
        assert_eq!(toast.message, "Could not load rooms");
        assert_eq!(Toast::from(Notice::info("Saved")).level, ToastLevel::Info);
    }

    #[test]
    fn test_opacity_fades_before_expiry() {
        let toast = Toast::new("Saved", ToastLevel::Success);
        let start = toast.created_at;
        assert_eq!(toast.opacity_at(start), 1.0);
        let halfway = toast.opacity_at(start + Duration::from_millis(2750));
        assert!(halfway > 0.4 && halfway < 0.6);
        assert_eq!(toast.opacity_at(start + Duration::from_secs(3)), 0.0);
        assert!(toast.is_expired_at(start + Duration::from_secs(3)));
    }

    #[test]
    fn test_cleanup_drops_expired() {
        let mut manager = ToastManager::new();
        manager.success("Saved");
        manager.error("Conflict");
        let later = Instant::now() + Duration::from_secs(4);
        manager.cleanup(later);
        // Errors stay on screen longer
        assert_eq!(manager.toasts.len(), 1);
        assert_eq!(manager.toasts[0].level, ToastLevel::Error);
    }
}
