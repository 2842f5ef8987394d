//! Toast notifications for non-blocking notices.
//!
//! Toasts stack up from the bottom-right corner and fade out after a few seconds.

use std::time::{Duration, Instant};

use egui::{Color32, Context, Pos2, RichText};

use crate::services::reconcile::NoticeLevel;

const TOAST_WIDTH: f32 = 320.0;
const TOAST_HEIGHT: f32 = 40.0;
const MARGIN: f32 = 10.0;
const SPACING: f32 = 5.0;
const FADE: Duration = Duration::from_millis(500);

fn icon(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Success => "✓",
        NoticeLevel::Info => "ℹ",
        NoticeLevel::Warning => "⚠",
        NoticeLevel::Error => "✗",
    }
}

/// Background and text color for a level.
fn colors(level: NoticeLevel, dark: bool) -> (Color32, Color32) {
    match (level, dark) {
        (NoticeLevel::Success, true) => (Color32::from_rgb(30, 70, 40), Color32::from_rgb(100, 220, 120)),
        (NoticeLevel::Info, true) => (Color32::from_rgb(30, 50, 80), Color32::from_rgb(100, 180, 255)),
        (NoticeLevel::Warning, true) => (Color32::from_rgb(80, 60, 20), Color32::from_rgb(255, 200, 80)),
        (NoticeLevel::Error, true) => (Color32::from_rgb(80, 30, 30), Color32::from_rgb(255, 120, 120)),
        (NoticeLevel::Success, false) => (Color32::from_rgb(220, 255, 220), Color32::from_rgb(30, 120, 50)),
        (NoticeLevel::Info, false) => (Color32::from_rgb(220, 235, 255), Color32::from_rgb(30, 80, 150)),
        (NoticeLevel::Warning, false) => (Color32::from_rgb(255, 245, 200), Color32::from_rgb(150, 100, 0)),
        (NoticeLevel::Error, false) => (Color32::from_rgb(255, 220, 220), Color32::from_rgb(180, 40, 40)),
    }
}

#[derive(Debug, Clone)]
struct Toast {
    message: String,
    level: NoticeLevel,
    created_at: Instant,
    duration: Duration,
}

impl Toast {
    fn opacity(&self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.created_at);
        if elapsed >= self.duration {
            return 0.0;
        }
        let remaining = self.duration - elapsed;
        if remaining < FADE {
            remaining.as_secs_f32() / FADE.as_secs_f32()
        } else {
            1.0
        }
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

    pub fn push(&mut self, level: NoticeLevel, message: impl Into<String>) {
        let duration = match level {
            NoticeLevel::Error | NoticeLevel::Warning => Duration::from_secs(5),
            _ => Duration::from_secs(3),
        };
        self.toasts.push(Toast {
            message: message.into(),
            level,
            created_at: Instant::now(),
            duration,
        });
    }

    pub fn render(&mut self, ctx: &Context) {
        let now = Instant::now();
        self.toasts.retain(|toast| toast.opacity(now) > 0.0);
        if self.toasts.is_empty() {
            return;
        }
        ctx.request_repaint();

        let screen = ctx.screen_rect();
        let dark = ctx.style().visuals.dark_mode;
        for (i, toast) in self.toasts.iter().enumerate() {
            let opacity = toast.opacity(now);
            let pos = Pos2::new(
                screen.right() - TOAST_WIDTH - MARGIN,
                screen.bottom() - MARGIN - (i as f32 + 1.0) * (TOAST_HEIGHT + SPACING),
            );
            let (bg, text) = colors(toast.level, dark);
            let bg = bg.gamma_multiply(0.9 * opacity);
            let text = text.gamma_multiply(opacity);

            egui::Area::new(egui::Id::new(("toast", i)))
                .fixed_pos(pos)
                .order(egui::Order::Foreground)
                .show(ctx, |ui| {
                    egui::Frame::none()
                        .fill(bg)
                        .rounding(6.0)
                        .inner_margin(egui::Margin::symmetric(12.0, 8.0))
                        .stroke(egui::Stroke::new(1.0, text.gamma_multiply(0.3)))
                        .show(ui, |ui| {
                            ui.set_min_width(TOAST_WIDTH - 24.0);
                            ui.horizontal(|ui| {
                                ui.label(RichText::new(icon(toast.level)).color(text).strong());
                                ui.label(RichText::new(&toast.message).color(text));
                            });
                        });
                });
        }
    }
}
