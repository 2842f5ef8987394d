//! Modal for blocking notices (rejected edits, one-time secrets).
//!
//! Notices queue up and are shown one at a time; the rest of the window is
//! dimmed and ignores input until the current one is dismissed.

use std::collections::VecDeque;

use egui::{Context, RichText};

use crate::services::reconcile::{Notice, NoticeLevel};

#[derive(Debug, Default)]
pub struct NoticeModal {
    queue: VecDeque<Notice>,
}

impl NoticeModal {
    pub fn push(&mut self, notice: Notice) {
        self.queue.push_back(notice);
    }

    pub fn is_open(&self) -> bool {
        !self.queue.is_empty()
    }

    pub fn render(&mut self, ctx: &Context) {
        let Some(notice) = self.queue.front() else {
            return;
        };

        let screen = ctx.screen_rect();
        egui::Area::new(egui::Id::new("notice_modal_backdrop"))
            .fixed_pos(screen.min)
            .order(egui::Order::Middle)
            .interactable(true)
            .show(ctx, |ui| {
                ui.allocate_rect(screen, egui::Sense::click());
                ui.painter()
                    .rect_filled(screen, 0.0, egui::Color32::from_black_alpha(96));
            });

        let title = match notice.level {
            NoticeLevel::Error => "Error",
            NoticeLevel::Warning => "Not allowed",
            NoticeLevel::Success | NoticeLevel::Info => "Notice",
        };
        let mut dismissed = false;
        egui::Window::new(RichText::new(title).strong())
            .id(egui::Id::new("notice_modal"))
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                ui.set_max_width(360.0);
                ui.label(&notice.message);
                ui.add_space(8.0);
                if ui.button("OK").clicked() || ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    dismissed = true;
                }
            });

        if dismissed {
            self.queue.pop_front();
        }
    }
}
