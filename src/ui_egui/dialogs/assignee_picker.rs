//! Assignee selection for shifts created by privileged users.

use egui::{Context, RichText};

use crate::models::user::User;
use crate::services::reconcile::AssigneePicker;

pub enum PickerAction {
    Choose(AssigneePicker, String),
    Cancel,
}

pub struct AssigneePickerState {
    picker: AssigneePicker,
    filter: String,
}

impl AssigneePickerState {
    pub fn new(picker: AssigneePicker) -> Self {
        Self {
            picker,
            filter: String::new(),
        }
    }

    fn matching<'a>(&self, users: &'a [User]) -> Vec<&'a User> {
        let filter = self.filter.trim().to_lowercase();
        users
            .iter()
            .filter(|user| filter.is_empty() || user.id.to_lowercase().contains(&filter))
            .collect()
    }
}

pub fn render_assignee_picker(
    ctx: &Context,
    state: &mut AssigneePickerState,
    users: &[User],
) -> Option<PickerAction> {
    let mut action = None;
    let mut open = true;

    egui::Window::new("Assign shift")
        .id(egui::Id::new("assignee_picker"))
        .collapsible(false)
        .resizable(false)
        .open(&mut open)
        .show(ctx, |ui| {
            ui.label(format!(
                "{} – {}",
                state.picker.start_time.format("%a %d %b %H:%M"),
                state.picker.end_time.format("%H:%M")
            ));
            ui.add(egui::TextEdit::singleline(&mut state.filter).hint_text("Filter users"));
            ui.separator();

            if users.is_empty() {
                ui.label(RichText::new("Loading users…").weak());
            }
            egui::ScrollArea::vertical().max_height(240.0).show(ui, |ui| {
                for user in state.matching(users) {
                    let label = if user.is_admin {
                        format!("{} (admin)", user.id)
                    } else {
                        user.id.clone()
                    };
                    if ui.selectable_label(false, label).clicked() {
                        action = Some(PickerAction::Choose(state.picker.clone(), user.id.clone()));
                    }
                }
            });

            ui.separator();
            if ui.button("Cancel").clicked() {
                action = Some(PickerAction::Cancel);
            }
        });

    if !open {
        action = Some(PickerAction::Cancel);
    }
    action
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Local, TimeZone};

    #[test]
    fn test_filter_is_case_insensitive() {
        let start = Local.with_ymd_and_hms(2025, 1, 13, 9, 0, 0).unwrap();
        let mut state = AssigneePickerState::new(AssigneePicker {
            row: 18,
            day: 0,
            start_time: start,
            end_time: start + Duration::hours(1),
        });
        let users = vec![
            User { id: "Alice".into(), is_admin: false },
            User { id: "bob".into(), is_admin: true },
        ];

        assert_eq!(state.matching(&users).len(), 2);
        state.filter = "ALI".into();
        let matched: Vec<&str> = state.matching(&users).iter().map(|u| u.id.as_str()).collect();
        assert_eq!(matched, vec!["Alice"]);
    }
}
