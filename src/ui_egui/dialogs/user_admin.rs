//! Account creation for administrators.

use egui::Context;

use crate::models::user::User;

#[derive(Debug, Default)]
pub struct UserAdminState {
    new_user: String,
    is_admin: bool,
}

pub enum UserAdminAction {
    Create { username: String, is_admin: bool },
    Refresh,
    Close,
}

pub fn render_user_admin(ctx: &Context, state: &mut UserAdminState, users: &[User]) -> Option<UserAdminAction> {
    let mut action = None;
    let mut open = true;

    egui::Window::new("Users")
        .id(egui::Id::new("user_admin"))
        .collapsible(false)
        .open(&mut open)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().max_height(200.0).show(ui, |ui| {
                egui::Grid::new("user_list").striped(true).show(ui, |ui| {
                    for user in users {
                        ui.label(&user.id);
                        ui.label(if user.is_admin { "admin" } else { "" });
                        ui.end_row();
                    }
                });
            });
            if ui.small_button("Reload").clicked() {
                action = Some(UserAdminAction::Refresh);
            }
            ui.separator();

            ui.horizontal(|ui| {
                ui.add(egui::TextEdit::singleline(&mut state.new_user).hint_text("New user id"));
                ui.checkbox(&mut state.is_admin, "Admin");
                let can_create = !state.new_user.trim().is_empty();
                if ui.add_enabled(can_create, egui::Button::new("Create")).clicked() {
                    action = Some(UserAdminAction::Create {
                        username: std::mem::take(&mut state.new_user),
                        is_admin: std::mem::take(&mut state.is_admin),
                    });
                }
            });
        });

    if !open {
        action = Some(UserAdminAction::Close);
    }
    action
}
