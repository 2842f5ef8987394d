//! Sign-in screen, also the target of every re-authentication redirect.

use egui::{Align, Key, Layout, RichText};

#[derive(Debug, Default)]
pub struct LoginFormState {
    pub username: String,
    password: String,
    pub busy: bool,
}

impl LoginFormState {
    /// Credentials to submit, clearing the password field.
    fn take_credentials(&mut self) -> Option<(String, String)> {
        let username = self.username.trim();
        if username.is_empty() || self.password.is_empty() {
            return None;
        }
        let credentials = (username.to_string(), std::mem::take(&mut self.password));
        self.busy = true;
        Some(credentials)
    }
}

pub fn render_login(ui: &mut egui::Ui, state: &mut LoginFormState, server_url: &str) -> Option<(String, String)> {
    let mut submitted = None;

    ui.with_layout(Layout::top_down(Align::Center), |ui| {
        ui.add_space(ui.available_height() * 0.25);
        ui.heading("Shift Calendar");
        ui.label(RichText::new(server_url).weak());
        ui.add_space(12.0);

        egui::Grid::new("login_form").num_columns(2).show(ui, |ui| {
            ui.label("User");
            ui.add(egui::TextEdit::singleline(&mut state.username).desired_width(200.0));
            ui.end_row();

            ui.label("Password");
            let password = ui.add(
                egui::TextEdit::singleline(&mut state.password)
                    .password(true)
                    .desired_width(200.0),
            );
            ui.end_row();

            if password.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter)) {
                submitted = state.take_credentials();
            }
        });

        ui.add_space(8.0);
        let button = ui.add_enabled(!state.busy, egui::Button::new("Sign in"));
        if button.clicked() {
            submitted = state.take_credentials();
        }
        if state.busy {
            ui.spinner();
        }
    });

    submitted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_credentials_requires_both_fields() {
        let mut state = LoginFormState {
            username: " alice ".into(),
            ..Default::default()
        };
        assert!(state.take_credentials().is_none());

        state.password = "pw".into();
        assert_eq!(state.take_credentials(), Some(("alice".into(), "pw".into())));
        assert!(state.password.is_empty());
        assert!(state.busy);
    }
}
