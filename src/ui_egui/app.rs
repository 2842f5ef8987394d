mod lifecycle;
mod notice_modal;
mod toast;

use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;

use chrono::{Duration, Local};
use tokio::runtime::Handle;

use self::notice_modal::NoticeModal;
use self::toast::ToastManager;
use crate::services::reconcile::{
    CreateFlow, Navigation, PendingRequest, ReconciliationController, RequestKind, RequestOutcome,
};
use crate::services::remote::ShiftService;
use crate::ui_egui::dialogs::assignee_picker::{
    render_assignee_picker, AssigneePickerState, PickerAction,
};
use crate::ui_egui::dialogs::login::{render_login, LoginFormState};
use crate::ui_egui::dialogs::shift_popover::{render_shift_popover, PopoverAction, ShiftPopoverState};
use crate::ui_egui::dialogs::user_admin::{render_user_admin, UserAdminAction, UserAdminState};
use crate::ui_egui::views::week_grid::{GridAction, WeekGrid};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Login,
    Week,
}

pub struct ShiftCalendarApp {
    controller: ReconciliationController,
    service: Arc<dyn ShiftService>,
    /// Runtime the remote calls are spawned on
    runtime: Handle,
    outcomes_tx: Sender<RequestOutcome>,
    outcomes_rx: Receiver<RequestOutcome>,
    /// Requests sent but not yet settled
    in_flight: usize,
    screen: Screen,
    week_grid: WeekGrid,
    login: LoginFormState,
    popover: Option<ShiftPopoverState>,
    picker: Option<AssigneePickerState>,
    user_admin: Option<UserAdminState>,
    toasts: ToastManager,
    modal: NoticeModal,
}

impl eframe::App for ShiftCalendarApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_outcomes(ctx);

        match self.screen {
            Screen::Login => self.show_login(ctx),
            Screen::Week => self.show_week(ctx),
        }

        self.modal.render(ctx);
        self.toasts.render(ctx);
        self.process_controller_events(ctx);
    }
}

impl ShiftCalendarApp {
    /// Hand a prepared request to the runtime; its outcome comes back through the channel.
    fn dispatch(&mut self, ctx: &egui::Context, request: Option<PendingRequest>) {
        let Some(request) = request else {
            return;
        };
        log::debug!("Dispatching {}", request_label(request.kind()));

        let service = Arc::clone(&self.service);
        let tx = self.outcomes_tx.clone();
        let ctx = ctx.clone();
        self.in_flight += 1;
        self.runtime.spawn(async move {
            let outcome = request.send(service.as_ref()).await;
            if tx.send(outcome).is_err() {
                log::debug!("Window closed before the request finished");
            }
            ctx.request_repaint();
        });
    }

    fn poll_outcomes(&mut self, ctx: &egui::Context) {
        while let Ok(outcome) = self.outcomes_rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            if matches!(outcome, RequestOutcome::LoggedIn(_)) {
                self.login.busy = false;
            }
            self.controller.settle(outcome);
        }
        self.process_controller_events(ctx);
    }

    /// Route queued notices and follow navigation until the controller is quiet.
    fn process_controller_events(&mut self, ctx: &egui::Context) {
        loop {
            for notice in self.controller.take_notices() {
                if notice.blocking {
                    self.modal.push(notice);
                } else {
                    self.toasts.push(notice.level, notice.message);
                }
            }
            match self.controller.take_navigation() {
                Some(Navigation::Login) => self.enter_login(),
                Some(Navigation::Week) => self.enter_week(ctx),
                None => break,
            }
        }
    }

    fn enter_login(&mut self) {
        if self.screen != Screen::Login {
            log::info!("Showing sign-in");
        }
        self.screen = Screen::Login;
        self.week_grid.reset();
        self.popover = None;
        self.picker = None;
        self.user_admin = None;
    }

    fn enter_week(&mut self, ctx: &egui::Context) {
        self.screen = Screen::Week;
        let request = self.controller.refresh();
        self.dispatch(ctx, request);
        if self
            .controller
            .identity()
            .is_some_and(|identity| identity.is_privileged())
        {
            let request = self.controller.prepare_list_users();
            self.dispatch(ctx, request);
        }
    }

    fn change_week(&mut self, ctx: &egui::Context, date: chrono::NaiveDate) {
        self.week_grid.reset();
        self.popover = None;
        self.picker = None;
        let request = self.controller.change_week(date);
        self.dispatch(ctx, request);
    }

    fn show_login(&mut self, ctx: &egui::Context) {
        let server_url = self.controller.settings().server_url.clone();
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some((username, password)) = render_login(ui, &mut self.login, &server_url) {
                log::info!("Signing in as {}", username);
                let request = self.controller.prepare_login(&username, &password);
                self.dispatch(ctx, Some(request));
            }
        });
    }

    fn show_week(&mut self, ctx: &egui::Context) {
        self.render_top_bar(ctx);

        let blocked = self.modal.is_open();
        let actions = egui::CentralPanel::default()
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        ui.add_enabled_ui(!blocked, |ui| self.week_grid.show(ui, &self.controller))
                            .inner
                    })
                    .inner
            })
            .inner;
        for action in actions {
            self.handle_grid_action(ctx, action);
        }

        self.render_popover(ctx);
        self.render_picker(ctx);
        self.render_user_admin(ctx);
    }

    fn render_top_bar(&mut self, ctx: &egui::Context) {
        let identity = self.controller.identity();
        let week_start = self.controller.week_start();

        egui::TopBottomPanel::top("week_toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("◀").on_hover_text("Previous week").clicked() {
                    self.change_week(ctx, week_start - Duration::days(7));
                }
                if ui.button("Today").clicked() {
                    self.change_week(ctx, Local::now().date_naive());
                }
                if ui.button("▶").on_hover_text("Next week").clicked() {
                    self.change_week(ctx, week_start + Duration::days(7));
                }
                ui.separator();
                ui.strong(format!(
                    "{} – {}",
                    week_start.format("%d %b"),
                    (week_start + Duration::days(6)).format("%d %b %Y")
                ));
                if ui.small_button("⟳").on_hover_text("Reload").clicked() {
                    let request = self.controller.refresh();
                    self.dispatch(ctx, request);
                }
                if self.in_flight > 0 {
                    ui.spinner();
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Sign out").clicked() {
                        log::info!("Signing out");
                        self.controller.sign_out();
                    }
                    if let Some(identity) = &identity {
                        if identity.is_admin && ui.button("Users").clicked() {
                            self.user_admin.get_or_insert_with(UserAdminState::default);
                        }
                        ui.label(&identity.username);
                    }
                });
            });
        });
    }

    fn handle_grid_action(&mut self, ctx: &egui::Context, action: GridAction) {
        match action {
            GridAction::OpenShift(id) => {
                self.popover = self.controller.shift(id).map(ShiftPopoverState::new);
            }
            GridAction::Commit { original, updated } => {
                let request = self.controller.prepare_commit(&original, updated);
                self.dispatch(ctx, request);
            }
            GridAction::EmptyCell { row, day } => match self.controller.click_empty_cell(row, day) {
                Some(CreateFlow::Submit(request)) => self.dispatch(ctx, Some(request)),
                Some(CreateFlow::PickAssignee(picker)) => {
                    self.picker = Some(AssigneePickerState::new(picker));
                }
                None => {}
            },
        }
    }

    fn render_popover(&mut self, ctx: &egui::Context) {
        let Some(state) = self.popover.as_mut() else {
            return;
        };
        let Some(shift) = self.controller.shift(state.shift_id()).cloned() else {
            self.popover = None;
            return;
        };
        let identity = self.controller.identity();
        let Some(action) = render_shift_popover(ctx, state, &shift, identity.as_ref()) else {
            return;
        };

        match action {
            PopoverAction::SaveTimes { id, start, end } => {
                let request = self.controller.prepare_edit_times(id, start, end);
                self.dispatch(ctx, request);
                self.popover = None;
            }
            PopoverAction::SetFlag(id, flag) => {
                let request = self.controller.prepare_flag(id, flag);
                self.dispatch(ctx, request);
            }
            PopoverAction::Delete(id) => {
                let request = self.controller.prepare_delete(id);
                self.dispatch(ctx, request);
                self.popover = None;
            }
            PopoverAction::Close => self.popover = None,
        }
    }

    fn render_picker(&mut self, ctx: &egui::Context) {
        let Some(state) = self.picker.as_mut() else {
            return;
        };
        match render_assignee_picker(ctx, state, self.controller.users()) {
            Some(PickerAction::Choose(picker, username)) => {
                self.picker = None;
                let request = self.controller.choose_assignee(picker, &username);
                self.dispatch(ctx, request);
            }
            Some(PickerAction::Cancel) => self.picker = None,
            None => {}
        }
    }

    fn render_user_admin(&mut self, ctx: &egui::Context) {
        let Some(state) = self.user_admin.as_mut() else {
            return;
        };
        match render_user_admin(ctx, state, self.controller.users()) {
            Some(UserAdminAction::Create { username, is_admin }) => {
                let request = self.controller.prepare_create_user(&username, is_admin);
                self.dispatch(ctx, request);
            }
            Some(UserAdminAction::Refresh) => {
                let request = self.controller.prepare_list_users();
                self.dispatch(ctx, request);
            }
            Some(UserAdminAction::Close) => self.user_admin = None,
            None => {}
        }
    }
}

/// Log-safe name for a request; never includes credentials.
fn request_label(kind: &RequestKind) -> String {
    match kind {
        RequestKind::Login { username, .. } => format!("login for {}", username),
        RequestKind::FetchWeek { week_start, .. } => format!("fetch week of {}", week_start),
        RequestKind::Create(draft) => format!("create shift for {}", draft.username),
        RequestKind::UpdateDuration { id, .. } => format!("update shift {}", id),
        RequestKind::Delete(id) => format!("delete shift {}", id),
        RequestKind::SetFlag { id, flag } => format!("{} on shift {}", flag.label(), id),
        RequestKind::ListUsers => "list users".to_string(),
        RequestKind::CreateUser { username, .. } => format!("create user {}", username),
    }
}
