use std::sync::mpsc;
use std::sync::Arc;

use chrono::Local;
use tokio::runtime::Handle;

use super::notice_modal::NoticeModal;
use super::toast::ToastManager;
use super::{Screen, ShiftCalendarApp};
use crate::models::settings::Settings;
use crate::services::auth::TokenStore;
use crate::services::reconcile::ReconciliationController;
use crate::services::remote::ShiftService;
use crate::ui_egui::dialogs::login::LoginFormState;
use crate::ui_egui::views::week_grid::WeekGrid;

impl ShiftCalendarApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        settings: Settings,
        tokens: TokenStore,
        service: Arc<dyn ShiftService>,
        runtime: Handle,
    ) -> Self {
        let (outcomes_tx, outcomes_rx) = mpsc::channel();
        let week_grid = WeekGrid::new(&settings);
        let mut login = LoginFormState::default();
        if let Some(identity) = tokens.identity() {
            login.username = identity.username;
        }
        let controller = ReconciliationController::new(settings, tokens, Local::now().date_naive());

        let mut app = Self {
            controller,
            service,
            runtime,
            outcomes_tx,
            outcomes_rx,
            in_flight: 0,
            screen: Screen::Login,
            week_grid,
            login,
            popover: None,
            picker: None,
            user_admin: None,
            toasts: ToastManager::new(),
            modal: NoticeModal::default(),
        };

        // A still-valid stored session skips the sign-in screen.
        if app.controller.identity().is_some() {
            log::info!("Resuming stored session");
            app.enter_week(&cc.egui_ctx);
        }
        app
    }
}
