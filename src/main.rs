// Shift Calendar Application
// Main entry point

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use shift_calendar::services::auth::TokenStore;
use shift_calendar::services::remote::HttpShiftService;
use shift_calendar::services::settings::{load_settings_or_default, AppPaths, SettingsService};
use shift_calendar::ui_egui::ShiftCalendarApp;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    log::info!("Starting Shift Calendar");

    let paths = AppPaths::discover();
    let settings = load_settings_or_default(&SettingsService::new(paths.settings_file.clone()));
    log::info!("Using shift service at {}", settings.server_url);

    let tokens = TokenStore::persistent(paths.token_file.clone());
    let service = HttpShiftService::new(settings.server_url.clone())
        .context("Failed to build HTTP client")?;

    // Remote calls run on a background runtime; the window owns the main thread.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("shift-calendar-io")
        .build()
        .context("Failed to start async runtime")?;
    let handle = runtime.handle().clone();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Shift Calendar")
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Shift Calendar",
        options,
        Box::new(move |cc| {
            Ok(Box::new(ShiftCalendarApp::new(
                cc,
                settings,
                tokens,
                Arc::new(service),
                handle,
            )))
        }),
    )
    .map_err(|e| anyhow!("Window closed with an error: {}", e))?;

    runtime.shutdown_background();
    Ok(())
}
