mod app;
pub mod dialogs;
mod views;

pub use app::ShiftCalendarApp;
