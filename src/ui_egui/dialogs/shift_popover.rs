//! Detail popover opened by clicking a shift box: time editing, annotations and deletion.

use chrono::{DateTime, Local, NaiveDate, NaiveTime, Timelike};
use egui::{Context, RichText};
use egui_extras::DatePickerButton;

use crate::models::shift::{Shift, ShiftFlag, ShiftId};
use crate::models::user::Identity;
use crate::utils::date::to_local;

#[derive(Debug, Clone, PartialEq)]
pub enum PopoverAction {
    SaveTimes {
        id: ShiftId,
        start: DateTime<Local>,
        end: DateTime<Local>,
    },
    SetFlag(ShiftId, ShiftFlag),
    Delete(ShiftId),
    Close,
}

#[derive(Debug, Clone)]
pub struct ShiftPopoverState {
    shift_id: ShiftId,
    start_date: NaiveDate,
    start_hour: u32,
    start_minute: u32,
    end_date: NaiveDate,
    end_hour: u32,
    end_minute: u32,
    confirm_delete: bool,
}

impl ShiftPopoverState {
    pub fn new(shift: &Shift) -> Self {
        let start = shift.start_time.naive_local();
        let end = shift.end_time.naive_local();
        Self {
            shift_id: shift.id,
            start_date: start.date(),
            start_hour: start.hour(),
            start_minute: start.minute(),
            end_date: end.date(),
            end_hour: end.hour(),
            end_minute: end.minute(),
            confirm_delete: false,
        }
    }

    pub fn shift_id(&self) -> ShiftId {
        self.shift_id
    }

    fn edited_times(&self) -> Option<(DateTime<Local>, DateTime<Local>)> {
        let start = NaiveTime::from_hms_opt(self.start_hour, self.start_minute, 0)?;
        let end = NaiveTime::from_hms_opt(self.end_hour, self.end_minute, 0)?;
        Some((
            to_local(self.start_date.and_time(start)),
            to_local(self.end_date.and_time(end)),
        ))
    }
}

fn time_fields(ui: &mut egui::Ui, hour: &mut u32, minute: &mut u32) {
    ui.add(egui::DragValue::new(hour).range(0..=23).suffix("h"));
    ui.add(egui::DragValue::new(minute).range(0..=59).speed(5.0).suffix("m"));
}

pub fn render_shift_popover(
    ctx: &Context,
    state: &mut ShiftPopoverState,
    shift: &Shift,
    identity: Option<&Identity>,
) -> Option<PopoverAction> {
    let mut action = None;
    let mut open = true;
    let is_admin = identity.is_some_and(|identity| identity.is_admin);

    egui::Window::new(format!("Shift #{}", shift.id))
        .id(egui::Id::new("shift_popover"))
        .collapsible(false)
        .resizable(false)
        .open(&mut open)
        .show(ctx, |ui| {
            ui.label(RichText::new(&shift.username).strong());
            if shift.created_by != shift.username {
                ui.label(RichText::new(format!("created by {}", shift.created_by)).weak());
            }
            ui.horizontal(|ui| {
                if !shift.enable {
                    ui.label(RichText::new("Disabled").color(egui::Color32::GRAY));
                }
                if shift.permitted {
                    ui.label(RichText::new("Permitted").color(egui::Color32::from_rgb(70, 160, 90)));
                }
                if shift.absent {
                    ui.label(RichText::new("Absent").color(egui::Color32::from_rgb(230, 150, 60)));
                }
            });
            ui.separator();

            egui::Grid::new("shift_popover_times").num_columns(3).show(ui, |ui| {
                ui.label("Start");
                ui.add(DatePickerButton::new(&mut state.start_date).id_source("popover_start_date"));
                ui.horizontal(|ui| time_fields(ui, &mut state.start_hour, &mut state.start_minute));
                ui.end_row();

                ui.label("End");
                ui.add(DatePickerButton::new(&mut state.end_date).id_source("popover_end_date"));
                ui.horizontal(|ui| time_fields(ui, &mut state.end_hour, &mut state.end_minute));
                ui.end_row();
            });

            ui.add_enabled_ui(!shift.permitted, |ui| {
                if ui.button("Save times").clicked() {
                    if let Some((start, end)) = state.edited_times() {
                        action = Some(PopoverAction::SaveTimes {
                            id: shift.id,
                            start,
                            end,
                        });
                    }
                }
            });
            ui.separator();

            ui.horizontal_wrapped(|ui| {
                for flag in [ShiftFlag::Disabled, ShiftFlag::Permitted] {
                    let enabled = is_admin && !shift.has_flag(flag);
                    if ui.add_enabled(enabled, egui::Button::new(flag.label())).clicked() {
                        action = Some(PopoverAction::SetFlag(shift.id, flag));
                    }
                }
                let can_mark_absent = shift.permitted && !shift.absent;
                if ui
                    .add_enabled(can_mark_absent, egui::Button::new(ShiftFlag::Absent.label()))
                    .clicked()
                {
                    action = Some(PopoverAction::SetFlag(shift.id, ShiftFlag::Absent));
                }
            });
            ui.separator();

            if state.confirm_delete {
                ui.label("Delete this shift? This cannot be undone.");
                ui.horizontal(|ui| {
                    if ui
                        .button(RichText::new("Delete").color(egui::Color32::from_rgb(200, 60, 60)))
                        .clicked()
                    {
                        action = Some(PopoverAction::Delete(shift.id));
                    }
                    if ui.button("Keep").clicked() {
                        state.confirm_delete = false;
                    }
                });
            } else if ui
                .add_enabled(!shift.permitted, egui::Button::new("Delete…"))
                .clicked()
            {
                state.confirm_delete = true;
            }
        });

    if !open {
        action = Some(PopoverAction::Close);
    }
    action
}
