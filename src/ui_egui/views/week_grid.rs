//! Week grid view: paints the 48 × 7 slot grid and the shift boxes, and feeds
//! pointer input into the gesture interpreter of the pressed box.

use chrono::{Duration, Local};
use egui::{Align2, CursorIcon, FontId, Key, Pos2, Rect, Sense, Stroke, Ui, Vec2};

use super::palette::{ShiftColors, WeekGridPalette};
use crate::interaction::gesture::{
    GestureConfig, GestureEffect, GestureInterpreter, GestureState, PointerEvent,
};
use crate::layout::geometry::{GeometryResolver, ShiftSegment};
use crate::layout::time_slot::{DAYS_PER_WEEK, SLOTS_PER_DAY};
use crate::models::settings::Settings;
use crate::models::shift::{Shift, ShiftId};
use crate::services::reconcile::ReconciliationController;

const TIME_LABEL_WIDTH: f32 = 48.0;
const HEADER_HEIGHT: f32 = 26.0;
const COLUMN_SPACING: f32 = 2.0;
const MIN_COLUMN_WIDTH: f32 = 60.0;

/// What the user did on the grid this frame.
#[derive(Debug, Clone, PartialEq)]
pub enum GridAction {
    OpenShift(ShiftId),
    Commit { original: Shift, updated: Shift },
    EmptyCell { row: usize, day: usize },
}

pub struct WeekGrid {
    resolver: GeometryResolver,
    gesture_config: GestureConfig,
    slot_height: f32,
    /// Grid bounds the current anchors were captured from
    captured_grid: Option<Rect>,
    active: Option<GestureInterpreter>,
    preview: Option<Shift>,
    empty_press: Option<(usize, usize)>,
}

impl WeekGrid {
    pub fn new(settings: &Settings) -> Self {
        Self {
            resolver: GeometryResolver::new(settings),
            gesture_config: GestureConfig::from_settings(settings),
            slot_height: settings.slot_height,
            captured_grid: None,
            active: None,
            preview: None,
            empty_press: None,
        }
    }

    /// Drop any gesture in progress, e.g. when the visible week changes.
    pub fn reset(&mut self) {
        self.active = None;
        self.preview = None;
        self.empty_press = None;
    }

    pub fn show(&mut self, ui: &mut Ui, controller: &ReconciliationController) -> Vec<GridAction> {
        let available = ui.available_width();
        let column_width = ((available - TIME_LABEL_WIDTH) / DAYS_PER_WEEK as f32 - COLUMN_SPACING)
            .max(MIN_COLUMN_WIDTH);
        let size = Vec2::new(
            TIME_LABEL_WIDTH + DAYS_PER_WEEK as f32 * (column_width + COLUMN_SPACING),
            HEADER_HEIGHT + SLOTS_PER_DAY as f32 * self.slot_height,
        );
        let (outer, response) = ui.allocate_exact_size(size, Sense::click_and_drag());

        let origin = outer.min + Vec2::new(TIME_LABEL_WIDTH, HEADER_HEIGHT);
        let cells = layout_cells(origin, column_width, self.slot_height);
        self.refresh_anchors(&cells, controller);

        let palette = WeekGridPalette::from_visuals(ui.visuals());
        paint_grid(ui, &cells, outer, controller, &palette);

        let shifts = self.displayed_shifts(controller);
        let mut segments: Vec<ShiftSegment> = shifts
            .iter()
            .flat_map(|shift| self.resolver.resolve(shift, controller.lanes()))
            .collect();
        segments.sort_by_key(|segment| segment.stacking_rank);

        let me = controller.identity().map(|identity| identity.username);
        let dark_mode = ui.visuals().dark_mode;
        for segment in &segments {
            if let Some(shift) = shifts.iter().find(|shift| shift.id == segment.shift_id) {
                let is_mine = me.as_deref().is_some_and(|user| shift.is_owned_by(user));
                let mut colors = ShiftColors::for_shift(shift, is_mine, dark_mode);
                if self.preview.as_ref().is_some_and(|p| p.id == shift.id) {
                    colors = colors.ghost();
                }
                paint_segment(ui, segment, shift, colors);
            }
        }

        self.update_cursor(ui, &response, &segments);
        self.handle_pointer(ui, &response, controller, &segments)
    }

    fn refresh_anchors(&mut self, cells: &[Rect], controller: &ReconciliationController) {
        let (Some(first), Some(last)) = (cells.first(), cells.last()) else {
            return;
        };
        let grid = first.union(*last);
        if self.captured_grid == Some(grid) {
            return;
        }
        // A session's origins are in the old screen coordinates.
        if self.active.is_some() {
            self.cancel_gesture(controller);
        }
        match self.resolver.recompute(cells) {
            Ok(_) => self.captured_grid = Some(grid),
            Err(e) => {
                log::warn!("Could not capture grid anchors: {}", e);
                self.resolver.invalidate();
                self.captured_grid = None;
            }
        }
    }

    /// Controller shifts with the in-progress gesture preview swapped in.
    fn displayed_shifts(&self, controller: &ReconciliationController) -> Vec<Shift> {
        controller
            .shifts()
            .iter()
            .map(|shift| match &self.preview {
                Some(preview) if preview.id == shift.id => preview.clone(),
                _ => shift.clone(),
            })
            .collect()
    }

    fn update_cursor(&self, ui: &Ui, response: &egui::Response, segments: &[ShiftSegment]) {
        if let Some(active) = &self.active {
            let icon = match active.state() {
                GestureState::Resize(_) => CursorIcon::ResizeNwSe,
                _ => CursorIcon::Grabbing,
            };
            ui.ctx().set_cursor_icon(icon);
            return;
        }
        let Some(pos) = response.hover_pos() else {
            return;
        };
        if let Some(segment) = GeometryResolver::hit_segment(segments, pos) {
            let icon = if GeometryResolver::hits_resize_handle(segment, pos, self.gesture_config.resize_tolerance) {
                CursorIcon::ResizeNwSe
            } else {
                CursorIcon::PointingHand
            };
            ui.ctx().set_cursor_icon(icon);
        } else if let Some((row, day)) = self.resolver.hit_cell(pos) {
            if let Some(anchors) = self.resolver.snapshot() {
                let top_left = anchors.corner(row, day);
                let cell = Rect::from_min_size(top_left, Vec2::new(anchors.column_width(), self.slot_height));
                let palette = WeekGridPalette::from_visuals(ui.visuals());
                ui.painter().rect_filled(cell, 0.0, palette.hover_overlay);
            }
        }
    }

    fn handle_pointer(
        &mut self,
        ui: &Ui,
        response: &egui::Response,
        controller: &ReconciliationController,
        segments: &[ShiftSegment],
    ) -> Vec<GridAction> {
        let (pressed, released, latest, escape) = ui.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.latest_pos(),
                i.key_pressed(Key::Escape),
            )
        });
        let mut actions = Vec::new();

        if let Some(shift_id) = self.active.as_ref().map(GestureInterpreter::shift_id) {
            let Some(shift) = controller.shift(shift_id).cloned() else {
                // Deleted underneath the gesture.
                self.reset();
                return actions;
            };
            let own_segments: Vec<ShiftSegment> = segments
                .iter()
                .filter(|segment| segment.shift_id == shift_id)
                .copied()
                .collect();

            let event = if escape {
                Some(PointerEvent::Cancel)
            } else if released {
                latest.map(|pos| PointerEvent::Up { pos })
            } else {
                latest.map(|pos| PointerEvent::Move { pos })
            };
            if let Some(event) = event {
                let effects = self.route(event, &shift, &own_segments);
                self.apply_effects(effects, &mut actions);
            }
            return actions;
        }

        let press_pos = response.interact_pointer_pos().or(latest);
        if pressed && response.hovered() {
            if let Some(pos) = press_pos {
                if let Some(segment) = GeometryResolver::hit_segment(segments, pos) {
                    let shift_id = segment.shift_id;
                    if let Some(shift) = controller.shift(shift_id).cloned() {
                        let own_segments: Vec<ShiftSegment> = segments
                            .iter()
                            .filter(|segment| segment.shift_id == shift_id)
                            .copied()
                            .collect();
                        self.active = Some(GestureInterpreter::new(shift_id, self.gesture_config));
                        let effects = self.route(PointerEvent::Down { pos }, &shift, &own_segments);
                        self.apply_effects(effects, &mut actions);
                    }
                } else {
                    self.empty_press = self.resolver.hit_cell(pos);
                }
            }
        } else if released {
            if let (Some(pressed_cell), Some(pos)) = (self.empty_press.take(), latest) {
                if self.resolver.hit_cell(pos) == Some(pressed_cell) {
                    let (row, day) = pressed_cell;
                    actions.push(GridAction::EmptyCell { row, day });
                }
            }
        }

        actions
    }

    fn cancel_gesture(&mut self, controller: &ReconciliationController) {
        let shift = self
            .active
            .as_ref()
            .and_then(|active| controller.shift(active.shift_id()).cloned());
        if let Some(shift) = shift {
            log::debug!("Grid moved, cancelling gesture on shift {}", shift.id);
            let effects = self.route(PointerEvent::Cancel, &shift, &[]);
            self.apply_effects(effects, &mut Vec::new());
        }
        self.reset();
    }

    fn route(&mut self, event: PointerEvent, shift: &Shift, segments: &[ShiftSegment]) -> Vec<GestureEffect> {
        match self.active.as_mut() {
            Some(interpreter) => interpreter.handle(event, shift, segments, &self.resolver),
            None => Vec::new(),
        }
    }

    fn apply_effects(&mut self, effects: Vec<GestureEffect>, actions: &mut Vec<GridAction>) {
        for effect in effects {
            match effect {
                GestureEffect::CapturePointer => {}
                GestureEffect::ReleasePointer => self.active = None,
                GestureEffect::Preview(shift) => self.preview = Some(shift),
                GestureEffect::Click(id) => actions.push(GridAction::OpenShift(id)),
                GestureEffect::Commit { original, updated } => {
                    actions.push(GridAction::Commit { original, updated })
                }
            }
        }
        // Press without an interpreter (no visible segment) or a finished gesture.
        if self.active.as_ref().is_some_and(|active| !active.is_active()) {
            self.active = None;
        }
        if self.active.is_none() {
            self.preview = None;
        }
    }
}

/// Cell rectangles in row-major order, as they are painted.
fn layout_cells(origin: Pos2, column_width: f32, slot_height: f32) -> Vec<Rect> {
    (0..SLOTS_PER_DAY)
        .flat_map(|row| (0..DAYS_PER_WEEK).map(move |day| (row, day)))
        .map(|(row, day)| {
            let min = origin
                + Vec2::new(
                    day as f32 * (column_width + COLUMN_SPACING),
                    row as f32 * slot_height,
                );
            Rect::from_min_size(min, Vec2::new(column_width, slot_height))
        })
        .collect()
}

fn paint_grid(
    ui: &Ui,
    cells: &[Rect],
    outer: Rect,
    controller: &ReconciliationController,
    palette: &WeekGridPalette,
) {
    let painter = ui.painter();
    let week_start = controller.week_start();
    let today = Local::now().date_naive();

    for (index, cell) in cells.iter().enumerate() {
        let (row, day) = (index / DAYS_PER_WEEK, index % DAYS_PER_WEEK);
        let date = week_start + Duration::days(day as i64);
        let bg = if date == today { palette.today_bg } else { palette.cell_bg };
        painter.rect_filled(*cell, 0.0, bg);

        let line = if row % 2 == 0 { palette.hour_line } else { palette.slot_line };
        painter.line_segment([cell.left_top(), cell.right_top()], Stroke::new(1.0, line));

        if row == 0 {
            painter.text(
                Pos2::new(cell.center().x, outer.top() + HEADER_HEIGHT / 2.0),
                Align2::CENTER_CENTER,
                date.format("%a %d").to_string(),
                FontId::proportional(13.0),
                palette.header_text,
            );
        }
        if day == 0 && row % 2 == 0 {
            painter.text(
                Pos2::new(outer.left() + TIME_LABEL_WIDTH - 6.0, cell.top() + 1.0),
                Align2::RIGHT_TOP,
                format!("{:02}:00", row / 2),
                FontId::monospace(11.0),
                palette.label_text,
            );
        }
    }

    if let Some(last) = cells.last() {
        let bottom = last.bottom().min(outer.bottom());
        painter.line_segment(
            [Pos2::new(outer.left() + TIME_LABEL_WIDTH, bottom), Pos2::new(last.right(), bottom)],
            Stroke::new(1.0, palette.hour_line),
        );
    }
}

fn paint_segment(ui: &Ui, segment: &ShiftSegment, shift: &Shift, colors: ShiftColors) {
    let rect = segment.rect.shrink2(Vec2::new(0.0, 1.0));
    if rect.height() <= 0.0 {
        return;
    }
    let painter = ui.painter();
    painter.rect_filled(rect, 4.0, colors.fill);
    painter.rect_stroke(rect, 4.0, Stroke::new(1.0, colors.stroke));

    if segment.index == 0 || rect.height() > 28.0 {
        let label = format!(
            "{} {}–{}",
            shift.username,
            shift.start_time.format("%H:%M"),
            shift.end_time.format("%H:%M")
        );
        painter.with_clip_rect(rect.shrink(2.0)).text(
            rect.left_top() + Vec2::new(4.0, 2.0),
            Align2::LEFT_TOP,
            label,
            FontId::proportional(11.0),
            colors.text,
        );
    }

    if segment.is_final && !shift.permitted {
        let corner = rect.right_bottom();
        painter.line_segment(
            [corner - Vec2::new(8.0, 2.0), corner - Vec2::new(2.0, 8.0)],
            Stroke::new(1.5, colors.text),
        );
    }
}
