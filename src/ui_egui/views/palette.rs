use egui::{Color32, Visuals};

use crate::models::shift::Shift;

fn with_alpha(color: Color32, alpha: u8) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

fn blend(a: Color32, b: Color32, t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |c1: u8, c2: u8| -> u8 { ((c1 as f32 * (1.0 - t)) + (c2 as f32 * t)).round() as u8 };
    Color32::from_rgb(lerp(a.r(), b.r()), lerp(a.g(), b.g()), lerp(a.b(), b.b()))
}

#[derive(Clone, Copy)]
pub(crate) struct WeekGridPalette {
    pub cell_bg: Color32,
    pub today_bg: Color32,
    pub hour_line: Color32,
    pub slot_line: Color32,
    pub header_text: Color32,
    pub label_text: Color32,
    pub hover_overlay: Color32,
}

impl WeekGridPalette {
    pub fn from_visuals(visuals: &Visuals) -> Self {
        let base = visuals.extreme_bg_color;
        let accent = visuals.selection.bg_fill;
        let text = visuals.text_color();
        Self {
            cell_bg: base,
            today_bg: blend(base, accent, 0.12),
            hour_line: with_alpha(text, if visuals.dark_mode { 70 } else { 60 }),
            slot_line: with_alpha(text, if visuals.dark_mode { 30 } else { 22 }),
            header_text: text,
            label_text: visuals.weak_text_color(),
            hover_overlay: with_alpha(accent, 40),
        }
    }
}

/// Fill and text colors for a shift box, by its annotations.
#[derive(Clone, Copy)]
pub(crate) struct ShiftColors {
    pub fill: Color32,
    pub stroke: Color32,
    pub text: Color32,
}

impl ShiftColors {
    pub fn for_shift(shift: &Shift, is_mine: bool, dark_mode: bool) -> Self {
        let fill = if !shift.enable {
            Color32::from_rgb(140, 140, 140)
        } else if shift.absent {
            Color32::from_rgb(230, 150, 60)
        } else if shift.permitted {
            Color32::from_rgb(70, 160, 90)
        } else if is_mine {
            Color32::from_rgb(66, 133, 244)
        } else {
            Color32::from_rgb(120, 110, 200)
        };
        let fill = if dark_mode { blend(fill, Color32::BLACK, 0.25) } else { fill };
        Self {
            fill,
            stroke: blend(fill, Color32::BLACK, 0.35),
            text: Color32::WHITE,
        }
    }

    /// Translucent variant used while a gesture is in progress.
    pub fn ghost(self) -> Self {
        Self {
            fill: with_alpha(self.fill, 150),
            ..self
        }
    }
}
