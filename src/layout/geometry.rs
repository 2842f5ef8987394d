//! Geometry resolution: shift times → pixel rectangles, and back.
//!
//! The renderer reports the rectangles of the 48 × 7 grid cells once per layout
//! change. [`GeometryResolver::recompute`] turns them into an immutable
//! [`AnchorTable`] snapshot; every other method is a pure query against that
//! snapshot.

use std::sync::Arc;

use egui::{Pos2, Rect, Vec2};
use thiserror::Error;

use super::lanes::LaneTable;
use super::span::day_spans;
use super::time_slot::{DAYS_PER_WEEK, SLOTS_PER_DAY};
use crate::models::settings::Settings;
use crate::models::shift::{Shift, ShiftId};

/// Anchor rows: one per slot plus the bottom edge of the grid.
pub const ANCHOR_ROWS: usize = SLOTS_PER_DAY + 1;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("expected {expected} grid cells, got {actual}")]
    CellCount { expected: usize, actual: usize },
    #[error("grid cells have no area")]
    Degenerate,
}

/// Pixel positions of the grid-cell corners, captured from the rendered grid.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorTable {
    corners: Vec<Pos2>,
    column_width: f32,
    column_pitch: f32,
}

impl AnchorTable {
    /// Build from the rendered cells in row-major order (`row * 7 + day`).
    pub fn capture(cells: &[Rect]) -> Result<Self, GeometryError> {
        let expected = SLOTS_PER_DAY * DAYS_PER_WEEK;
        if cells.len() != expected {
            return Err(GeometryError::CellCount {
                expected,
                actual: cells.len(),
            });
        }

        let column_width = cells[0].width();
        if column_width <= 0.0 {
            return Err(GeometryError::Degenerate);
        }
        let pitch = cells[1].min.x - cells[0].min.x;
        let column_pitch = if pitch > 0.0 { pitch } else { column_width };

        let mut corners = Vec::with_capacity(ANCHOR_ROWS * DAYS_PER_WEEK);
        corners.extend(cells.iter().map(Rect::left_top));
        let last_row = (SLOTS_PER_DAY - 1) * DAYS_PER_WEEK;
        corners.extend(cells[last_row..].iter().map(Rect::left_bottom));

        Ok(Self {
            corners,
            column_width,
            column_pitch,
        })
    }

    /// Evenly spaced grid starting at `origin`.
    pub fn uniform(
        origin: Pos2,
        column_width: f32,
        column_spacing: f32,
        slot_height: f32,
    ) -> Result<Self, GeometryError> {
        if slot_height <= 0.0 {
            return Err(GeometryError::Degenerate);
        }
        let cells: Vec<Rect> = (0..SLOTS_PER_DAY)
            .flat_map(|row| (0..DAYS_PER_WEEK).map(move |day| (row, day)))
            .map(|(row, day)| {
                let min = origin
                    + Vec2::new(
                        day as f32 * (column_width + column_spacing),
                        row as f32 * slot_height,
                    );
                Rect::from_min_size(min, Vec2::new(column_width, slot_height))
            })
            .collect();
        Self::capture(&cells)
    }

    pub fn corner(&self, row: usize, day: usize) -> Pos2 {
        let row = row.min(ANCHOR_ROWS - 1);
        let day = day.min(DAYS_PER_WEEK - 1);
        self.corners[row * DAYS_PER_WEEK + day]
    }

    pub fn column_width(&self) -> f32 {
        self.column_width
    }

    /// Horizontal distance between the left edges of adjacent columns.
    pub fn column_pitch(&self) -> f32 {
        self.column_pitch
    }

    /// Whole grid, from the first column's top-left to the last column's bottom-right.
    pub fn grid_rect(&self) -> Rect {
        let top_left = self.corner(0, 0);
        let bottom_right =
            self.corner(SLOTS_PER_DAY, DAYS_PER_WEEK - 1) + Vec2::new(self.column_width, 0.0);
        Rect::from_min_max(top_left, bottom_right)
    }

    /// Vertical pixel position of a fractional slot index in a column.
    pub fn y_at(&self, day: usize, index: f32) -> f32 {
        let index = index.clamp(0.0, SLOTS_PER_DAY as f32);
        let row = (index.floor() as usize).min(SLOTS_PER_DAY - 1);
        let frac = index - row as f32;
        let top = self.corner(row, day).y;
        let bottom = self.corner(row + 1, day).y;
        top + (bottom - top) * frac
    }

    /// Fractional slot index under a vertical pixel position, clamped to the grid.
    pub fn index_at(&self, day: usize, y: f32) -> f32 {
        let ys: Vec<f32> = (0..ANCHOR_ROWS).map(|row| self.corner(row, day).y).collect();
        if y <= ys[0] {
            return 0.0;
        }
        if y >= ys[SLOTS_PER_DAY] {
            return SLOTS_PER_DAY as f32;
        }
        let row = ys.partition_point(|&anchor| anchor <= y).saturating_sub(1);
        let height = ys[row + 1] - ys[row];
        if height <= 0.0 {
            return row as f32;
        }
        row as f32 + (y - ys[row]) / height
    }
}

/// One rendered single-day portion of a shift.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShiftSegment {
    pub shift_id: ShiftId,
    /// Position among this shift's visible segments, chronological
    pub index: usize,
    pub day: usize,
    pub rect: Rect,
    /// Contains the shift's end time; only this segment can be resized
    pub is_final: bool,
    /// Draw order: higher ranks are drawn on top
    pub stacking_rank: usize,
}

/// Owns the current anchor snapshot and answers geometry queries against it.
#[derive(Debug, Clone)]
pub struct GeometryResolver {
    anchors: Option<Arc<AnchorTable>>,
    column_width_ratio: f32,
    lane_ratio: f32,
}

impl GeometryResolver {
    pub fn new(settings: &Settings) -> Self {
        Self {
            anchors: None,
            column_width_ratio: settings.column_width_ratio,
            lane_ratio: settings.lane_ratio,
        }
    }

    /// Replace the anchor snapshot after the grid was laid out again.
    pub fn recompute(&mut self, cells: &[Rect]) -> Result<Arc<AnchorTable>, GeometryError> {
        let table = Arc::new(AnchorTable::capture(cells)?);
        log::debug!(
            "Recomputed grid anchors: column width {:.1}, pitch {:.1}",
            table.column_width(),
            table.column_pitch()
        );
        self.anchors = Some(Arc::clone(&table));
        Ok(table)
    }

    /// Install a snapshot directly.
    pub fn install(&mut self, table: AnchorTable) {
        self.anchors = Some(Arc::new(table));
    }

    pub fn invalidate(&mut self) {
        self.anchors = None;
    }

    pub fn snapshot(&self) -> Option<Arc<AnchorTable>> {
        self.anchors.clone()
    }

    /// Rectangles for every visible day of `shift`, in chronological order.
    pub fn resolve(&self, shift: &Shift, lanes: &LaneTable) -> Vec<ShiftSegment> {
        let Some(anchors) = self.anchors.as_deref() else {
            return Vec::new();
        };

        let lane = lanes.lane_of(shift.id).unwrap_or(0);
        let spans = day_spans(
            shift.start_time.naive_local(),
            shift.end_time.naive_local(),
            lanes.week_start(),
        );

        spans
            .iter()
            .filter_map(|span| span.visible_day().map(|day| (span, day)))
            .enumerate()
            .map(|(index, (span, day))| {
                let top = anchors.y_at(day, span.start_index);
                let bottom = anchors.y_at(day, span.end_index);
                let (x, width) = self.lane_offset(anchors.corner(0, day).x, anchors.column_width(), lane);
                ShiftSegment {
                    shift_id: shift.id,
                    index,
                    day,
                    rect: Rect::from_min_size(Pos2::new(x, top), Vec2::new(width, bottom - top)),
                    is_final: span.is_final,
                    stacking_rank: lane + 1,
                }
            })
            .collect()
    }

    /// Horizontal placement for a lane: each lane shifts right and narrows so
    /// higher lanes cascade over lower ones with a shared right edge.
    fn lane_offset(&self, column_left: f32, column_width: f32, lane: usize) -> (f32, f32) {
        let mut x = column_left;
        let mut width = column_width * self.column_width_ratio;
        for _ in 0..lane {
            x += width * (1.0 - self.lane_ratio);
            width *= self.lane_ratio;
        }
        (x, width)
    }

    /// Whole-day offset for a horizontal pointer travel.
    pub fn day_delta(&self, dx: f32) -> i64 {
        match self.anchors.as_deref() {
            Some(anchors) => (dx / anchors.column_pitch()).round() as i64,
            None => 0,
        }
    }

    /// Fractional slot index under `y` in a column; `None` without anchors.
    pub fn index_at(&self, day: usize, y: f32) -> Option<f32> {
        self.anchors.as_deref().map(|anchors| anchors.index_at(day, y))
    }

    /// Grid cell (row, day) under a pointer position.
    pub fn hit_cell(&self, pos: Pos2) -> Option<(usize, usize)> {
        let anchors = self.anchors.as_deref()?;
        if !anchors.grid_rect().contains(pos) {
            return None;
        }
        let dx = pos.x - anchors.corner(0, 0).x;
        let day = (dx / anchors.column_pitch()).floor() as usize;
        if day >= DAYS_PER_WEEK || pos.x > anchors.corner(0, day).x + anchors.column_width() {
            return None;
        }
        let row = (anchors.index_at(day, pos.y).floor() as usize).min(SLOTS_PER_DAY - 1);
        Some((row, day))
    }

    /// Topmost segment under a pointer position.
    pub fn hit_segment<'a>(segments: &'a [ShiftSegment], pos: Pos2) -> Option<&'a ShiftSegment> {
        segments
            .iter()
            .filter(|segment| segment.rect.contains(pos))
            .max_by_key(|segment| segment.stacking_rank)
    }

    /// Whether a press at `pos` grabs the resize handle of `segment`.
    pub fn hits_resize_handle(segment: &ShiftSegment, pos: Pos2, tolerance: f32) -> bool {
        segment.is_final && segment.rect.right_bottom().distance(pos) <= tolerance
    }
}
