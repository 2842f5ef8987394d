//! Lane assignment for overlapping shifts.
//!
//! Every (slot row, day column) cell of the visible week lists the shifts that
//! occupy it together with the lane each one is drawn in. Lanes are assigned
//! first-fit in start-time order and a shift keeps one lane across all of its
//! cells, including multi-day spans. The table is rebuilt from scratch whenever
//! the shift set changes, so lanes are not stable across edits; only the
//! non-overlap guarantee is.

use std::collections::HashMap;

use chrono::NaiveDate;

use super::span::day_spans;
use super::time_slot::{DAYS_PER_WEEK, SLOTS_PER_DAY};
use crate::models::shift::{Shift, ShiftId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneEntry {
    pub shift_id: ShiftId,
    pub lane: usize,
}

/// 48 × 7 grid of lane assignments for one visible week.
#[derive(Debug, Clone)]
pub struct LaneTable {
    week_start: NaiveDate,
    cells: Vec<Vec<LaneEntry>>,
    lanes: HashMap<ShiftId, usize>,
}

impl LaneTable {
    /// Empty table for a week with no shifts.
    pub fn empty(week_start: NaiveDate) -> Self {
        Self {
            week_start,
            cells: vec![Vec::new(); SLOTS_PER_DAY * DAYS_PER_WEEK],
            lanes: HashMap::new(),
        }
    }

    pub fn build<'a, I>(shifts: I, week_start: NaiveDate) -> Self
    where
        I: IntoIterator<Item = &'a Shift>,
    {
        let mut ordered: Vec<&Shift> = shifts.into_iter().collect();
        ordered.sort_by(|a, b| a.start_time.cmp(&b.start_time).then(a.id.cmp(&b.id)));

        let mut table = Self::empty(week_start);
        for shift in ordered {
            let cells = Self::cells_spanned(shift, week_start);
            let Some(&(first_row, first_day)) = cells.first() else {
                continue;
            };

            let lane = first_free_lane(table.cell(first_row, first_day));
            for (row, day) in cells {
                table.insert(row, day, LaneEntry { shift_id: shift.id, lane });
            }
            table.lanes.insert(shift.id, lane);
        }

        log::debug!(
            "Assigned lanes for {} visible shift(s) in week of {}",
            table.lanes.len(),
            week_start
        );
        table
    }

    /// Visible cells occupied by `shift`, in chronological order.
    pub fn cells_spanned(shift: &Shift, week_start: NaiveDate) -> Vec<(usize, usize)> {
        day_spans(
            shift.start_time.naive_local(),
            shift.end_time.naive_local(),
            week_start,
        )
        .into_iter()
        .filter_map(|span| span.visible_day().map(|day| (span, day)))
        .flat_map(|(span, day)| span.rows().map(move |row| (row, day)))
        .collect()
    }

    pub fn week_start(&self) -> NaiveDate {
        self.week_start
    }

    /// Entries of one cell, sorted by lane.
    pub fn cell(&self, row: usize, day: usize) -> &[LaneEntry] {
        self.cells
            .get(Self::index(row, day))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Lane of a shift, or `None` when it has no visible cell this week.
    pub fn lane_of(&self, shift_id: ShiftId) -> Option<usize> {
        self.lanes.get(&shift_id).copied()
    }

    /// Number of lanes needed to draw a cell (highest lane + 1).
    pub fn lane_count(&self, row: usize, day: usize) -> usize {
        self.cell(row, day).last().map_or(0, |entry| entry.lane + 1)
    }

    /// Iterate over every cell as `(row, day, entries)`.
    pub fn iter_cells(&self) -> impl Iterator<Item = (usize, usize, &[LaneEntry])> {
        self.cells.iter().enumerate().map(|(index, entries)| {
            (index / DAYS_PER_WEEK, index % DAYS_PER_WEEK, entries.as_slice())
        })
    }

    fn insert(&mut self, row: usize, day: usize, entry: LaneEntry) {
        let cell = &mut self.cells[Self::index(row, day)];
        let position = cell.partition_point(|existing| existing.lane < entry.lane);
        cell.insert(position, entry);
    }

    fn index(row: usize, day: usize) -> usize {
        row * DAYS_PER_WEEK + day
    }
}

/// Lowest lane not used in a lane-sorted cell.
fn first_free_lane(entries: &[LaneEntry]) -> usize {
    let mut candidate = 0;
    for entry in entries {
        if entry.lane > candidate {
            break;
        }
        if entry.lane == candidate {
            candidate += 1;
        }
    }
    candidate
}
