//! Decomposition of a shift interval into per-day spans.
//!
//! Shared by lane assignment (which cells a shift occupies) and geometry
//! (which rectangles to draw), so both always agree on the split.

use std::ops::Range;

use chrono::{NaiveDate, NaiveDateTime};

use super::time_slot::{day_offset, time_to_index, visible_day, DAYS_PER_WEEK, SLOTS_PER_DAY};

const DAY_END_INDEX: f32 = SLOTS_PER_DAY as f32;

/// The part of a shift that falls on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DaySpan {
    /// Days from the week start; may be outside `[0, 6]`
    pub day_offset: i64,
    /// Fractional slot index where the span starts
    pub start_index: f32,
    /// Fractional slot index where the span ends (48 = bottom of the grid)
    pub end_index: f32,
    /// This span contains the shift's start time
    pub is_first: bool,
    /// This span contains the shift's end time
    pub is_final: bool,
}

impl DaySpan {
    /// Column in the visible week, if any.
    pub fn visible_day(&self) -> Option<usize> {
        visible_day(self.day_offset)
    }

    /// Slot rows touched by this span.
    pub fn rows(&self) -> Range<usize> {
        let first = self.start_index.floor().max(0.0) as usize;
        let last = (self.end_index.ceil() as usize).min(SLOTS_PER_DAY);
        first..last.max(first)
    }
}

/// Split `[start, end)` into day spans relative to `week_start`.
///
/// Same-day intervals give one span. Cross-day intervals give a leading partial
/// span, one full span per fully covered day and a trailing partial span. A
/// trailing span of zero height (interval ends exactly at midnight) is dropped.
/// Days far outside the visible week are skipped without being enumerated.
pub fn day_spans(start: NaiveDateTime, end: NaiveDateTime, week_start: NaiveDate) -> Vec<DaySpan> {
    let first_day = day_offset(start, week_start);
    let last_day = day_offset(end, week_start);
    let start_index = time_to_index(start);
    let end_index = time_to_index(end);

    if end <= start {
        return Vec::new();
    }

    if first_day == last_day {
        return vec![DaySpan {
            day_offset: first_day,
            start_index,
            end_index,
            is_first: true,
            is_final: true,
        }];
    }

    // A trailing span that would be empty hands the "final" role to the day before.
    let final_day = if end_index == 0.0 { last_day - 1 } else { last_day };

    let lo = first_day.max(-1);
    let hi = final_day.min(DAYS_PER_WEEK as i64);

    (lo..=hi)
        .map(|offset| DaySpan {
            day_offset: offset,
            start_index: if offset == first_day { start_index } else { 0.0 },
            end_index: if offset == last_day { end_index } else { DAY_END_INDEX },
            is_first: offset == first_day,
            is_final: offset == final_day,
        })
        .collect()
}
