//! Time-slot index: pure mapping between calendar time and (day column, slot row).
//!
//! Rows are half-hour slots counted from local midnight, columns are days counted
//! from the first day of the visible week.

use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};

use crate::utils::date::start_of_day;

pub const SLOT_MINUTES: i64 = 30;
pub const SLOTS_PER_DAY: usize = 48;
pub const DAYS_PER_WEEK: usize = 7;

const SLOT_SECONDS: f32 = (SLOT_MINUTES * 60) as f32;

/// Real-valued slot index of `t` within its own day, in `[0, 48)`.
///
/// Fractional when `t` falls inside a slot.
pub fn time_to_index(t: NaiveDateTime) -> f32 {
    t.time().num_seconds_from_midnight() as f32 / SLOT_SECONDS
}

/// Inverse of [`time_to_index`] for a given day. An index of 48 is the next midnight.
pub fn index_to_time(date: NaiveDate, index: f32) -> NaiveDateTime {
    let seconds = (index * SLOT_SECONDS).round() as i64;
    start_of_day(date) + Duration::seconds(seconds)
}

/// Whole days between `week_start` and the day containing `t`. Not clamped.
pub fn day_offset(t: NaiveDateTime, week_start: NaiveDate) -> i64 {
    (t.date() - week_start).num_days()
}

/// Column index for rendering, clamped to the visible week.
pub fn clamp_day(offset: i64) -> usize {
    offset.clamp(0, DAYS_PER_WEEK as i64 - 1) as usize
}

/// Column index if the offset is inside the visible week.
pub fn visible_day(offset: i64) -> Option<usize> {
    (0..DAYS_PER_WEEK as i64)
        .contains(&offset)
        .then_some(offset as usize)
}

/// Wall-clock start of the cell at (`row`, `day`).
pub fn cell_start(week_start: NaiveDate, row: usize, day: usize) -> NaiveDateTime {
    start_of_day(week_start)
        + Duration::days(day as i64)
        + Duration::minutes(row as i64 * SLOT_MINUTES)
}
