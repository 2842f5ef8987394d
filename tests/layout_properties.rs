// Property-based tests for slot mapping, lane assignment and geometry
// Random shift sets inside one week check the layout invariants hold for any input

use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone};
use egui::Pos2;
use proptest::prelude::*;
use std::collections::HashMap;

use shift_calendar::layout::geometry::{AnchorTable, GeometryResolver};
use shift_calendar::layout::lanes::LaneTable;
use shift_calendar::layout::time_slot::{index_to_time, time_to_index, DAYS_PER_WEEK, SLOTS_PER_DAY};
use shift_calendar::models::settings::Settings;
use shift_calendar::models::shift::{NewShift, Shift};

fn week_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 12).unwrap()
}

fn local(minutes_into_week: i64) -> Option<DateTime<Local>> {
    let naive = week_start().and_hms_opt(0, 0, 0)? + Duration::minutes(minutes_into_week);
    Local.from_local_datetime(&naive).single()
}

/// Shifts as (start minute within the week, length in minutes), on a 15-minute grid.
fn shift_specs() -> impl Strategy<Value = Vec<(i64, i64)>> {
    prop::collection::vec((0..(7 * 24 * 4) as i64, 1..(3 * 24 * 4) as i64), 0..25)
        .prop_map(|specs| specs.into_iter().map(|(s, l)| (s * 15, l * 15)).collect())
}

fn build_shifts(specs: &[(i64, i64)]) -> Vec<Shift> {
    specs
        .iter()
        .enumerate()
        .filter_map(|(i, &(start, length))| {
            let start_time = local(start)?;
            let end_time = local(start + length)?;
            NewShift::new("alice", "alice", start_time, end_time)
                .ok()
                .map(|draft| draft.into_shift(i as i64 + 1))
        })
        .collect()
}

proptest! {
    /// Property: no two shifts share a lane in any cell
    #[test]
    fn prop_lanes_never_collide(specs in shift_specs()) {
        let shifts = build_shifts(&specs);
        let table = LaneTable::build(&shifts, week_start());

        for (_, _, entries) in table.iter_cells() {
            let mut lanes: Vec<usize> = entries.iter().map(|entry| entry.lane).collect();
            lanes.dedup();
            prop_assert_eq!(lanes.len(), entries.len());
        }
    }

    /// Property: a shift keeps one lane in every cell it covers, multi-day spans included
    #[test]
    fn prop_lane_is_consistent_across_cells(specs in shift_specs()) {
        let shifts = build_shifts(&specs);
        let table = LaneTable::build(&shifts, week_start());

        let mut seen: HashMap<i64, usize> = HashMap::new();
        for (_, _, entries) in table.iter_cells() {
            for entry in entries {
                let lane = *seen.entry(entry.shift_id).or_insert(entry.lane);
                prop_assert_eq!(lane, entry.lane);
                prop_assert_eq!(table.lane_of(entry.shift_id), Some(lane));
            }
        }
        for shift in &shifts {
            let visible = !LaneTable::cells_spanned(shift, week_start()).is_empty();
            prop_assert_eq!(table.lane_of(shift.id).is_some(), visible);
        }
    }

    /// Property: segments are ordered by day, non-empty, and only the last may be final
    #[test]
    fn prop_segments_cover_visible_days(specs in shift_specs()) {
        let shifts = build_shifts(&specs);
        let table = LaneTable::build(&shifts, week_start());
        let mut resolver = GeometryResolver::new(&Settings::default());
        resolver.install(AnchorTable::uniform(Pos2::ZERO, 100.0, 2.0, 20.0).unwrap());

        for shift in &shifts {
            let segments = resolver.resolve(shift, &table);
            for pair in segments.windows(2) {
                prop_assert_eq!(pair[1].day, pair[0].day + 1);
                prop_assert!(!pair[0].is_final);
            }
            for segment in &segments {
                prop_assert!(segment.rect.height() > 0.0);
                prop_assert!(segment.day < DAYS_PER_WEEK);
            }
            let ends_this_week = shift.end_time.naive_local()
                <= (week_start() + Duration::days(DAYS_PER_WEEK as i64)).and_hms_opt(0, 0, 0).unwrap();
            if let Some(last) = segments.last() {
                prop_assert_eq!(last.is_final, ends_this_week);
            }
        }
    }

    /// Property: minute-aligned times survive the trip through a slot index
    #[test]
    fn prop_time_index_round_trip(minute_of_day in 0..(24 * 60) as i64) {
        let date = week_start();
        let t = date.and_hms_opt(0, 0, 0).unwrap() + Duration::minutes(minute_of_day);
        prop_assert_eq!(index_to_time(date, time_to_index(t)), t);
    }

    /// Property: pixel lookup inverts slot placement on a uniform grid
    #[test]
    fn prop_index_at_inverts_y_at(quarter in 0..(SLOTS_PER_DAY * 4), day in 0..DAYS_PER_WEEK) {
        let anchors = AnchorTable::uniform(Pos2::new(48.0, 26.0), 100.0, 2.0, 20.0).unwrap();
        let index = quarter as f32 / 4.0;
        let y = anchors.y_at(day, index);
        prop_assert!((anchors.index_at(day, y) - index).abs() < 1e-3);
    }
}
