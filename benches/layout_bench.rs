// Benchmark for week layout
// Measures lane assignment and segment resolution for busy weeks

use chrono::{Duration, Local, NaiveDate, TimeZone};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use egui::Pos2;

use shift_calendar::layout::geometry::{AnchorTable, GeometryResolver};
use shift_calendar::layout::lanes::LaneTable;
use shift_calendar::models::settings::Settings;
use shift_calendar::models::shift::{NewShift, Shift};

fn week_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 12).unwrap()
}

/// `count` shifts of 2-8 hours scattered over the week, many overlapping.
fn busy_week(count: usize) -> Vec<Shift> {
    let base = Local
        .from_local_datetime(&week_start().and_hms_opt(6, 0, 0).unwrap())
        .unwrap();
    (0..count)
        .map(|i| {
            let start = base + Duration::minutes(((i * 97) % (6 * 24 * 2)) as i64 * 30);
            let end = start + Duration::hours(2 + (i % 7) as i64);
            NewShift::new("alice", "alice", start, end)
                .unwrap()
                .into_shift(i as i64)
        })
        .collect()
}

fn bench_lane_assignment(c: &mut Criterion) {
    let mut group = c.benchmark_group("lane_assignment");

    for count in [10, 100, 500].iter() {
        let shifts = busy_week(*count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &shifts, |b, shifts| {
            b.iter(|| LaneTable::build(black_box(shifts), week_start()));
        });
    }

    group.finish();
}

fn bench_segment_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("segment_resolution");
    let mut resolver = GeometryResolver::new(&Settings::default());
    resolver.install(AnchorTable::uniform(Pos2::new(48.0, 26.0), 120.0, 2.0, 24.0).unwrap());

    for count in [10, 100, 500].iter() {
        let shifts = busy_week(*count);
        let lanes = LaneTable::build(&shifts, week_start());
        group.bench_with_input(BenchmarkId::from_parameter(count), &shifts, |b, shifts| {
            b.iter(|| {
                shifts
                    .iter()
                    .map(|shift| resolver.resolve(black_box(shift), &lanes).len())
                    .sum::<usize>()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_lane_assignment, bench_segment_resolution);
criterion_main!(benches);
